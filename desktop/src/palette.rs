use eframe::egui::Color32;
use tt_core::stats::ColorTier;

pub const TEXT: Color32 = Color32::from_rgb(0x1A, 0x1A, 0x1A);
pub const PRIMARY: Color32 = Color32::from_rgb(0x63, 0x66, 0xF1);
pub const SECONDARY: Color32 = Color32::from_rgb(0xF5, 0x9E, 0x0B);
pub const SUCCESS: Color32 = Color32::from_rgb(0x10, 0xB9, 0x81);
pub const ERROR: Color32 = Color32::from_rgb(0xEF, 0x44, 0x44);
pub const BORDER: Color32 = Color32::from_rgb(0xE5, 0xE7, 0xEB);
pub const CARD: Color32 = Color32::from_rgb(0xF9, 0xFA, 0xFB);
pub const PLACEHOLDER: Color32 = Color32::from_rgb(0x9C, 0xA3, 0xAF);

pub fn tier_color(tier: ColorTier) -> Color32 {
    let [r, g, b] = tier.rgb();
    Color32::from_rgb(r, g, b)
}
