use crate::app::BUCKETS;
use crate::palette;
use chrono::Utc;
use eframe::egui;
use tt_core::stats::{
    self, HeatMapGrid, HeatMapMetric, ProgressMetric, ProgressPoint, StatsRange, StatsSummary,
};
use tt_core::PracticeAttempt;

const PROGRESS_DAYS: usize = 7;
const CHART_HEIGHT: f32 = 200.0;
const CHART_PADDING: f32 = 20.0;
const AXIS_WIDTH: f32 = 40.0;
const HEAT_CELL: egui::Vec2 = egui::vec2(40.0, 28.0);

pub struct StatsView {
    range: StatsRange,
    confirm_clear: bool,
}

impl Default for StatsView {
    fn default() -> Self {
        Self {
            range: StatsRange::Week,
            confirm_clear: false,
        }
    }
}

impl StatsView {
    /// Returns true when the user confirmed clearing their history.
    pub fn show(&mut self, ui: &mut egui::Ui, attempts: &[PracticeAttempt]) -> bool {
        ui.heading("Your Performance");
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            for range in StatsRange::ALL {
                ui.selectable_value(&mut self.range, range, range.label());
            }
        });
        ui.add_space(12.0);

        let filtered = stats::filter_range(attempts, self.range, Utc::now());
        if filtered.is_empty() {
            ui.vertical_centered(|ui| {
                ui.add_space(32.0);
                ui.label(egui::RichText::new("No data yet").size(20.0).strong());
                ui.label(
                    egui::RichText::new("Start practicing multiplication to see your statistics here.")
                        .color(palette::PLACEHOLDER),
                );
            });
        } else {
            summary_cards(ui, &StatsSummary::from_attempts(&filtered));
            ui.add_space(16.0);

            // The trend charts always cover the last week, whatever the range.
            let progress = stats::generate_progress_series(attempts, PROGRESS_DAYS);
            progress_chart(ui, "Accuracy Over Time", &progress, ProgressMetric::Accuracy);
            progress_chart(ui, "Speed Over Time", &progress, ProgressMetric::Speed);
            progress_chart(ui, "Problems Solved", &progress, ProgressMetric::Attempts);

            heat_map(ui, "Accuracy Heat Map", &filtered, HeatMapMetric::Accuracy);
            heat_map(ui, "Speed Heat Map (ms)", &filtered, HeatMapMetric::Speed);
        }

        ui.add_space(16.0);
        ui.separator();
        self.clear_history_controls(ui, !attempts.is_empty())
    }

    fn clear_history_controls(&mut self, ui: &mut egui::Ui, has_history: bool) -> bool {
        let mut confirmed = false;
        if self.confirm_clear {
            ui.horizontal(|ui| {
                ui.label("Clear all practice history?");
                if ui.button("Yes, clear").clicked() {
                    confirmed = true;
                    self.confirm_clear = false;
                }
                if ui.button("Cancel").clicked() {
                    self.confirm_clear = false;
                }
            });
        } else if ui
            .add_enabled(has_history, egui::Button::new("Clear history").small())
            .clicked()
        {
            self.confirm_clear = true;
        }
        confirmed
    }
}

fn summary_cards(ui: &mut egui::Ui, summary: &StatsSummary) {
    let cards = [
        (summary.total.to_string(), "Total Problems"),
        (stats::format_accuracy(summary.accuracy), "Accuracy"),
        (stats::format_speed(summary.average_ms), "Avg. Time"),
    ];

    ui.columns(cards.len(), |columns| {
        for (ui, (value, label)) in columns.iter_mut().zip(cards) {
            egui::Frame::none()
                .fill(palette::CARD)
                .rounding(12.0)
                .inner_margin(16.0)
                .show(ui, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.label(
                            egui::RichText::new(value)
                                .size(24.0)
                                .strong()
                                .color(palette::PRIMARY),
                        );
                        ui.label(egui::RichText::new(label).color(palette::PLACEHOLDER));
                    });
                });
        }
    });
}

fn metric_color(metric: ProgressMetric) -> egui::Color32 {
    match metric {
        ProgressMetric::Accuracy => palette::SUCCESS,
        ProgressMetric::Speed => palette::PRIMARY,
        ProgressMetric::Attempts => palette::SECONDARY,
    }
}

fn progress_chart(ui: &mut egui::Ui, title: &str, points: &[ProgressPoint], metric: ProgressMetric) {
    ui.label(egui::RichText::new(title).size(18.0).strong());
    ui.label(egui::RichText::new(metric.label()).color(palette::PLACEHOLDER));
    ui.add_space(8.0);

    let width = ui.available_width();
    let (rect, _) = ui.allocate_exact_size(egui::vec2(width, CHART_HEIGHT), egui::Sense::hover());
    let painter = ui.painter_at(rect);
    let font = egui::FontId::proportional(11.0);

    let graph = egui::Rect::from_min_max(
        egui::pos2(rect.left() + AXIS_WIDTH, rect.top() + CHART_PADDING),
        egui::pos2(rect.right(), rect.bottom() - CHART_PADDING),
    );
    let max = metric.max_over(points);

    for (fraction, value) in [(0.0, max), (0.5, (max / 2.0).round()), (1.0, 0.0)] {
        let y = graph.top() + graph.height() * fraction;
        painter.hline(graph.x_range(), y, egui::Stroke::new(1.0, palette::BORDER));
        painter.text(
            egui::pos2(graph.left() - 8.0, y),
            egui::Align2::RIGHT_CENTER,
            format!("{}", value.round()),
            font.clone(),
            palette::PLACEHOLDER,
        );
    }

    if points.is_empty() {
        return;
    }
    let slot = graph.width() / points.len() as f32;
    let bar_width = (slot - 4.0).max(1.0);
    for (i, point) in points.iter().enumerate() {
        let value = metric.value(point);
        let height = if max > 0.0 {
            (value / max) as f32 * graph.height()
        } else {
            0.0
        };
        let center_x = graph.left() + slot * (i as f32 + 0.5);
        let bar = egui::Rect::from_min_max(
            egui::pos2(center_x - bar_width / 2.0, graph.bottom() - height),
            egui::pos2(center_x + bar_width / 2.0, graph.bottom()),
        );
        painter.rect_filled(bar, 4.0, metric_color(metric));
        painter.text(
            egui::pos2(center_x, graph.bottom() + 4.0),
            egui::Align2::CENTER_TOP,
            &point.label,
            font.clone(),
            palette::PLACEHOLDER,
        );
    }
    ui.add_space(16.0);
}

fn heat_cell(ui: &mut egui::Ui, text: &str, fill: egui::Color32) {
    let (rect, _) = ui.allocate_exact_size(HEAT_CELL, egui::Sense::hover());
    ui.painter().rect_filled(rect, 2.0, fill);
    ui.painter().text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        text,
        egui::FontId::proportional(10.0),
        palette::TEXT,
    );
}

fn heat_map(ui: &mut egui::Ui, title: &str, attempts: &[PracticeAttempt], metric: HeatMapMetric) {
    let cells = stats::generate_heat_map(attempts, metric);
    let grid = HeatMapGrid::build(&cells, *BUCKETS.start(), *BUCKETS.end());
    let header = palette::PRIMARY.gamma_multiply(0.2);

    ui.label(egui::RichText::new(title).size(18.0).strong());
    ui.add_space(8.0);
    egui::ScrollArea::horizontal().id_salt(title).show(ui, |ui| {
        egui::Grid::new(title).spacing([2.0, 2.0]).show(ui, |ui| {
            heat_cell(ui, "", header);
            for y in grid.factors() {
                heat_cell(ui, &y.to_string(), header);
            }
            ui.end_row();

            for x in grid.factors() {
                heat_cell(ui, &x.to_string(), header);
                for y in grid.factors() {
                    match grid.get(x, y) {
                        Some(value) => heat_cell(
                            ui,
                            &metric.format(value),
                            palette::tier_color(metric.tier(value)),
                        ),
                        None => heat_cell(ui, "-", palette::CARD),
                    }
                }
                ui.end_row();
            }
        });
    });
    ui.add_space(24.0);
}
