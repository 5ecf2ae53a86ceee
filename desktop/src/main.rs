mod app;
mod config;
mod palette;
mod stats_view;
mod storage;

use app::PracticeApp;
use config::Config;
use eframe::egui;
use storage::JsonFileStore;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging(fallback: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn main() -> eframe::Result<()> {
    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    init_logging(&config.log_filter);

    if let Some(e) = config_error {
        warn!("using default config: {e:#}");
    } else if let Err(e) = config.save_if_missing() {
        warn!("could not write default config: {e:#}");
    }

    let store = match JsonFileStore::locate(config.data_dir.as_deref()) {
        Ok(store) => Some(store),
        Err(e) => {
            warn!(error = %e, "practice data will not be saved");
            None
        }
    };
    if let Some(store) = &store {
        info!(path = %store.path().display(), "practice data file");
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window.width, config.window.height])
            .with_min_inner_size([420.0, 520.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Multiplication Practice",
        options,
        Box::new(move |_cc| Ok(Box::new(PracticeApp::new(config, store)))),
    )
}
