mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use app::DtExplorerApp;
use config::AppConfig;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let config = AppConfig::load(std::env::args().skip(1));
    log::info!("Using data file {}", config.data_path.display());

    // A failed load keeps the window open in the "no data" state.
    let mut state = AppState::new(config);
    state.load();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([640.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "DT Explorer – Digital Transformation Index",
        options,
        Box::new(|_cc| Ok(Box::new(DtExplorerApp::new(state)))),
    )
}
