//! System Orrery - an animated star system view fed by the game journal.

mod core;
mod gui;

use gui::OrreryApp;
use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title("System Orrery")
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "System Orrery",
        options,
        Box::new(|cc| Ok(Box::new(OrreryApp::new(cc)))),
    )
}
