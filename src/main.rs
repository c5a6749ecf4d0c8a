// main.rs
mod app;
mod config;
mod error;
mod utils;

use app::App;
use config::AppConfig;
use eframe::NativeOptions;
use tracing::info;

fn main() {
    utils::init_tracing();

    let config = AppConfig::default();
    info!("Starting Modern Image Compressor");

    let native_options = NativeOptions {
        initial_window_size: Some(config.splash_window_size),
        resizable: false,
        decorated: false,
        ..Default::default()
    };
    eframe::run_native(
        "Modern Image Compressor",
        native_options,
        Box::new(move |_cc| Box::new(App::new(config))),
    );
}
