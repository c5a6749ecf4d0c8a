// config.rs
use egui::Vec2;
use std::time::Duration;

/// Tunables for the whole application. Nothing here is persisted; every run
/// starts from `AppConfig::default()`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub splash_window_size: Vec2,
    pub splash_duration: Duration,
    pub splash_frame_interval: Duration,
    /// Side length each animation frame is resized to.
    pub splash_frame_size: u32,
    /// Looked up next to the executable.
    pub splash_asset: String,
    pub main_window_size: Vec2,
    /// Bounding box for both preview slots.
    pub preview_size: u32,
    pub pdf_dpi: f32,
    pub default_quality: u8,
    pub compressed_prefix: String,
    pub converted_suffix: String,
    /// Bytes per "KB" when reporting the size of a compressed PDF.
    /// 2048 keeps the historical report; 1024 matches the image path.
    pub pdf_compressed_size_divisor: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            splash_window_size: Vec2::new(400.0, 300.0),
            splash_duration: Duration::from_millis(2000),
            splash_frame_interval: Duration::from_millis(100),
            splash_frame_size: 200,
            splash_asset: String::from("loading.gif"),
            main_window_size: Vec2::new(600.0, 600.0),
            preview_size: 140,
            pdf_dpi: 100.0,
            default_quality: 100,
            compressed_prefix: String::from("compressed_"),
            converted_suffix: String::from("_converted.pdf"),
            pdf_compressed_size_divisor: 2048.0,
        }
    }
}
