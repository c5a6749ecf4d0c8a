// splash.rs
use egui::{Color32, ColorImage, Frame, RichText};
use egui_extras::RetainedImage;
use image::codecs::gif::GifDecoder;
use image::imageops::{self, FilterType};
use image::{AnimationDecoder, RgbaImage};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::{AppError, Result};

/// Index of the frame to show after `elapsed`, looping.
pub fn frame_at(elapsed: Duration, interval: Duration, count: usize) -> Option<usize> {
    if count == 0 || interval.is_zero() {
        return None;
    }
    let step = elapsed.as_millis() / interval.as_millis().max(1);
    Some((step % count as u128) as usize)
}

/// `name` next to the running executable.
pub fn asset_path(name: &str) -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_default()
        .join(name)
}

pub fn load_frames(path: &Path, size: u32) -> Result<Vec<RgbaImage>> {
    let file = File::open(path).map_err(|e| AppError::io(path, e))?;
    let decoder = GifDecoder::new(BufReader::new(file))?;
    let frames = decoder.into_frames().collect_frames()?;
    Ok(frames
        .iter()
        .map(|frame| imageops::resize(frame.buffer(), size, size, FilterType::Triangle))
        .collect())
}

pub struct Splash {
    frames: Vec<RetainedImage>,
    started: Instant,
    duration: Duration,
    interval: Duration,
}

impl Splash {
    /// A missing or broken animation leaves the splash static.
    pub fn new(config: &AppConfig) -> Self {
        let path = asset_path(&config.splash_asset);
        let frames = match load_frames(&path, config.splash_frame_size) {
            Ok(frames) => {
                info!("Loaded {} splash frames from {}", frames.len(), path.display());
                frames
                    .iter()
                    .enumerate()
                    .map(|(i, frame)| {
                        let color = ColorImage::from_rgba_unmultiplied(
                            [frame.width() as usize, frame.height() as usize],
                            frame.as_raw(),
                        );
                        RetainedImage::from_color_image(format!("splash-{}", i), color)
                    })
                    .collect()
            }
            Err(e) => {
                warn!("GIF load error: {}", e);
                Vec::new()
            }
        };
        Self {
            frames,
            started: Instant::now(),
            duration: config.splash_duration,
            interval: config.splash_frame_interval,
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn is_finished(&self) -> bool {
        self.started.elapsed() >= self.duration
    }

    pub fn render(&self, ctx: &egui::Context) {
        let frame = Frame {
            fill: Color32::from_rgb(173, 216, 230),
            ..Default::default()
        };
        egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(20.0);
                match frame_at(self.started.elapsed(), self.interval, self.frames.len()) {
                    Some(index) => {
                        self.frames[index].show(ui);
                    }
                    None => ui.add_space(200.0),
                }
                ui.add_space(10.0);
                ui.label(
                    RichText::new("🚀 Launching Image Compressor...")
                        .size(14.0)
                        .color(Color32::WHITE),
                );
            });
        });
        ctx.request_repaint_after(self.interval);
    }
}
