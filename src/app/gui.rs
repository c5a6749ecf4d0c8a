use crate::app::file_dialogs;
use crate::app::preview::{PreviewContent, PreviewSlot};
use crate::app::App;
use egui::{Button, Color32, ColorImage, RichText, Slider};
use egui_extras::RetainedImage;

/// Texture for one preview slot, rebuilt only when the slot changes.
#[derive(Default)]
pub struct SlotTexture {
    generation: Option<u64>,
    image: Option<RetainedImage>,
}

impl SlotTexture {
    pub fn sync(&mut self, slot: &PreviewSlot, name: &str) {
        if self.generation == Some(slot.generation()) {
            return;
        }
        self.image = match slot.content() {
            PreviewContent::Image(rgba) => {
                let color = ColorImage::from_rgba_unmultiplied(
                    [rgba.width() as usize, rgba.height() as usize],
                    rgba.as_raw(),
                );
                Some(RetainedImage::from_color_image(name, color))
            }
            PreviewContent::Label(_) => None,
        };
        self.generation = Some(slot.generation());
    }
}

pub fn render(app: &mut App, ctx: &egui::Context) {
    app.original_texture.sync(&app.session.original_preview, "original-preview");
    app.compressed_texture.sync(&app.session.compressed_preview, "compressed-preview");

    egui::CentralPanel::default().show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.heading(RichText::new("📷 Image Compressor").size(22.0).strong());
            ui.add_space(15.0);

            ui.label(app.session.file_label());
            ui.add_space(5.0);
            if ui.button("Browse").clicked() {
                if let Some(path) = file_dialogs::select_file() {
                    app.select_file(path);
                }
            }

            ui.add_space(10.0);
            ui.label("Compression Quality");
            ui.add(Slider::new(&mut app.session.quality, 1..=100));

            ui.add_space(15.0);
            let idle = !app.is_busy();
            let compress = Button::new(RichText::new("Compress").color(Color32::WHITE))
                .fill(Color32::from_rgb(34, 139, 34));
            if ui.add_enabled(idle, compress).clicked() {
                app.start_compress(ctx);
            }
            ui.add_space(5.0);
            let convert = Button::new(RichText::new("Convert to PDF").color(Color32::WHITE))
                .fill(Color32::from_rgb(30, 80, 200));
            if ui.add_enabled(idle, convert).clicked() {
                app.start_convert(ctx);
            }

            if app.is_busy() {
                ui.add_space(5.0);
                ui.horizontal(|ui| {
                    ui.label(RichText::new(format!("⏳ {}", app.job_stage)).color(Color32::YELLOW));
                    if ui.button("Cancel").clicked() {
                        app.cancel_job();
                    }
                });
            }

            ui.add_space(10.0);
            let preview_size = app.config.preview_size as f32;
            ui.horizontal(|ui| {
                preview_cell(ui, &app.original_texture, &app.session.original_preview, preview_size);
                ui.add_space(10.0);
                preview_cell(ui, &app.compressed_texture, &app.session.compressed_preview, preview_size);
            });

            ui.add_space(10.0);
            ui.label(RichText::new(&app.session.result_text).size(12.0));
        });

        ui.add_space(10.0);
        ui.collapsing("Activity", |ui| {
            egui::ScrollArea::vertical()
                .max_height(120.0)
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    let logs = app.log_messages.lock();
                    for log in logs.iter() {
                        if log.contains("error") || log.contains("failed") {
                            ui.label(RichText::new(log).color(Color32::RED));
                        } else {
                            ui.label(log);
                        }
                    }
                });
        });
    });
}

fn preview_cell(ui: &mut egui::Ui, texture: &SlotTexture, slot: &PreviewSlot, size: f32) {
    ui.group(|ui| {
        ui.set_min_size(egui::vec2(size, size));
        match (&texture.image, slot.content()) {
            (Some(image), _) => {
                image.show(ui);
            }
            (None, PreviewContent::Label(text)) => {
                ui.label(text);
            }
            (None, PreviewContent::Image(_)) => {}
        }
    });
}
