// preview.rs
use image::io::Reader as ImageReader;
use image::{DynamicImage, RgbaImage};
use std::path::Path;
use tracing::debug;

use crate::app::formats::FileKind;

pub const PDF_SELECTED: &str = "📄 PDF selected";
pub const PDF_COMPRESSED: &str = "📄 PDF compressed";
pub const PDF_CREATED: &str = "📄 PDF created";
pub const PREVIEW_FAILED: &str = "⚠ Preview failed";

#[derive(Clone, Debug, PartialEq)]
pub enum PreviewContent {
    Label(String),
    Image(RgbaImage),
}

impl PreviewContent {
    pub fn label(text: &str) -> Self {
        PreviewContent::Label(text.to_string())
    }
}

/// One preview area. `generation` changes on every `set`, so the GUI
/// knows when to rebuild its texture.
#[derive(Clone, Debug)]
pub struct PreviewSlot {
    generation: u64,
    content: PreviewContent,
}

impl PreviewSlot {
    pub fn new(placeholder: &str) -> Self {
        Self {
            generation: 0,
            content: PreviewContent::label(placeholder),
        }
    }

    pub fn set(&mut self, content: PreviewContent) {
        self.generation += 1;
        self.content = content;
    }

    pub fn content(&self) -> &PreviewContent {
        &self.content
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Never fails: PDFs and undecodable files become labels.
pub fn render(path: &Path, max_side: u32) -> PreviewContent {
    if FileKind::from_path(path) == Some(FileKind::Pdf) {
        return PreviewContent::label(PDF_SELECTED);
    }
    match load(path) {
        Ok(img) => PreviewContent::Image(thumbnail(&img, max_side)),
        Err(e) => {
            debug!("Preview of {} failed: {}", path.display(), e);
            PreviewContent::label(PREVIEW_FAILED)
        }
    }
}

fn load(path: &Path) -> image::ImageResult<DynamicImage> {
    ImageReader::open(path)?.with_guessed_format()?.decode()
}

/// Shrinks to fit `max_side` x `max_side`, keeping the aspect ratio.
pub fn thumbnail(img: &DynamicImage, max_side: u32) -> RgbaImage {
    if img.width() <= max_side && img.height() <= max_side {
        img.to_rgba8()
    } else {
        img.thumbnail(max_side, max_side).to_rgba8()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn thumbnail_keeps_aspect_ratio() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(700, 350, Rgb([1, 2, 3])));
        let thumb = thumbnail(&img, 140);
        assert_eq!(thumb.dimensions(), (140, 70));

        let small = DynamicImage::ImageRgb8(RgbImage::from_pixel(20, 10, Rgb([1, 2, 3])));
        assert_eq!(thumbnail(&small, 140).dimensions(), (20, 10));
    }

    #[test]
    fn corrupt_image_renders_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"\x89PNG\r\n\x1a\nthis is not really a png").unwrap();
        assert_eq!(render(&path, 140), PreviewContent::label(PREVIEW_FAILED));
    }

    #[test]
    fn missing_file_renders_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.jpg");
        assert_eq!(render(&path, 140), PreviewContent::label(PREVIEW_FAILED));
    }

    #[test]
    fn pdf_is_not_rasterized() {
        assert_eq!(
            render(Path::new("whatever/report.PDF"), 140),
            PreviewContent::label(PDF_SELECTED)
        );
    }

    #[test]
    fn valid_image_renders_thumbnail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        RgbImage::from_pixel(300, 150, Rgb([200, 100, 50])).save(&path).unwrap();
        match render(&path, 140) {
            PreviewContent::Image(thumb) => assert_eq!(thumb.dimensions(), (140, 70)),
            other => panic!("expected image preview, got {:?}", other),
        }
    }

    #[test]
    fn slot_generation_advances_on_set() {
        let mut slot = PreviewSlot::new("Original");
        assert_eq!(slot.generation(), 0);
        slot.set(PreviewContent::label(PDF_SELECTED));
        assert_eq!(slot.generation(), 1);
        assert_eq!(slot.content(), &PreviewContent::label(PDF_SELECTED));
    }
}
