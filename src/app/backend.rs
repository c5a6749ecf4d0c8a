// backend.rs
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, RgbImage};
use std::sync::Arc;

use crate::app::pdf;
use crate::error::{AppError, Result};

/// JPEG encoder fidelity, 1 (smallest) to 100 (best).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u8) -> Result<Quality> {
        if (1..=100).contains(&value) {
            Ok(Quality(value))
        } else {
            Err(AppError::InvalidQuality(value))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

pub trait ImageBackend: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage>;
    fn encode_jpeg(&self, image: &RgbImage, quality: Quality) -> Result<Vec<u8>>;
}

pub trait PdfBackend: Send + Sync {
    /// Drops page resources that no content stream refers to.
    fn strip_unreferenced(&self, document: &[u8]) -> Result<Vec<u8>>;
    /// A one-page document showing `image` at `dpi`.
    fn image_to_pdf(&self, image: &RgbImage, dpi: f32) -> Result<Vec<u8>>;
}

pub struct ImageCrateBackend;

impl ImageBackend for ImageCrateBackend {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage> {
        Ok(image::load_from_memory(bytes)?)
    }

    fn encode_jpeg(&self, image: &RgbImage, quality: Quality) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        {
            let mut encoder = JpegEncoder::new_with_quality(&mut out, quality.get());
            encoder.encode(image.as_raw(), image.width(), image.height(), ColorType::Rgb8)?;
        }
        Ok(out)
    }
}

pub struct LopdfBackend;

impl PdfBackend for LopdfBackend {
    fn strip_unreferenced(&self, document: &[u8]) -> Result<Vec<u8>> {
        let mut doc = lopdf::Document::load_mem(document)?;
        pdf::remove_unreferenced_resources(&mut doc)?;
        doc.renumber_objects();
        pdf::save_to_vec(&mut doc)
    }

    fn image_to_pdf(&self, image: &RgbImage, dpi: f32) -> Result<Vec<u8>> {
        let mut doc = pdf::single_page_document(image, dpi)?;
        pdf::save_to_vec(&mut doc)
    }
}

/// The codecs every operation goes through. Tests swap in their own.
#[derive(Clone)]
pub struct Backends {
    pub image: Arc<dyn ImageBackend>,
    pub pdf: Arc<dyn PdfBackend>,
}

impl Default for Backends {
    fn default() -> Self {
        Self {
            image: Arc::new(ImageCrateBackend),
            pdf: Arc::new(LopdfBackend),
        }
    }
}
