// image_processing.rs
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::app::backend::{Backends, Quality};
use crate::app::formats::FileKind;
use crate::app::preview::{self, PreviewContent};
use crate::app::worker::Checkpoint;
use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::utils::measure_time;

const BYTES_PER_KB: f64 = 1024.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SizeReport {
    pub original_kb: f64,
    pub compressed_kb: f64,
    pub saved_percent: f64,
}

impl SizeReport {
    /// The original is always measured in 1024-byte KB; the compressed
    /// file uses `compressed_divisor`.
    pub fn from_bytes(original: u64, compressed: u64, compressed_divisor: f64) -> Self {
        let original_kb = original as f64 / BYTES_PER_KB;
        let compressed_kb = compressed as f64 / compressed_divisor;
        let saved_percent = if original_kb > 0.0 {
            (1.0 - compressed_kb / original_kb) * 100.0
        } else {
            0.0
        };
        Self {
            original_kb,
            compressed_kb,
            saved_percent,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Compressed {
    pub kind: FileKind,
    pub output: PathBuf,
    pub report: SizeReport,
    pub preview: PreviewContent,
}

impl Compressed {
    pub fn summary(&self) -> String {
        let label = match self.kind {
            FileKind::Image => "IMAGE",
            FileKind::Pdf => "PDF",
        };
        format!(
            "✅ {} Compression Done!\nOriginal: {:.2} KB\nCompressed: {:.2} KB\nSaved: {:.2}%",
            label, self.report.original_kb, self.report.compressed_kb, self.report.saved_percent
        )
    }
}

#[derive(Clone, Debug)]
pub struct Converted {
    pub output: PathBuf,
}

impl Converted {
    pub fn summary(&self) -> String {
        let name = self
            .output
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("✅ Image converted to PDF!\nSaved as: {}", name)
    }
}

/// `compressed_<file name>` next to the input.
pub fn compressed_output_path(input: &Path, prefix: &str) -> Result<PathBuf> {
    let name = input
        .file_name()
        .ok_or_else(|| AppError::UnsupportedFile(input.to_path_buf()))?;
    Ok(sibling(input, format!("{}{}", prefix, name.to_string_lossy())))
}

/// `<stem><suffix>` next to the input.
pub fn converted_output_path(input: &Path, suffix: &str) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .ok_or_else(|| AppError::UnsupportedFile(input.to_path_buf()))?;
    Ok(sibling(input, format!("{}{}", stem.to_string_lossy(), suffix)))
}

fn sibling(input: &Path, name: String) -> PathBuf {
    input.parent().unwrap_or_else(|| Path::new("")).join(name)
}

/// Checks an input exists and has a supported extension.
pub fn classify(path: &Path) -> Result<FileKind> {
    let kind = FileKind::from_path(path).ok_or_else(|| AppError::UnsupportedFile(path.to_path_buf()))?;
    if !path.is_file() {
        return Err(AppError::MissingFile(path.to_path_buf()));
    }
    Ok(kind)
}

pub fn compress_file(
    backends: &Backends,
    config: &AppConfig,
    path: &Path,
    quality: Quality,
    checkpoint: &Checkpoint,
) -> Result<Compressed> {
    match classify(path)? {
        FileKind::Image => compress_image(backends, config, path, quality, checkpoint),
        FileKind::Pdf => compress_pdf(backends, config, path, checkpoint),
    }
}

fn compress_image(
    backends: &Backends,
    config: &AppConfig,
    path: &Path,
    quality: Quality,
    checkpoint: &Checkpoint,
) -> Result<Compressed> {
    let output = compressed_output_path(path, &config.compressed_prefix)?;

    checkpoint.stage("Decoding image")?;
    let bytes = read(path)?;
    let (decoded, took) = measure_time(|| backends.image.decode(&bytes));
    let rgb = decoded?.to_rgb8();
    debug!("Decoding {} took {:?}", path.display(), took);

    checkpoint.stage("Encoding JPEG")?;
    let (encoded, took) = measure_time(|| backends.image.encode_jpeg(&rgb, quality));
    let jpeg = encoded?;
    debug!("Encoding at quality {} took {:?}", quality.get(), took);

    checkpoint.stage("Writing output")?;
    write(&output, &jpeg)?;

    let report = SizeReport::from_bytes(file_len(path)?, file_len(&output)?, BYTES_PER_KB);
    let preview = preview::render(&output, config.preview_size);
    Ok(Compressed {
        kind: FileKind::Image,
        output,
        report,
        preview,
    })
}

fn compress_pdf(
    backends: &Backends,
    config: &AppConfig,
    path: &Path,
    checkpoint: &Checkpoint,
) -> Result<Compressed> {
    let output = compressed_output_path(path, &config.compressed_prefix)?;

    checkpoint.stage("Pruning unreferenced resources")?;
    let bytes = read(path)?;
    let (stripped, took) = measure_time(|| backends.pdf.strip_unreferenced(&bytes));
    let stripped = stripped?;
    debug!("Pruning {} took {:?}", path.display(), took);

    checkpoint.stage("Writing output")?;
    write(&output, &stripped)?;

    let report = SizeReport::from_bytes(
        file_len(path)?,
        file_len(&output)?,
        config.pdf_compressed_size_divisor,
    );
    Ok(Compressed {
        kind: FileKind::Pdf,
        output,
        report,
        preview: PreviewContent::label(preview::PDF_COMPRESSED),
    })
}

pub fn convert_to_pdf(
    backends: &Backends,
    config: &AppConfig,
    path: &Path,
    checkpoint: &Checkpoint,
) -> Result<Converted> {
    if FileKind::from_path(path) != Some(FileKind::Image) {
        return Err(AppError::UnsupportedConversion);
    }
    classify(path)?;
    let output = converted_output_path(path, &config.converted_suffix)?;

    checkpoint.stage("Decoding image")?;
    let bytes = read(path)?;
    let rgb = backends.image.decode(&bytes)?.to_rgb8();

    checkpoint.stage("Building PDF")?;
    let (document, took) = measure_time(|| backends.pdf.image_to_pdf(&rgb, config.pdf_dpi));
    let document = document?;
    debug!("Building PDF for {} took {:?}", path.display(), took);

    checkpoint.stage("Writing output")?;
    write(&output, &document)?;
    Ok(Converted { output })
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| AppError::io(path, e))
}

fn write(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).map_err(|e| AppError::io(path, e))
}

fn file_len(path: &Path) -> Result<u64> {
    Ok(fs::metadata(path).map_err(|e| AppError::io(path, e))?.len())
}
