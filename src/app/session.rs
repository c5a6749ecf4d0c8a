// session.rs
use std::path::{Path, PathBuf};

use crate::app::backend::Quality;
use crate::app::formats::FileKind;
use crate::app::image_processing::SizeReport;
use crate::app::preview::{self, PreviewContent, PreviewSlot};
use crate::app::worker::{JobKind, JobOutcome, JobRequest};
use crate::error::{AppError, Result};

pub const ORIGINAL_PLACEHOLDER: &str = "Original";
pub const COMPRESSED_PLACEHOLDER: &str = "Compressed";

/// Everything the main window knows about the current interaction.
/// Overwritten by every selection and operation, never persisted.
pub struct Session {
    path: Option<PathBuf>,
    pub quality: u8,
    pub last_report: Option<SizeReport>,
    pub last_output: Option<PathBuf>,
    pub result_text: String,
    pub original_preview: PreviewSlot,
    pub compressed_preview: PreviewSlot,
}

impl Session {
    pub fn new(default_quality: u8) -> Self {
        Self {
            path: None,
            quality: default_quality,
            last_report: None,
            last_output: None,
            result_text: String::new(),
            original_preview: PreviewSlot::new(ORIGINAL_PLACEHOLDER),
            compressed_preview: PreviewSlot::new(COMPRESSED_PLACEHOLDER),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn file_label(&self) -> String {
        match self.path.as_deref().and_then(Path::file_name) {
            Some(name) => name.to_string_lossy().into_owned(),
            None => "No file selected".to_string(),
        }
    }

    /// Takes a new file and forgets everything about the previous one.
    pub fn select(&mut self, path: PathBuf, preview_size: u32) {
        self.last_report = None;
        self.last_output = None;
        self.result_text.clear();
        self.compressed_preview.set(PreviewContent::label(COMPRESSED_PLACEHOLDER));
        self.original_preview.set(preview::render(&path, preview_size));
        self.path = Some(path);
    }

    pub fn compress_request(&self) -> Result<JobRequest> {
        let path = self.path.as_deref().ok_or(AppError::NoSelection)?;
        let kind = match FileKind::from_path(path) {
            Some(FileKind::Image) => JobKind::CompressImage,
            Some(FileKind::Pdf) => JobKind::CompressPdf,
            None => return Err(AppError::UnsupportedFile(path.to_path_buf())),
        };
        if !path.is_file() {
            return Err(AppError::MissingFile(path.to_path_buf()));
        }
        Ok(JobRequest {
            kind,
            path: path.to_path_buf(),
            quality: Quality::new(self.quality)?,
        })
    }

    pub fn convert_request(&self) -> Result<JobRequest> {
        let path = self.path.as_deref().ok_or(AppError::NoImageSelection)?;
        if FileKind::from_path(path) != Some(FileKind::Image) {
            return Err(AppError::UnsupportedConversion);
        }
        if !path.is_file() {
            return Err(AppError::MissingFile(path.to_path_buf()));
        }
        Ok(JobRequest {
            kind: JobKind::ConvertToPdf,
            path: path.to_path_buf(),
            quality: Quality::new(self.quality)?,
        })
    }

    pub fn apply(&mut self, outcome: JobOutcome) {
        match outcome {
            JobOutcome::Compressed(compressed) => {
                self.result_text = compressed.summary();
                self.last_report = Some(compressed.report);
                self.compressed_preview.set(compressed.preview);
                self.last_output = Some(compressed.output);
            }
            JobOutcome::Converted(converted) => {
                self.result_text = converted.summary();
                self.last_report = None;
                self.compressed_preview.set(PreviewContent::label(preview::PDF_CREATED));
                self.last_output = Some(converted.output);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::image_processing::{Compressed, Converted};
    use image::{Rgb, RgbImage};

    fn image_file(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        RgbImage::from_pixel(30, 20, Rgb([9, 9, 9])).save(&path).unwrap();
        path
    }

    fn fake_compression(output: PathBuf) -> JobOutcome {
        JobOutcome::Compressed(Compressed {
            kind: FileKind::Image,
            output,
            report: SizeReport::from_bytes(2048, 1024, 1024.0),
            preview: PreviewContent::label("thumb"),
        })
    }

    #[test]
    fn nothing_selected_is_rejected() {
        let session = Session::new(100);
        assert_eq!(session.file_label(), "No file selected");
        assert!(matches!(session.compress_request(), Err(AppError::NoSelection)));
        assert!(matches!(session.convert_request(), Err(AppError::NoImageSelection)));
        assert_eq!(
            session.convert_request().unwrap_err().to_string(),
            "Please select an image file first."
        );
    }

    #[test]
    fn selecting_another_file_resets_results_and_previews() {
        let dir = tempfile::tempdir().unwrap();
        let first = image_file(dir.path(), "first.png");
        let second = image_file(dir.path(), "second.bmp");
        let mut session = Session::new(100);

        session.select(first, 140);
        assert!(matches!(session.original_preview.content(), PreviewContent::Image(_)));
        session.apply(fake_compression(dir.path().join("compressed_first.png")));
        assert!(!session.result_text.is_empty());
        assert!(session.last_report.is_some());
        let original_generation = session.original_preview.generation();

        session.select(second, 140);
        assert_eq!(session.file_label(), "second.bmp");
        assert!(session.result_text.is_empty());
        assert!(session.last_report.is_none());
        assert!(session.last_output.is_none());
        assert_eq!(
            session.compressed_preview.content(),
            &PreviewContent::label(COMPRESSED_PLACEHOLDER)
        );
        assert!(session.original_preview.generation() > original_generation);
    }

    #[test]
    fn requests_follow_the_file_kind() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("doc.pdf");
        std::fs::write(&pdf, b"%PDF-1.5\n").unwrap();
        let mut session = Session::new(42);

        session.select(pdf, 140);
        assert_eq!(session.original_preview.content(), &PreviewContent::label(preview::PDF_SELECTED));
        let request = session.compress_request().unwrap();
        assert_eq!(request.kind, JobKind::CompressPdf);
        assert_eq!(request.quality.get(), 42);
        assert!(matches!(session.convert_request(), Err(AppError::UnsupportedConversion)));

        session.select(image_file(dir.path(), "pic.jpg"), 140);
        assert_eq!(session.convert_request().unwrap().kind, JobKind::ConvertToPdf);
        assert_eq!(session.compress_request().unwrap().kind, JobKind::CompressImage);
    }

    #[test]
    fn out_of_range_quality_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(100);
        session.select(image_file(dir.path(), "pic.png"), 140);
        session.quality = 0;
        assert!(matches!(session.compress_request(), Err(AppError::InvalidQuality(0))));
    }

    #[test]
    fn deleted_selection_is_reported_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = image_file(dir.path(), "pic.png");
        let mut session = Session::new(100);
        session.select(path.clone(), 140);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(session.compress_request(), Err(AppError::MissingFile(_))));
    }

    #[test]
    fn conversion_result_replaces_previous_report() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new(100);
        session.select(image_file(dir.path(), "pic.png"), 140);
        session.apply(fake_compression(dir.path().join("compressed_pic.png")));

        let output = dir.path().join("pic_converted.pdf");
        session.apply(JobOutcome::Converted(Converted { output: output.clone() }));
        assert!(session.last_report.is_none());
        assert_eq!(session.last_output, Some(output));
        assert!(session.result_text.contains("pic_converted.pdf"));
        assert_eq!(
            session.compressed_preview.content(),
            &PreviewContent::label(preview::PDF_CREATED)
        );
    }
}
