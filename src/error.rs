// error.rs
use std::path::PathBuf;

use crate::app::worker::JobKind;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Please select a file first.")]
    NoSelection,

    #[error("Please select an image file first.")]
    NoImageSelection,

    #[error("File not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Unsupported file type: {}", .0.display())]
    UnsupportedFile(PathBuf),

    #[error("Only image files can be converted to PDF.")]
    UnsupportedConversion,

    #[error("Quality must be between 1 and 100, got {0}")]
    InvalidQuality(u8),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Image(#[from] image::ImageError),

    // lopdf errors are flattened to text so results can cross the job channel.
    #[error("{0}")]
    Pdf(String),

    #[error("Operation cancelled.")]
    Cancelled,

    #[error("The background task stopped unexpectedly.")]
    JobFailed,
}

impl From<lopdf::Error> for AppError {
    fn from(e: lopdf::Error) -> Self {
        AppError::Pdf(e.to_string())
    }
}

impl AppError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.into(),
            source,
        }
    }

    /// Errors the user caused by what they selected, as opposed to
    /// failures inside an operation.
    pub fn is_selection_error(&self) -> bool {
        matches!(
            self,
            AppError::NoSelection
                | AppError::NoImageSelection
                | AppError::MissingFile(_)
                | AppError::UnsupportedFile(_)
                | AppError::UnsupportedConversion
                | AppError::InvalidQuality(_)
        )
    }

    pub fn dialog_title(&self, job: JobKind) -> &'static str {
        match self {
            AppError::NoSelection
            | AppError::NoImageSelection
            | AppError::MissingFile(_)
            | AppError::InvalidQuality(_) => "Error",
            AppError::UnsupportedFile(_) | AppError::UnsupportedConversion => "Invalid File",
            _ => job.failure_title(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_errors_use_generic_titles() {
        assert_eq!(AppError::NoSelection.dialog_title(JobKind::CompressImage), "Error");
        assert_eq!(AppError::NoImageSelection.dialog_title(JobKind::ConvertToPdf), "Error");
        assert!(AppError::NoImageSelection.is_selection_error());
        assert_eq!(
            AppError::UnsupportedConversion.dialog_title(JobKind::ConvertToPdf),
            "Invalid File"
        );
        assert!(AppError::UnsupportedConversion.is_selection_error());
    }

    #[test]
    fn operation_failures_use_job_titles() {
        let err = AppError::Pdf("broken xref".to_string());
        assert_eq!(err.dialog_title(JobKind::CompressPdf), "PDF Compression Failed");
        assert_eq!(err.dialog_title(JobKind::CompressImage), "Compression Failed");
        assert_eq!(err.dialog_title(JobKind::ConvertToPdf), "Conversion Failed");
        assert!(!err.is_selection_error());
    }

    #[test]
    fn io_error_message_names_the_path() {
        let err = AppError::io(
            "/tmp/missing.png",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.to_string(), "/tmp/missing.png: gone");
    }
}
