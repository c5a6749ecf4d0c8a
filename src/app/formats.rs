// formats.rs
use std::path::Path;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp"];
pub const PDF_EXTENSIONS: &[&str] = &["pdf"];
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "pdf"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKind {
    Image,
    Pdf,
}

impl FileKind {
    /// Classifies by extension only, case-insensitively.
    pub fn from_path(path: &Path) -> Option<FileKind> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(FileKind::Image)
        } else if PDF_EXTENSIONS.contains(&ext.as_str()) {
            Some(FileKind::Pdf)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_extensions_case_insensitively() {
        assert_eq!(FileKind::from_path(Path::new("a/photo.JPG")), Some(FileKind::Image));
        assert_eq!(FileKind::from_path(Path::new("scan.bmp")), Some(FileKind::Image));
        assert_eq!(FileKind::from_path(Path::new("report.Pdf")), Some(FileKind::Pdf));
        assert_eq!(FileKind::from_path(Path::new("notes.txt")), None);
        assert_eq!(FileKind::from_path(Path::new("no_extension")), None);
    }
}
