// file_dialogs.rs
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageLevel};
use std::path::PathBuf;

use crate::app::formats::{IMAGE_EXTENSIONS, PDF_EXTENSIONS, SUPPORTED_EXTENSIONS};

pub fn select_file() -> Option<PathBuf> {
    FileDialog::new()
        .add_filter("All Supported Files", SUPPORTED_EXTENSIONS)
        .add_filter("Image Files", IMAGE_EXTENSIONS)
        .add_filter("PDF Files", PDF_EXTENSIONS)
        .pick_file()
}

/// Blocks until the user dismisses the dialog.
pub fn show_error(title: &str, message: &str) {
    MessageDialog::new()
        .set_level(MessageLevel::Error)
        .set_title(title)
        .set_description(message)
        .set_buttons(MessageButtons::Ok)
        .show();
}
