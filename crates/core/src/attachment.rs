//! Attachment picking
//!
//! The creation flow asks a picker for at most one file. Cancelling is not an
//! error; failing to inspect the chosen file is.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::task::Attachment;
use crate::{Error, Result};

/// Source of attachment descriptors
pub trait AttachmentPicker {
    /// Pick one file. `Ok(None)` means the user cancelled.
    fn pick(&mut self) -> Result<Option<Attachment>>;
}

/// Picker over a path the user already chose, e.g. on a command line.
///
/// An absent or blank selection counts as cancellation.
#[derive(Debug, Clone, Default)]
pub struct FileAttachmentPicker {
    selection: Option<PathBuf>,
}

impl FileAttachmentPicker {
    pub fn new(selection: Option<PathBuf>) -> Self {
        Self { selection }
    }
}

impl AttachmentPicker for FileAttachmentPicker {
    fn pick(&mut self) -> Result<Option<Attachment>> {
        match self.selection.take() {
            Some(path) if !path.as_os_str().is_empty() => describe_file(&path).map(Some),
            _ => Ok(None),
        }
    }
}

/// Build the attachment descriptor for a local file
pub fn describe_file(path: &Path) -> Result<Attachment> {
    let absolute = fs::canonicalize(path)
        .map_err(|e| Error::Attachment(format!("Cannot open {}: {}", path.display(), e)))?;
    let metadata = fs::metadata(&absolute)
        .map_err(|e| Error::Attachment(format!("Cannot inspect {}: {}", absolute.display(), e)))?;
    if !metadata.is_file() {
        return Err(Error::Attachment(format!(
            "{} is not a regular file",
            absolute.display()
        )));
    }

    let name = absolute
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut attachment = Attachment::new(format!("file://{}", absolute.display()))
        .with_name(name)
        .with_mime_type(mime_type_for(&absolute));
    attachment
        .extra
        .insert("size".to_string(), Value::from(metadata.len()));
    Ok(attachment)
}

fn mime_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "txt" | "md" => "text/plain",
        "csv" => "text/csv",
        "json" => "application/json",
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}
