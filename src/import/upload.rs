//! Scoped storage for uploaded files.

use std::{fs::File, io::Write, path::Path};

use anyhow::Context;
use tempfile::NamedTempFile;

use crate::error::AppError;

const CSV_CONTENT_TYPES: &[&str] = &[
    "text/csv",
    "application/csv",
    "text/comma-separated-values",
    "application/vnd.ms-excel",
];

/// True when the part declares a CSV content type or carries a `.csv` name.
pub fn is_csv(content_type: Option<&str>, file_name: Option<&str>) -> bool {
    let by_type = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase())
        .is_some_and(|ct| CSV_CONTENT_TYPES.contains(&ct.as_str()));
    let by_name = file_name
        .map(|n| n.trim().to_ascii_lowercase())
        .is_some_and(|n| n.ends_with(".csv"));
    by_type || by_name
}

/// An upload spooled to disk. The file is removed when this value is dropped,
/// whichever way the request ends.
pub struct SpooledUpload {
    file: NamedTempFile,
}

impl SpooledUpload {
    pub fn write(dir: &Path, bytes: &[u8]) -> Result<Self, AppError> {
        let mut file = tempfile::Builder::new()
            .prefix("clientes-")
            .suffix(".csv")
            .tempfile_in(dir)
            .with_context(|| format!("create upload file in {}", dir.display()))?;
        file.write_all(bytes).context("write upload")?;
        file.flush().context("flush upload")?;
        tracing::debug!(path = %file.path().display(), size = bytes.len(), "upload spooled");
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Independent read handle positioned at the start of the file.
    pub fn reopen(&self) -> Result<File, AppError> {
        Ok(self.file.reopen().context("reopen upload")?)
    }
}

impl Drop for SpooledUpload {
    fn drop(&mut self) {
        tracing::debug!(path = %self.file.path().display(), "upload released");
    }
}
