//! CV files: upload preconditions and on-disk storage.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::UploadError;

/// Largest CV accepted, in bytes.
pub const MAX_CV_BYTES: usize = 5 * 1024 * 1024;

/// A file picked by the visitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CvFile {
    pub filename: String,
    pub content: Vec<u8>,
}

impl CvFile {
    pub fn new(filename: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content,
        }
    }

    /// Check the upload preconditions: a named PDF of at most 5 MB.
    pub fn validate(&self) -> Result<(), UploadError> {
        if self.filename.trim().is_empty() {
            return Err(UploadError::NoFile);
        }
        if !is_allowed_file(&self.filename) {
            return Err(UploadError::NotPdf);
        }
        if self.content.len() > MAX_CV_BYTES {
            return Err(UploadError::TooLarge {
                size: self.content.len(),
            });
        }
        Ok(())
    }
}

/// Only `.pdf` (any case) is accepted.
pub fn is_allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("pdf"))
}

/// Reduce a client-supplied name to a safe ASCII file name.
///
/// Path separators become spaces, whitespace runs become `_`, anything
/// outside `[A-Za-z0-9_.-]` is dropped and leading/trailing `.`/`_` trimmed.
pub fn secure_filename(filename: &str) -> String {
    let flattened = filename.replace(['/', '\\'], " ");
    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    let trimmed = kept.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        "cv.pdf".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Directory-backed CV storage.
#[derive(Debug, Clone)]
pub struct CvStorage {
    dir: PathBuf,
}

impl CvStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the file as `<UTC timestamp>_<safe name>` and return that name.
    pub async fn store(&self, file: &CvFile, now: DateTime<Utc>) -> Result<String, UploadError> {
        file.validate()?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let stored_name = format!(
            "{}_{}",
            now.format("%Y%m%d%H%M%S"),
            secure_filename(&file.filename)
        );
        tokio::fs::write(self.dir.join(&stored_name), &file.content).await?;

        info!(file = %stored_name, bytes = file.content.len(), "CV stored");
        Ok(stored_name)
    }
}
