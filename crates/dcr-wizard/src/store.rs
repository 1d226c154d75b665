//! Image storage collaborator
//!
//! The wizard never decodes images. It checks the file extension against
//! the configured list, then hands the bytes to an [`ImageStore`] and keeps
//! the returned [`ImageRef`].

use async_trait::async_trait;
use dcr_chart::ImageRef;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// File as received from the host's upload widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadFile {
    /// Original file name
    pub file_name: String,
    /// Raw content
    #[serde(default, skip_serializing)]
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Create new upload
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Lowercased extension, empty when the name has none
    #[must_use]
    pub fn extension(&self) -> String {
        match self.file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => ext.to_ascii_lowercase(),
            _ => String::new(),
        }
    }
}

/// Upload failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    /// Extension not in the accepted list
    #[error("unsupported image format '{extension}', expected '{expected}'")]
    UnsupportedImageFormat {
        /// Extension of the rejected file
        extension: String,
        /// Accepted extensions, quoted and joined
        expected: String,
    },

    /// Store did not answer in time
    #[error("upload timed out after {timeout_ms}ms")]
    Timeout {
        /// Configured limit
        timeout_ms: u64,
    },

    /// Store failed
    #[error("image storage failed: {0}")]
    Storage(String),
}

/// Where uploaded images go
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store `file` and return a handle to it
    ///
    /// # Errors
    /// Implementation-specific [`UploadError`].
    async fn upload(&self, file: UploadFile) -> Result<ImageRef, UploadError>;
}

/// Process-local store keeping uploads in memory
#[derive(Debug, Default)]
pub struct InMemoryImageStore {
    files: Mutex<HashMap<Uuid, UploadFile>>,
}

impl InMemoryImageStore {
    /// Create empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored images
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.lock().len()
    }

    /// True when nothing was uploaded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.lock().is_empty()
    }

    /// Stored content of an image
    #[must_use]
    pub fn get(&self, image: &ImageRef) -> Option<UploadFile> {
        self.files.lock().get(&image.id).cloned()
    }
}

#[async_trait]
impl ImageStore for InMemoryImageStore {
    async fn upload(&self, file: UploadFile) -> Result<ImageRef, UploadError> {
        let image = ImageRef::new(file.file_name.clone());
        tracing::debug!(file = %file.file_name, bytes = file.bytes.len(), "image stored");
        self.files.lock().insert(image.id, file);
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(UploadFile::new("case_1.JPEG", Vec::<u8>::new()).extension(), "jpeg");
        assert_eq!(UploadFile::new("scan.tar.png", Vec::<u8>::new()).extension(), "png");
        assert_eq!(UploadFile::new("noext", Vec::<u8>::new()).extension(), "");
        assert_eq!(UploadFile::new(".jpeg", Vec::<u8>::new()).extension(), "");
    }

    #[tokio::test]
    async fn in_memory_store_keeps_bytes() {
        let store = InMemoryImageStore::new();
        let image = store
            .upload(UploadFile::new("case_1.jpeg", vec![0xFF, 0xD8]))
            .await
            .unwrap();

        assert_eq!(image.file_name, "case_1.jpeg");
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&image).unwrap().bytes, vec![0xFF, 0xD8]);
    }
}
