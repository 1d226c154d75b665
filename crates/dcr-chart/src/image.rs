//! Uploaded case image reference
//!
//! The chart never sees image bytes; it only needs to know whether an
//! image has been uploaded and which one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Handle to an image held by the host's image store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRef {
    /// Storage identifier
    pub id: Uuid,
    /// Original file name, e.g. `case_1.jpeg`
    pub file_name: String,
    /// Upload time
    pub uploaded_at: DateTime<Utc>,
}

impl ImageRef {
    /// New reference stamped with the current time
    #[must_use]
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_name: file_name.into(),
            uploaded_at: Utc::now(),
        }
    }

    /// File name without its extension (`case_1.jpeg` → `case_1`)
    #[must_use]
    pub fn stem(&self) -> &str {
        match self.file_name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.file_name,
        }
    }
}

/// Currently active image of a case, or none
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageContext {
    current: Option<ImageRef>,
}

impl ImageContext {
    /// Context with no image
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Context holding `image`
    #[inline]
    #[must_use]
    pub fn with_image(image: ImageRef) -> Self {
        Self {
            current: Some(image),
        }
    }

    /// Active image, if any
    #[inline]
    #[must_use]
    pub fn current(&self) -> Option<&ImageRef> {
        self.current.as_ref()
    }

    /// True once an image has been uploaded
    #[inline]
    #[must_use]
    pub fn is_uploaded(&self) -> bool {
        self.current.is_some()
    }

    /// Replace the active image, returning the previous one
    pub fn set(&mut self, image: ImageRef) -> Option<ImageRef> {
        tracing::debug!(file = %image.file_name, "image context updated");
        self.current.replace(image)
    }

    /// Drop the active image
    pub fn clear(&mut self) -> Option<ImageRef> {
        self.current.take()
    }
}
