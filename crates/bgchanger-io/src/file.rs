//! Browser file handles for the two image slots.

use std::fmt;
use std::rc::Rc;

use bgchanger_pipeline::{ImageSource, ReadError};
use dioxus::html::FileData;

use crate::preview::PreviewUrl;

/// A file chosen in the picker, plus its preview URL.
///
/// Cloning shares the preview; the URL is revoked when the last clone
/// is dropped (slot replaced, form reset, and any in-flight submission
/// finished).
#[derive(Clone)]
pub struct BrowserImage {
    file: FileData,
    name: String,
    preview: Rc<PreviewUrl>,
}

impl BrowserImage {
    /// Read `file` once to build its preview.
    ///
    /// The contents are read again at submit time, so a file that
    /// changes on disk in between is sent as it is then.
    ///
    /// # Errors
    ///
    /// Returns a [`ReadError`] if the file cannot be read or the preview
    /// URL cannot be created.
    #[allow(clippy::future_not_send)] // WASM is single-threaded; FileData is !Send
    pub async fn load(file: FileData) -> Result<Self, ReadError> {
        let name = file.name();
        let bytes = file
            .read_bytes()
            .await
            .map_err(|e| ReadError::new(format!("failed to read {name}: {e}")))?;
        let preview = PreviewUrl::from_bytes(&bytes)
            .map_err(|e| ReadError::new(format!("failed to preview {name}: {e}")))?;
        tracing::debug!(%name, len = bytes.len(), "image selected");
        Ok(Self {
            file,
            name,
            preview: Rc::new(preview),
        })
    }

    /// `blob:` URL showing the selected image.
    #[must_use]
    pub fn preview_url(&self) -> &str {
        self.preview.as_str()
    }
}

impl ImageSource for BrowserImage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read(&self) -> Result<Vec<u8>, ReadError> {
        self.file
            .read_bytes()
            .await
            .map(|bytes| bytes.to_vec())
            .map_err(|e| ReadError::new(format!("failed to read {}: {e}", self.name)))
    }
}

impl fmt::Debug for BrowserImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrowserImage")
            .field("name", &self.name)
            .field("preview", &self.preview.as_str())
            .finish_non_exhaustive()
    }
}
