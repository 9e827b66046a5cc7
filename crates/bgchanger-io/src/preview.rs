//! Scoped Blob URLs for local image previews.
//!
//! A [`PreviewUrl`] creates an object URL on construction and revokes it
//! when dropped, so a preview lives exactly as long as the handle that
//! owns it. Replacing a selected image or resetting the form drops the
//! old handle and with it the URL.

use wasm_bindgen::JsValue;
use web_sys::BlobPropertyBag;

/// MIME type used when the bytes are not a recognised image format.
const FALLBACK_MIME: &str = "application/octet-stream";

/// Errors that can occur while creating a preview URL.
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for PreviewError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

/// An object URL for an in-memory image, revoked on drop.
#[derive(Debug)]
pub struct PreviewUrl {
    url: String,
}

impl PreviewUrl {
    /// Wrap `bytes` in a typed `Blob` and create an object URL for it.
    ///
    /// # Errors
    ///
    /// Returns [`PreviewError::JsError`] if Blob or URL creation fails.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PreviewError> {
        let uint8_array = js_sys::Uint8Array::from(bytes);
        let parts = js_sys::Array::new();
        parts.push(&uint8_array);

        let opts = BlobPropertyBag::new();
        opts.set_type(sniff_mime(bytes));
        let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &opts)?;

        let url = web_sys::Url::create_object_url_with_blob(&blob)?;
        Ok(Self { url })
    }

    /// The `blob:` URL, for an `<img src>`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.url
    }
}

impl Drop for PreviewUrl {
    fn drop(&mut self) {
        // Best-effort: the URL may already be gone with its document.
        let _ = web_sys::Url::revoke_object_url(&self.url);
    }
}

/// MIME type for `bytes`, detected from their magic number.
#[must_use]
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes).map_or(FALLBACK_MIME, |format| format.to_mime_type())
}
