//! Saving the composited result to disk.
//!
//! The browser has no direct save API, so a download is triggered by
//! pointing a temporary `<a download>` element at a Blob URL and
//! clicking it.

use bgchanger_pipeline::ResultImage;
use bgchanger_pipeline::payload::RESULT_MIME;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::BlobPropertyBag;

/// File name offered for the saved result.
pub const RESULT_FILENAME: &str = "composited.png";

/// Errors that can occur when saving the result.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// The result payload is not valid base64.
    #[error("result image is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for DownloadError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

/// Download `image` as [`RESULT_FILENAME`].
///
/// # Errors
///
/// Returns [`DownloadError::Decode`] if the payload cannot be decoded,
/// or [`DownloadError::JsError`] if a browser API call fails.
pub fn save_result(image: &ResultImage) -> Result<(), DownloadError> {
    let bytes = image.png_bytes()?;
    trigger_download(&bytes, RESULT_FILENAME, RESULT_MIME)?;
    tracing::info!(len = bytes.len(), "result downloaded");
    Ok(())
}

/// Offer `data` to the user as a file named `filename`.
///
/// # Errors
///
/// Returns [`DownloadError::JsError`] if Blob, URL or element creation
/// fails.
pub fn trigger_download(data: &[u8], filename: &str, mime_type: &str) -> Result<(), DownloadError> {
    let window =
        web_sys::window().ok_or_else(|| DownloadError::JsError("no global window".into()))?;
    let document = window
        .document()
        .ok_or_else(|| DownloadError::JsError("no document".into()))?;

    let parts = js_sys::Array::new();
    parts.push(&js_sys::Uint8Array::from(data));
    let opts = BlobPropertyBag::new();
    opts.set_type(mime_type);
    let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &opts)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob)?;

    // The URL is revoked whether or not the click went through.
    with_release(
        url,
        |url| click_link(&document, url, filename),
        |url| {
            let _ = web_sys::Url::revoke_object_url(url);
        },
    )
}

/// Click a temporary `<a href=url download=filename>`.
fn click_link(
    document: &web_sys::Document,
    url: &str,
    filename: &str,
) -> Result<(), DownloadError> {
    let anchor = document
        .create_element("a")?
        .dyn_into::<web_sys::HtmlAnchorElement>()
        .map_err(|e| DownloadError::JsError(format!("failed to cast element: {e:?}")))?;
    anchor.set_href(url);
    anchor.set_download(filename);

    let body = document
        .body()
        .ok_or_else(|| DownloadError::JsError("no document body".into()))?;
    body.append_child(&anchor)?;
    anchor.click();

    // The download has started; cleanup failures are not download failures.
    let _ = body.remove_child(&anchor);
    Ok(())
}

/// Run `f` on `resource`, then `release` it on success and failure alike.
fn with_release<R, T, E>(
    resource: R,
    f: impl FnOnce(&R) -> Result<T, E>,
    release: impl FnOnce(&R),
) -> Result<T, E> {
    let result = f(&resource);
    release(&resource);
    result
}
