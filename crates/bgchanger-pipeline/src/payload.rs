//! Base64 image payloads as they cross the wire.
//!
//! The service exchanges bare base64 strings. Browser APIs tend to
//! produce data URLs (`data:image/png;base64,...`), so [`Base64Payload`]
//! strips any such prefix on construction and only ever holds the bare
//! payload.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// MIME type of every composited result.
pub const RESULT_MIME: &str = "image/png";

/// A base64 string with no data-URL scheme prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Base64Payload(String);

impl Base64Payload {
    /// Encode raw bytes with the standard alphabet.
    #[must_use]
    pub fn encode(bytes: &[u8]) -> Self {
        Self(STANDARD.encode(bytes))
    }

    /// Wrap base64 text, dropping a leading `data:<mime>;base64,` if present.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self(strip_data_url_prefix(text.trim()).to_owned())
    }

    /// The bare base64 text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the payload carries no data.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render as a data URL for `mime`.
    #[must_use]
    pub fn to_data_url(&self, mime: &str) -> String {
        format!("data:{mime};base64,{}", self.0)
    }

    /// Decode back to bytes.
    ///
    /// # Errors
    ///
    /// Returns the decoder error if the text is not valid base64.
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.0)
    }
}

/// Everything after the first comma of a `data:` URL; other text unchanged.
#[must_use]
pub fn strip_data_url_prefix(text: &str) -> &str {
    if text.starts_with("data:") {
        text.split_once(',').map_or("", |(_, payload)| payload)
    } else {
        text
    }
}

/// A composited image returned by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultImage {
    payload: Base64Payload,
}

impl ResultImage {
    /// Wrap a non-empty payload.
    #[must_use]
    pub fn new(payload: Base64Payload) -> Option<Self> {
        (!payload.is_empty()).then_some(Self { payload })
    }

    /// The bare payload.
    #[must_use]
    pub const fn payload(&self) -> &Base64Payload {
        &self.payload
    }

    /// `<img src>` value: `data:image/png;base64,<payload>`.
    #[must_use]
    pub fn src(&self) -> String {
        self.payload.to_data_url(RESULT_MIME)
    }

    /// Decoded PNG bytes, for saving the result.
    ///
    /// # Errors
    ///
    /// Returns the decoder error if the service sent invalid base64.
    pub fn png_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        self.payload.decode()
    }
}
