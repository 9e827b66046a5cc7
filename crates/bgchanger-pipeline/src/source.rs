//! Image handles and their encoding for transmission.

use std::future::Future;

use crate::payload::Base64Payload;
use crate::types::{ImageSlot, ReadError, SubmitError};

/// A selected image file that can be read on demand.
///
/// Implementations are cheap handles: cloning must not copy the file
/// contents. Whatever the handle owns (a preview URL, for instance) is
/// released when the last clone is dropped.
pub trait ImageSource {
    /// Display name, usually the file name.
    fn name(&self) -> &str;

    /// Read the complete file contents.
    fn read(&self) -> impl Future<Output = Result<Vec<u8>, ReadError>>;
}

/// Read `source` and encode it as a bare base64 payload.
///
/// # Errors
///
/// Returns [`SubmitError::Encoding`] if the read fails or yields no bytes.
pub async fn encode_image<S: ImageSource>(
    slot: ImageSlot,
    source: &S,
) -> Result<Base64Payload, SubmitError> {
    let bytes = source.read().await.map_err(|e| SubmitError::Encoding {
        slot,
        reason: e.to_string(),
    })?;
    if bytes.is_empty() {
        return Err(SubmitError::Encoding {
            slot,
            reason: format!("{} is empty", source.name()),
        });
    }
    tracing::debug!(%slot, name = source.name(), len = bytes.len(), "encoded image");
    Ok(Base64Payload::encode(&bytes))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use futures::executor::block_on;

    use super::*;

    struct Fixed(Result<Vec<u8>, ReadError>);

    impl ImageSource for Fixed {
        fn name(&self) -> &str {
            "fixed.png"
        }

        async fn read(&self) -> Result<Vec<u8>, ReadError> {
            self.0.clone()
        }
    }

    #[test]
    fn encodes_bytes() {
        let payload = block_on(encode_image(ImageSlot::Subject, &Fixed(Ok(b"ABC".to_vec()))));
        assert_eq!(payload.unwrap().as_str(), "QUJD");
    }

    #[test]
    fn read_failure_names_slot() {
        let err = block_on(encode_image(
            ImageSlot::Background,
            &Fixed(Err(ReadError::new("permission denied"))),
        ))
        .unwrap_err();
        assert_eq!(
            err,
            SubmitError::Encoding {
                slot: ImageSlot::Background,
                reason: "permission denied".into(),
            }
        );
    }

    #[test]
    fn empty_file_is_an_encoding_error() {
        let err = block_on(encode_image(ImageSlot::Subject, &Fixed(Ok(Vec::new())))).unwrap_err();
        assert!(matches!(err, SubmitError::Encoding { slot: ImageSlot::Subject, .. }));
        assert_eq!(err.user_message(), "Could not read the subject image");
    }
}
