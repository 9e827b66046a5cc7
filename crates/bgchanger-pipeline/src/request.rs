//! Wire types for the compositing service's `POST /edit` endpoint.

use serde::{Deserialize, Serialize};

use crate::form::FormParameters;
use crate::payload::{Base64Payload, ResultImage};
use crate::types::{HorizontalShift, TransportError};

/// Path appended to the configured base URL.
pub const EDIT_PATH: &str = "/edit";

/// Output format requested from the service.
pub const OUTPUT_FORMAT: &str = "png";

/// Safety tolerance level sent with every request.
pub const SAFETY_TOLERANCE: u8 = 2;

/// Edge feather radius in pixels sent with every request.
pub const FEATHER_PX: u32 = 3;

/// JSON body of one submit attempt.
///
/// Built once from a form snapshot and the two encoded images, then
/// consumed by the transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionRequest {
    /// Subject image, bare base64.
    pub image_base64: Base64Payload,
    /// Background image, bare base64.
    pub background_b64: Base64Payload,
    /// Attire prompt.
    pub prompt: String,
    /// Fraction of the frame top kept clear.
    pub idol_safe_zone_top: f64,
    /// Minimum group scale.
    pub min_group_scale: f64,
    /// Maximum group scale.
    pub max_group_scale: f64,
    /// User scale.
    pub user_scale: f64,
    /// Horizontal placement, sent as -1, 0 or 1.
    pub horizontal_shift: HorizontalShift,
    /// Color balance.
    pub color_balance: f64,
    /// Always [`OUTPUT_FORMAT`].
    pub output_format: &'static str,
    /// Always `false`.
    pub prompt_upsampling: bool,
    /// Always [`SAFETY_TOLERANCE`].
    pub safety_tolerance: u8,
    /// Always [`FEATHER_PX`].
    pub feather_px: u32,
}

impl SubmissionRequest {
    /// Assemble a request from form values and encoded images.
    #[must_use]
    pub fn new<S>(
        params: &FormParameters<S>,
        subject: Base64Payload,
        background: Base64Payload,
    ) -> Self {
        Self {
            image_base64: subject,
            background_b64: background,
            prompt: params.prompt.clone(),
            idol_safe_zone_top: params.idol_safe_zone_top,
            min_group_scale: params.min_group_scale,
            max_group_scale: params.max_group_scale,
            user_scale: params.user_scale,
            horizontal_shift: params.horizontal_shift,
            color_balance: params.color_balance,
            output_format: OUTPUT_FORMAT,
            prompt_upsampling: false,
            safety_tolerance: SAFETY_TOLERANCE,
            feather_px: FEATHER_PX,
        }
    }
}

/// JSON body of a successful service response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CompositeResponse {
    /// Base64 PNG of the composited scene.
    pub composited_image: String,
}

impl CompositeResponse {
    /// Parse a response body into a displayable image.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::MalformedBody`] if the body is not JSON,
    /// lacks `composited_image`, or carries an empty or non-base64 image.
    pub fn parse(body: &str) -> Result<ResultImage, TransportError> {
        let response: Self = serde_json::from_str(body)
            .map_err(|e| TransportError::MalformedBody(e.to_string()))?;
        let image = ResultImage::new(Base64Payload::from_text(&response.composited_image))
            .ok_or_else(|| TransportError::MalformedBody("composited_image is empty".into()))?;
        image.png_bytes().map_err(|e| {
            TransportError::MalformedBody(format!("composited_image is not valid base64: {e}"))
        })?;
        Ok(image)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn request_has_every_wire_key() {
        let params = FormParameters::<()>::default();
        let request = SubmissionRequest::new(
            &params,
            Base64Payload::from_text("U1VCSg=="),
            Base64Payload::from_text("QkFDSw=="),
        );
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "image_base64": "U1VCSg==",
                "background_b64": "QkFDSw==",
                "prompt": "The attire is a Bengali attire",
                "idol_safe_zone_top": 0.3,
                "min_group_scale": 0.4,
                "max_group_scale": 0.7,
                "user_scale": 0.5,
                "horizontal_shift": 0,
                "color_balance": 0.3,
                "output_format": "png",
                "prompt_upsampling": false,
                "safety_tolerance": 2,
                "feather_px": 3,
            })
        );
    }

    #[test]
    fn numeric_fields_are_json_numbers() {
        let params = FormParameters::<()> {
            horizontal_shift: HorizontalShift::Left,
            ..FormParameters::default()
        };
        let request = SubmissionRequest::new(
            &params,
            Base64Payload::encode(b"a"),
            Base64Payload::encode(b"b"),
        );
        let json = serde_json::to_value(&request).unwrap();
        for key in [
            "idol_safe_zone_top",
            "min_group_scale",
            "max_group_scale",
            "user_scale",
            "horizontal_shift",
            "color_balance",
        ] {
            assert!(json[key].is_number(), "{key} should be a number");
        }
        assert_eq!(json["horizontal_shift"], serde_json::json!(-1));
    }

    #[test]
    fn parse_accepts_bare_payload() {
        let image = CompositeResponse::parse(r#"{"composited_image":"iVBORw0K"}"#).unwrap();
        assert_eq!(image.src(), "data:image/png;base64,iVBORw0K");
    }

    #[test]
    fn parse_strips_prefix_from_service() {
        let image =
            CompositeResponse::parse(r#"{"composited_image":"data:image/png;base64,iVBORw0K"}"#)
                .unwrap();
        assert_eq!(image.payload().as_str(), "iVBORw0K");
    }

    #[test]
    fn parse_rejects_missing_field() {
        let err = CompositeResponse::parse(r#"{"status":"ok"}"#).unwrap_err();
        assert!(matches!(err, TransportError::MalformedBody(_)));
    }

    #[test]
    fn parse_rejects_non_json() {
        let err = CompositeResponse::parse("<html>502</html>").unwrap_err();
        assert!(matches!(err, TransportError::MalformedBody(_)));
    }

    #[test]
    fn parse_rejects_empty_image() {
        let err = CompositeResponse::parse(r#"{"composited_image":""}"#).unwrap_err();
        assert_eq!(
            err,
            TransportError::MalformedBody("composited_image is empty".into())
        );
    }

    #[test]
    fn parse_rejects_non_base64_image() {
        let err = CompositeResponse::parse(r#"{"composited_image":"%%%"}"#).unwrap_err();
        let TransportError::MalformedBody(msg) = &err else {
            panic!("expected a malformed body, got {err:?}");
        };
        assert!(msg.starts_with("composited_image is not valid base64"), "{msg}");
    }
}
