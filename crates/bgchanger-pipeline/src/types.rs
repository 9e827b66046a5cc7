//! Shared types for the bgchanger submission pipeline.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One of the two image inputs the compositing service requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageSlot {
    /// The user photo placed into the scene.
    Subject,
    /// The scene the subject is composited onto.
    Background,
}

impl ImageSlot {
    /// Both slots, in form order.
    pub const ALL: [Self; 2] = [Self::Subject, Self::Background];

    /// Form label for the slot's file picker.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Subject => "User Selfie",
            Self::Background => "Background Image",
        }
    }
}

impl fmt::Display for ImageSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Subject => "subject",
            Self::Background => "background",
        })
    }
}

/// Horizontal placement of the subject group in the scene.
///
/// Transmitted as the integer `-1`, `0` or `1`, never as a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HorizontalShift {
    /// Shift toward the left edge (`-1`).
    Left,
    /// Keep centered (`0`).
    #[default]
    Center,
    /// Shift toward the right edge (`1`).
    Right,
}

impl HorizontalShift {
    /// All shifts, in select-option order.
    pub const ALL: [Self; 3] = [Self::Left, Self::Center, Self::Right];

    /// Wire value of the shift.
    #[must_use]
    pub const fn offset(self) -> i8 {
        match self {
            Self::Left => -1,
            Self::Center => 0,
            Self::Right => 1,
        }
    }

    /// Map a wire offset back to a shift.
    #[must_use]
    pub const fn from_offset(offset: i8) -> Option<Self> {
        match offset {
            -1 => Some(Self::Left),
            0 => Some(Self::Center),
            1 => Some(Self::Right),
            _ => None,
        }
    }

    /// Map a coerced numeric input to a shift.
    ///
    /// Only exact `-1.0`, `0.0` and `1.0` are accepted.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn from_number(value: f64) -> Option<Self> {
        Self::ALL.into_iter().find(|s| f64::from(s.offset()) == value)
    }
}

impl fmt::Display for HorizontalShift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.offset())
    }
}

impl Serialize for HorizontalShift {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.offset())
    }
}

impl<'de> Deserialize<'de> for HorizontalShift {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let offset = i8::deserialize(deserializer)?;
        Self::from_offset(offset).ok_or_else(|| {
            serde::de::Error::custom(format!("horizontal shift must be -1, 0 or 1, got {offset}"))
        })
    }
}

/// An image handle could not be read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ReadError(pub String);

impl ReadError {
    /// Wrap any displayable failure.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Failures talking to the compositing service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The request could not be delivered or the response not received.
    #[error("network error: {0}")]
    Network(String),

    /// The service answered with a non-success HTTP status.
    #[error("service returned HTTP {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// The response body was not the expected JSON document.
    #[error("malformed response body: {0}")]
    MalformedBody(String),

    /// No response arrived within the configured timeout.
    #[error("no response within {0:?}")]
    TimedOut(Duration),
}

/// Why a submit attempt ended without a displayed result.
///
/// Every variant leaves the session in `Editing`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// One or both images were not selected.
    #[error("missing required image: {}", join_slots(missing))]
    MissingInput {
        /// The empty slots, in form order.
        missing: Vec<ImageSlot>,
    },

    /// An image could not be read or encoded.
    #[error("failed to encode {slot} image: {reason}")]
    Encoding {
        /// Which image failed.
        slot: ImageSlot,
        /// Underlying read failure.
        reason: String,
    },

    /// Transport failure, non-success status, or malformed body.
    #[error("submission failed: {0}")]
    Submission(TransportError),

    /// The service did not answer in time.
    #[error("compositing service timed out after {0:?}")]
    Timeout(Duration),
}

impl SubmitError {
    /// Short message suitable for a blocking user notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingInput { .. } => "Please upload both images".to_owned(),
            Self::Encoding { slot, .. } => format!("Could not read the {slot} image"),
            Self::Submission(_) => "Submission failed".to_owned(),
            Self::Timeout(_) => "Submission timed out".to_owned(),
        }
    }
}

impl From<TransportError> for SubmitError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::TimedOut(after) => Self::Timeout(after),
            other => Self::Submission(other),
        }
    }
}

fn join_slots(slots: &[ImageSlot]) -> String {
    slots
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn shift_offsets_round_trip() {
        for shift in HorizontalShift::ALL {
            assert_eq!(HorizontalShift::from_offset(shift.offset()), Some(shift));
        }
        assert_eq!(HorizontalShift::from_offset(2), None);
    }

    #[test]
    fn shift_from_number_rejects_fractions() {
        assert_eq!(HorizontalShift::from_number(1.0), Some(HorizontalShift::Right));
        assert_eq!(HorizontalShift::from_number(-1.0), Some(HorizontalShift::Left));
        assert_eq!(HorizontalShift::from_number(0.5), None);
        assert_eq!(HorizontalShift::from_number(f64::NAN), None);
    }

    #[test]
    fn shift_serializes_as_integer() {
        let json = serde_json::to_value(HorizontalShift::Right).unwrap();
        assert_eq!(json, serde_json::json!(1));
        assert!(json.is_i64());
    }

    #[test]
    fn shift_deserialize_rejects_out_of_set() {
        let err = serde_json::from_str::<HorizontalShift>("3").unwrap_err();
        assert!(err.to_string().contains("must be -1, 0 or 1"));
    }

    #[test]
    fn missing_input_lists_slots() {
        let err = SubmitError::MissingInput {
            missing: vec![ImageSlot::Subject, ImageSlot::Background],
        };
        assert_eq!(
            err.to_string(),
            "missing required image: subject, background"
        );
        assert_eq!(err.user_message(), "Please upload both images");
    }

    #[test]
    fn timeout_is_not_a_submission_error() {
        let err = SubmitError::from(TransportError::TimedOut(Duration::from_secs(5)));
        assert_eq!(err, SubmitError::Timeout(Duration::from_secs(5)));

        let err = SubmitError::from(TransportError::Status { status: 502 });
        assert!(matches!(
            err,
            SubmitError::Submission(TransportError::Status { status: 502 })
        ));
        assert_eq!(err.user_message(), "Submission failed");
    }
}
