//! Blocking user notifications.

use bgchanger_pipeline::SubmitError;
use wasm_bindgen::JsValue;

/// Errors that can occur while showing a notification.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for NotifyError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

/// Show `message` in a modal `window.alert`.
///
/// # Errors
///
/// Returns [`NotifyError::JsError`] if there is no window or the alert
/// cannot be shown.
pub fn alert(message: &str) -> Result<(), NotifyError> {
    let window = web_sys::window().ok_or_else(|| NotifyError::JsError("no global window".into()))?;
    window.alert_with_message(message)?;
    Ok(())
}

/// Log a failed submission and tell the user.
pub fn report(err: &SubmitError) {
    tracing::error!(error = %err, "submission failed");
    if let Err(e) = alert(&err.user_message()) {
        tracing::warn!(error = %e, "could not show alert");
    }
}
