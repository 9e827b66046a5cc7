//! Submit lifecycle: `Editing` -> `Submitting` -> `Displaying`.
//!
//! [`Session`] owns the form and the pipeline state and performs every
//! transition synchronously. The asynchronous part of a submit (reading
//! and encoding both images, then the service call) runs on a detached
//! [`Submission`] snapshot, so the session is never borrowed across a
//! suspend point. [`submit`] strings the three steps together for any
//! [`SessionHandle`].

use std::cell::RefCell;

use futures::future::try_join;

use crate::form::{FormParameters, FormStore};
use crate::payload::ResultImage;
use crate::request::{CompositeResponse, SubmissionRequest};
use crate::source::{ImageSource, encode_image};
use crate::transport::Transport;
use crate::types::{ImageSlot, SubmitError};

/// Where the session is in the submit lifecycle.
///
/// Failures are not a state: they return the session to `Editing`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PipelineState {
    /// The form is shown and editable.
    #[default]
    Editing,
    /// A request is in flight.
    Submitting,
    /// The service returned an image.
    Displaying(ResultImage),
}

/// Form plus pipeline state for one user session.
#[derive(Debug, Clone)]
pub struct Session<S> {
    form: FormStore<S>,
    state: PipelineState,
}

impl<S> Session<S> {
    /// A fresh session with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::with_form(FormParameters::default())
    }

    /// A session starting from `params`.
    #[must_use]
    pub const fn with_form(params: FormParameters<S>) -> Self {
        Self {
            form: FormStore::new(params),
            state: PipelineState::Editing,
        }
    }

    /// The form store.
    #[must_use]
    pub const fn form(&self) -> &FormStore<S> {
        &self.form
    }

    /// Mutable access to the form. Edits are accepted in every state and
    /// never touch an in-flight request.
    pub const fn form_mut(&mut self) -> &mut FormStore<S> {
        &mut self.form
    }

    /// Current pipeline state.
    #[must_use]
    pub const fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Whether a request is in flight.
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        matches!(self.state, PipelineState::Submitting)
    }

    /// Record the outcome of the in-flight submission.
    ///
    /// Success moves to `Displaying`; any error moves back to `Editing`
    /// and is handed back for the caller to report.
    ///
    /// # Errors
    ///
    /// Returns the submission's error unchanged.
    pub fn finish_submit(
        &mut self,
        outcome: Result<ResultImage, SubmitError>,
    ) -> Result<(), SubmitError> {
        match outcome {
            Ok(image) => {
                tracing::info!("composited image received");
                self.state = PipelineState::Displaying(image);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "submission failed");
                self.state = PipelineState::Editing;
                Err(err)
            }
        }
    }

    /// Leave the result view and return to the form, keeping every
    /// parameter and both images.
    ///
    /// Returns `false` if no result was displayed.
    pub fn try_again(&mut self) -> bool {
        if matches!(self.state, PipelineState::Displaying(_)) {
            self.state = PipelineState::Editing;
            true
        } else {
            false
        }
    }

    /// Restore default parameters, clear both images and drop any
    /// displayed result.
    ///
    /// An in-flight submission keeps running from its snapshot; its
    /// outcome is still recorded when it completes.
    pub fn reset(&mut self) {
        self.form.reset();
        if !self.is_submitting() {
            self.state = PipelineState::Editing;
        }
    }
}

impl<S: Clone> Session<S> {
    /// Start a submit attempt.
    ///
    /// Returns `Ok(None)` when the attempt is ignored: a request is
    /// already in flight, or a result is displayed (no form to submit).
    /// On success the session is `Submitting` and the returned
    /// [`Submission`] carries a snapshot of the form.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::MissingInput`] if either image slot is
    /// empty. The session stays in `Editing`.
    pub fn begin_submit(&mut self) -> Result<Option<Submission<S>>, SubmitError> {
        if self.state != PipelineState::Editing {
            tracing::debug!(state = ?self.state, "submit ignored");
            return Ok(None);
        }

        let mut params = self.form.snapshot();
        let (Some(subject), Some(background)) =
            (params.subject_image.take(), params.background_image.take())
        else {
            let missing = self.form.params().missing_images();
            tracing::info!(?missing, "submit rejected: missing input");
            return Err(SubmitError::MissingInput { missing });
        };

        self.state = PipelineState::Submitting;
        Ok(Some(Submission {
            subject,
            background,
            params,
        }))
    }
}

impl<S> Default for Session<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// A submit attempt detached from the session.
///
/// Holds the form values as they were when the attempt began; later
/// edits to the session do not reach it.
#[derive(Debug)]
pub struct Submission<S> {
    subject: S,
    background: S,
    params: FormParameters<S>,
}

impl<S: ImageSource> Submission<S> {
    /// Encode both images concurrently, send the request, and parse the
    /// response.
    ///
    /// If either image fails to encode, nothing is sent.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Encoding`], [`SubmitError::Submission`] or
    /// [`SubmitError::Timeout`].
    #[allow(clippy::future_not_send)] // single-threaded; handles may be !Send
    pub async fn run<T: Transport>(self, transport: &T) -> Result<ResultImage, SubmitError> {
        let (subject, background) = try_join(
            encode_image(ImageSlot::Subject, &self.subject),
            encode_image(ImageSlot::Background, &self.background),
        )
        .await?;

        let out_of_range = self.params.out_of_range_fields();
        if !out_of_range.is_empty() {
            tracing::warn!(
                fields = ?out_of_range,
                "submitting values outside their intended ranges"
            );
        }

        let request = SubmissionRequest::new(&self.params, subject, background);
        tracing::info!(
            subject = self.subject.name(),
            background = self.background.name(),
            "sending composite request"
        );
        let body = transport.send(request).await?;
        Ok(CompositeResponse::parse(&body)?)
    }
}

/// Single-writer access to a [`Session`].
///
/// `update` must not be called re-entrantly, and callers must not hold
/// the session across an `.await`.
pub trait SessionHandle<S> {
    /// Run `f` with exclusive access to the session.
    fn update<R>(&self, f: impl FnOnce(&mut Session<S>) -> R) -> R;
}

impl<S> SessionHandle<S> for RefCell<Session<S>> {
    fn update<R>(&self, f: impl FnOnce(&mut Session<S>) -> R) -> R {
        f(&mut self.borrow_mut())
    }
}

/// How a call to [`submit`] ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The result is now displayed.
    Displayed,
    /// Another submission was in flight, or no form was shown.
    Ignored,
    /// The attempt failed; the session is back in `Editing`.
    Failed(SubmitError),
}

/// Run one complete submit attempt against `handle`'s session.
#[allow(clippy::future_not_send)] // single-threaded; handles may be !Send
pub async fn submit<S, H, T>(handle: &H, transport: &T) -> SubmitOutcome
where
    S: ImageSource + Clone,
    H: SessionHandle<S>,
    T: Transport,
{
    let submission = match handle.update(Session::begin_submit) {
        Ok(Some(submission)) => submission,
        Ok(None) => return SubmitOutcome::Ignored,
        Err(err) => return SubmitOutcome::Failed(err),
    };

    let outcome = submission.run(transport).await;

    match handle.update(|session| session.finish_submit(outcome)) {
        Ok(()) => SubmitOutcome::Displayed,
        Err(err) => SubmitOutcome::Failed(err),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::form::WidgetKind;
    use crate::payload::Base64Payload;
    use crate::types::TransportError;

    fn image() -> ResultImage {
        ResultImage::new(Base64Payload::from_text("QUJD")).unwrap()
    }

    fn ready_session() -> Session<&'static str> {
        let mut session = Session::new();
        session.form_mut().set_image(ImageSlot::Subject, "me.png");
        session.form_mut().set_image(ImageSlot::Background, "bg.png");
        session
    }

    #[test]
    fn starts_editing() {
        let session = Session::<&str>::new();
        assert_eq!(session.state(), &PipelineState::Editing);
    }

    #[test]
    fn missing_background_stays_editing() {
        let mut session = Session::new();
        session.form_mut().set_image(ImageSlot::Subject, "me.png");
        let err = session.begin_submit().unwrap_err();
        assert_eq!(
            err,
            SubmitError::MissingInput {
                missing: vec![ImageSlot::Background]
            }
        );
        assert_eq!(session.state(), &PipelineState::Editing);
    }

    #[test]
    fn begin_moves_to_submitting_and_snapshots() {
        let mut session = ready_session();
        let submission = session.begin_submit().unwrap().unwrap();
        assert!(session.is_submitting());

        session
            .form_mut()
            .set_field("user_scale", "0.9", WidgetKind::Number)
            .unwrap();
        assert!((submission.params.user_scale - 0.5).abs() < f64::EPSILON);
        assert_eq!(submission.subject, "me.png");
        assert_eq!(submission.background, "bg.png");
    }

    #[test]
    fn second_begin_is_ignored_while_submitting() {
        let mut session = ready_session();
        assert!(session.begin_submit().unwrap().is_some());
        assert!(session.begin_submit().unwrap().is_none());
        assert!(session.is_submitting());
    }

    #[test]
    fn success_displays_result() {
        let mut session = ready_session();
        session.begin_submit().unwrap();
        session.finish_submit(Ok(image())).unwrap();
        assert_eq!(session.state(), &PipelineState::Displaying(image()));
    }

    #[test]
    fn failure_returns_to_editing_with_form_intact() {
        let mut session = ready_session();
        let before = session.form().snapshot();
        session.begin_submit().unwrap();
        let err = session
            .finish_submit(Err(SubmitError::Submission(TransportError::Status {
                status: 500,
            })))
            .unwrap_err();
        assert!(matches!(err, SubmitError::Submission(_)));
        assert_eq!(session.state(), &PipelineState::Editing);
        assert_eq!(session.form().snapshot(), before);
    }

    #[test]
    fn submit_is_ignored_while_displaying() {
        let mut session = ready_session();
        session.begin_submit().unwrap();
        session.finish_submit(Ok(image())).unwrap();
        assert!(session.begin_submit().unwrap().is_none());
    }

    #[test]
    fn try_again_keeps_form() {
        let mut session = ready_session();
        session
            .form_mut()
            .set_field("color_balance", "0.8", WidgetKind::Number)
            .unwrap();
        let before = session.form().snapshot();
        session.begin_submit().unwrap();
        session.finish_submit(Ok(image())).unwrap();

        assert!(session.try_again());
        assert_eq!(session.state(), &PipelineState::Editing);
        assert_eq!(session.form().snapshot(), before);
        assert!(!session.try_again());
    }

    #[test]
    fn reset_clears_result_and_form() {
        let mut session = ready_session();
        session.begin_submit().unwrap();
        session.finish_submit(Ok(image())).unwrap();

        session.reset();
        assert_eq!(session.state(), &PipelineState::Editing);
        assert_eq!(session.form().snapshot(), FormParameters::default());
    }

    #[test]
    fn reset_during_submit_keeps_request_in_flight() {
        let mut session = ready_session();
        session.begin_submit().unwrap();
        session.reset();
        assert!(session.is_submitting());
        assert_eq!(
            session.form().params().missing_images(),
            vec![ImageSlot::Subject, ImageSlot::Background]
        );
    }
}
