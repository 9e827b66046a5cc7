//! The seam between the controller and the compositing service.

use std::future::Future;

use crate::request::SubmissionRequest;
use crate::types::TransportError;

/// Delivers a [`SubmissionRequest`] to the service's edit endpoint.
///
/// Implementations own the HTTP details and the timeout. On a 2xx
/// response they return the body text; every other outcome is a
/// [`TransportError`]. Body parsing stays in the core
/// ([`crate::request::CompositeResponse::parse`]).
pub trait Transport {
    /// Send one request and wait for the response body.
    fn send(&self, request: SubmissionRequest) -> impl Future<Output = Result<String, TransportError>>;
}
