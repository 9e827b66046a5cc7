//! HTTP transport to the compositing service via the browser's `fetch`.
//!
//! `reqwest` compiles to `fetch` on `wasm32`. The request races a
//! `gloo-timers` timeout; whichever finishes first decides the outcome.

use std::pin::pin;
use std::time::Duration;

use bgchanger_pipeline::{ServiceConfig, SubmissionRequest, Transport, TransportError};
use futures::future::{Either, select};
use gloo_timers::future::TimeoutFuture;

/// Posts submissions to `<base_url>/edit`.
#[derive(Debug, Clone)]
pub struct FetchTransport {
    client: reqwest::Client,
    config: ServiceConfig,
}

impl FetchTransport {
    /// A transport for the service described by `config`.
    #[must_use]
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// The service configuration in use.
    #[must_use]
    pub const fn config(&self) -> &ServiceConfig {
        &self.config
    }

    #[allow(clippy::future_not_send)] // WASM is single-threaded; fetch futures are !Send
    async fn post(&self, request: SubmissionRequest) -> Result<String, TransportError> {
        let url = self.config.edit_url();
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        tracing::info!(%url, status = status.as_u16(), "compositing service responded");
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))
    }
}

impl Transport for FetchTransport {
    #[allow(clippy::future_not_send)] // WASM is single-threaded; fetch futures are !Send
    async fn send(&self, request: SubmissionRequest) -> Result<String, TransportError> {
        let timeout = self.config.timeout();
        let call = pin!(self.post(request));
        let timer = pin!(TimeoutFuture::new(timeout_millis(timeout)));

        match select(call, timer).await {
            Either::Left((result, _)) => result,
            Either::Right(((), _)) => {
                tracing::warn!(?timeout, "compositing request timed out");
                Err(TransportError::TimedOut(timeout))
            }
        }
    }
}

/// Timer delay for `timeout`, saturating at the `setTimeout` maximum.
fn timeout_millis(timeout: Duration) -> u32 {
    let max = i32::MAX.unsigned_abs();
    u32::try_from(timeout.as_millis()).map_or(max, |ms| ms.min(max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_converts_to_millis() {
        assert_eq!(timeout_millis(Duration::from_secs(120)), 120_000);
        assert_eq!(timeout_millis(Duration::from_millis(1)), 1);
    }

    #[test]
    fn huge_timeout_saturates() {
        assert_eq!(timeout_millis(Duration::from_secs(u64::MAX)), i32::MAX.unsigned_abs());
        assert_eq!(
            timeout_millis(Duration::from_secs(10_000_000)),
            i32::MAX.unsigned_abs()
        );
    }

    #[test]
    fn timeout_just_past_u32_millis_stays_positive_for_set_timeout() {
        let ms = timeout_millis(Duration::from_secs(4_294_968));
        assert_eq!(ms, i32::MAX.unsigned_abs());
        assert!(i32::try_from(ms).is_ok());
    }

    #[test]
    fn timeout_at_set_timeout_limit_is_kept() {
        let limit = Duration::from_millis(u64::from(i32::MAX.unsigned_abs()));
        assert_eq!(timeout_millis(limit), i32::MAX.unsigned_abs());
    }
}
