//! The app-wide session, shared between components through a signal.

use bgchanger_pipeline::{Session, SessionHandle};
use dioxus::prelude::*;

use crate::file::BrowserImage;

/// Reactive handle to the page's single [`Session`].
///
/// Every read through [`with`](Self::with) subscribes the calling
/// component, and every write through [`SessionHandle::update`] re-renders
/// the subscribers.
#[derive(Clone, Copy, PartialEq)]
pub struct AppSession(Signal<Session<BrowserImage>>);

impl AppSession {
    /// Create the session in the current component scope.
    ///
    /// Call once from a hook in the root component.
    #[must_use]
    pub fn new() -> Self {
        Self(Signal::new(Session::new()))
    }

    /// Read the session.
    pub fn with<R>(&self, f: impl FnOnce(&Session<BrowserImage>) -> R) -> R {
        f(&self.0.read())
    }
}

impl Default for AppSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionHandle<BrowserImage> for AppSession {
    fn update<R>(&self, f: impl FnOnce(&mut Session<BrowserImage>) -> R) -> R {
        let mut signal = self.0;
        f(&mut signal.write())
    }
}
