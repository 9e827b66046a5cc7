//! bgchanger-pipeline: the submission pipeline (sans-IO).
//!
//! Form state -> controller -> presenter:
//!
//! - [`form`] holds the parameters and the two image handles and coerces
//!   widget input at ingestion.
//! - [`controller`] drives one submit attempt: precondition check,
//!   concurrent image encoding, request assembly, the service call, and
//!   the resulting state transition.
//! - [`presenter`] maps the pipeline state to a [`Screen`].
//!
//! This crate performs no I/O of its own. Reading files and talking HTTP
//! happen behind the [`ImageSource`] and [`Transport`] traits, which
//! `bgchanger-io` implements for the browser and `bgchanger-cli` for the
//! command line.

pub mod config;
pub mod controller;
pub mod form;
pub mod payload;
pub mod presenter;
pub mod request;
pub mod source;
pub mod transport;
pub mod types;

pub use config::{ConfigError, ServiceConfig};
pub use controller::{PipelineState, Session, SessionHandle, Submission, SubmitOutcome, submit};
pub use form::{Field, FieldValue, FormError, FormParameters, FormStore, WidgetKind};
pub use payload::{Base64Payload, ResultImage};
pub use presenter::{Screen, present};
pub use request::{CompositeResponse, SubmissionRequest};
pub use source::ImageSource;
pub use transport::Transport;
pub use types::{HorizontalShift, ImageSlot, ReadError, SubmitError, TransportError};
