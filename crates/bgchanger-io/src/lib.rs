//! bgchanger-io: Browser I/O and Dioxus component library.
//!
//! Implements the pipeline's [`ImageSource`](bgchanger_pipeline::ImageSource)
//! and [`Transport`](bgchanger_pipeline::Transport) seams for the browser,
//! owns preview Blob URLs, raises user notifications, saves results, and
//! provides the form and result components for the web application.

pub mod components;
pub mod download;
pub mod file;
pub mod notify;
pub mod preview;
pub mod session;
pub mod transport;

pub use components::{ImagePicker, ParameterForm, ResultPanel};
pub use file::BrowserImage;
pub use session::AppSession;
pub use transport::FetchTransport;
