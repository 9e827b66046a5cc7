//! Dioxus UI components for bgchanger.
//!
//! The two image pickers, the parameter form, and the result view.

mod image_picker;
mod parameters;
mod result;

pub use image_picker::ImagePicker;
pub use parameters::ParameterForm;
pub use result::ResultPanel;
