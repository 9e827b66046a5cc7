//! Maps pipeline state to what the page shows.

use crate::controller::PipelineState;

/// Rendering instruction for the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// The parameter form, pre-populated from the store.
    Form {
        /// A request is in flight: inputs stay visible, submit is disabled
        /// and shows a loading indicator.
        busy: bool,
    },
    /// Only the composited image and a control to return to the form.
    Result {
        /// `<img src>` for the result.
        image_src: String,
    },
}

impl Screen {
    /// Whether the submit control accepts clicks.
    #[must_use]
    pub const fn submit_enabled(&self) -> bool {
        matches!(self, Self::Form { busy: false })
    }
}

/// Decide what to show for `state`.
#[must_use]
pub fn present(state: &PipelineState) -> Screen {
    match state {
        PipelineState::Editing => Screen::Form { busy: false },
        PipelineState::Submitting => Screen::Form { busy: true },
        PipelineState::Displaying(image) => Screen::Result {
            image_src: image.src(),
        },
    }
}
