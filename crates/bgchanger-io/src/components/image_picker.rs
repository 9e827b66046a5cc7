//! File picker for one image slot, with a local preview.

use bgchanger_pipeline::ImageSlot;
use dioxus::prelude::*;

use crate::file::BrowserImage;

/// Props for the [`ImagePicker`] component.
#[derive(Props, Clone, PartialEq)]
pub struct ImagePickerProps {
    /// Which image this picker fills.
    slot: ImageSlot,
    /// `blob:` URL of the currently selected image, if any.
    preview: Option<String>,
    /// Disable the input while a submission is in flight.
    disabled: bool,
    /// Called with the loaded image after a successful selection.
    on_select: EventHandler<BrowserImage>,
}

/// A labelled `<input type="file">` accepting any image type.
///
/// Selecting a file loads it into a [`BrowserImage`] and fires
/// `on_select`. Clearing the selection in the browser dialog leaves the
/// previous image in place.
#[component]
pub fn ImagePicker(props: ImagePickerProps) -> Element {
    let mut error = use_signal(|| Option::<String>::None);
    let slot = props.slot;
    let on_select = props.on_select;

    let handle_files = move |evt: FormEvent| async move {
        let Some(file) = evt.files().into_iter().next() else {
            return;
        };
        match BrowserImage::load(file).await {
            Ok(image) => {
                error.set(None);
                on_select.call(image);
            }
            Err(e) => {
                tracing::warn!(%slot, error = %e, "could not load image");
                error.set(Some(e.to_string()));
            }
        }
    };

    let id = format!("{slot}_image");
    let label = slot.label();

    rsx! {
        div { class: "field image-picker",
            label { r#for: "{id}", class: "field-label", "{label}" }
            input {
                r#type: "file",
                id: "{id}",
                accept: "image/*",
                disabled: props.disabled,
                onchange: handle_files,
            }
            if let Some(ref err) = error() {
                p { class: "field-error", "{err}" }
            }
            if let Some(ref url) = props.preview {
                img {
                    class: "preview",
                    src: "{url}",
                    alt: "{label} preview",
                }
            }
        }
    }
}
