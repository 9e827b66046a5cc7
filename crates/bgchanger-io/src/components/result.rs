//! The composited result, shown in place of the form.

use bgchanger_pipeline::{PipelineState, Session, SessionHandle};
use dioxus::prelude::*;

use crate::download;
use crate::session::AppSession;

/// Props for the [`ResultPanel`] component.
#[derive(Props, Clone, PartialEq)]
pub struct ResultPanelProps {
    /// The session holding the displayed result.
    session: AppSession,
    /// `<img src>` for the result.
    image_src: String,
}

/// The result image with "Try Again" and "Download PNG" controls.
#[component]
pub fn ResultPanel(props: ResultPanelProps) -> Element {
    let session = props.session;
    let mut error = use_signal(|| Option::<String>::None);

    let on_download = move |_| {
        let saved = session.with(|s| match s.state() {
            PipelineState::Displaying(image) => Some(download::save_result(image)),
            _ => None,
        });
        match saved {
            Some(Ok(())) | None => error.set(None),
            Some(Err(e)) => {
                tracing::warn!(error = %e, "download failed");
                error.set(Some(format!("Download failed: {e}")));
            }
        }
    };

    rsx! {
        div { class: "panel result",
            h2 { class: "panel-title", "Output Image" }
            img {
                class: "result-image",
                src: "{props.image_src}",
                alt: "Composited result",
            }
            div { class: "actions",
                button {
                    class: "btn",
                    onclick: move |_| {
                        session.update(Session::try_again);
                    },
                    "Try Again"
                }
                button {
                    class: "btn btn-secondary",
                    onclick: on_download,
                    "Download PNG"
                }
            }
            if let Some(ref err) = error() {
                p { class: "field-error", "{err}" }
            }
        }
    }
}
