use std::rc::Rc;

use bgchanger_io::{AppSession, FetchTransport, ImagePicker, ParameterForm, ResultPanel, notify};
use bgchanger_pipeline::{
    ConfigError, ImageSlot, Screen, ServiceConfig, Session, SessionHandle, SubmitOutcome, present,
    submit,
};
use dioxus::prelude::*;

fn main() {
    dioxus::launch(app);
}

/// Service settings baked in by `build.rs`.
fn service_config() -> Result<ServiceConfig, ConfigError> {
    ServiceConfig::from_env_values(
        option_env!("BGCHANGER_API_BASE_URL"),
        option_env!("BGCHANGER_API_TIMEOUT_SECS"),
    )
}

/// Root application component.
///
/// Owns the session and the transport, and switches between the form
/// and the result according to the presenter.
#[allow(clippy::too_many_lines)]
fn app() -> Element {
    // --- Application state ---
    let session = use_hook(AppSession::new);
    let mut generation = use_signal(|| 0u64);
    let transport = use_hook(|| match service_config() {
        Ok(config) => {
            tracing::info!(
                base_url = config.base_url(),
                timeout = ?config.timeout(),
                "compositing service configured"
            );
            Ok(Rc::new(FetchTransport::new(config)))
        }
        Err(e) => {
            tracing::error!(error = %e, "compositing service is not configured");
            Err(e.to_string())
        }
    });

    let screen = session.with(|s| present(s.state()));
    let submit_enabled = screen.submit_enabled();
    let (subject_preview, background_preview) = session.with(|s| {
        let params = s.form().params();
        (
            params.subject_image.as_ref().map(|i| i.preview_url().to_owned()),
            params
                .background_image
                .as_ref()
                .map(|i| i.preview_url().to_owned()),
        )
    });
    let config_error = transport.as_ref().err().cloned();

    // --- Submit handler ---
    // One attempt per click; the session ignores clicks while a request
    // is in flight.
    let on_submit = {
        let transport = transport.clone();
        move |evt: FormEvent| {
            evt.prevent_default();
            let transport = transport.clone();
            async move {
                let transport = match transport {
                    Ok(transport) => transport,
                    Err(message) => {
                        if let Err(e) = notify::alert(&message) {
                            tracing::warn!(error = %e, "could not show alert");
                        }
                        return;
                    }
                };
                match submit(&session, transport.as_ref()).await {
                    SubmitOutcome::Displayed => {}
                    SubmitOutcome::Ignored => tracing::debug!("submit ignored"),
                    SubmitOutcome::Failed(err) => notify::report(&err),
                }
            }
        }
    };

    // --- Reset handler ---
    // Bumping the generation re-keys the pickers so the file inputs are
    // recreated empty.
    let on_reset = move |_| {
        session.update(Session::reset);
        generation += 1;
    };

    let body = match screen {
        Screen::Result { image_src } => rsx! {
            ResultPanel { session, image_src }
        },
        Screen::Form { busy } => rsx! {
            form { class: "panel", onsubmit: on_submit,
                h2 { class: "panel-title", "Bg Changer Tester App" }

                if let Some(ref message) = config_error {
                    div { class: "banner-error", "{message}" }
                }

                for key in [generation()] {
                    div { key: "{key}", class: "pickers",
                        ImagePicker {
                            slot: ImageSlot::Subject,
                            preview: subject_preview.clone(),
                            disabled: busy,
                            on_select: move |image| {
                                session.update(|s| {
                                    s.form_mut().set_image(ImageSlot::Subject, image);
                                });
                            },
                        }
                        ImagePicker {
                            slot: ImageSlot::Background,
                            preview: background_preview.clone(),
                            disabled: busy,
                            on_select: move |image| {
                                session.update(|s| {
                                    s.form_mut().set_image(ImageSlot::Background, image);
                                });
                            },
                        }
                    }
                }

                ParameterForm { session, disabled: busy }

                div { class: "actions",
                    button {
                        r#type: "submit",
                        class: "btn",
                        disabled: !submit_enabled || config_error.is_some(),
                        if busy {
                            span { class: "spinner", role: "status",
                                span { class: "visually-hidden", "Loading..." }
                            }
                        } else {
                            "Submit"
                        }
                    }
                    button {
                        r#type: "button",
                        class: "btn btn-secondary",
                        onclick: on_reset,
                        "Reset"
                    }
                }
            }
        },
    };

    rsx! {
        style { dangerous_inner_html: include_str!("../assets/style.css") }

        main { class: "page", {body} }
    }
}
