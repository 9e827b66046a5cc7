//! Parameter inputs bound to the session's form store.
//!
//! Every input writes straight through [`FormStore::set_field`] tagged
//! with its own widget kind, so coercion happens once, at ingestion.
//!
//! [`FormStore::set_field`]: bgchanger_pipeline::FormStore::set_field

use bgchanger_pipeline::{Field, HorizontalShift, SessionHandle, WidgetKind};
use dioxus::prelude::*;

use crate::session::AppSession;

/// Step for the continuous numeric inputs.
const NUMBER_STEP: f64 = 0.01;

/// Props for the [`ParameterForm`] component.
#[derive(Props, Clone, PartialEq)]
pub struct ParameterFormProps {
    /// The session whose form is edited.
    session: AppSession,
    /// Disable every input while a submission is in flight.
    disabled: bool,
}

/// Text, select and number inputs for the seven scalar fields.
///
/// Values outside a field's intended range are accepted and marked with
/// a hint. Input that cannot be coerced is rejected with a message and
/// leaves the stored value unchanged.
#[component]
pub fn ParameterForm(props: ParameterFormProps) -> Element {
    let session = props.session;
    let disabled = props.disabled;
    let error = use_signal(|| Option::<String>::None);

    let (prompt, shift, values, out_of_range) = session.with(|s| {
        let params = s.form().params();
        let values: Vec<(Field, f64)> = Field::ALL
            .into_iter()
            .filter_map(|field| params.number(field).map(|v| (field, v)))
            .collect();
        (
            params.prompt.clone(),
            params.horizontal_shift,
            values,
            params.out_of_range_fields(),
        )
    });

    let apply = move |field: Field, raw: String, input_type: &'static str| {
        let mut error = error;
        let kind = WidgetKind::from_input_type(input_type);
        match session.update(|s| s.form_mut().set_field(field.name(), &raw, kind)) {
            Ok(()) => error.set(None),
            Err(e) => {
                tracing::warn!(%field, error = %e, "rejected form input");
                error.set(Some(e.to_string()));
            }
        }
    };

    rsx! {
        div { class: "parameters",
            for field in Field::ALL {
                div { key: "{field}",
                    {match field {
                        Field::Prompt => render_text(
                            field,
                            &prompt,
                            disabled,
                            move |raw| apply(field, raw, "text"),
                        ),
                        Field::HorizontalShift => render_shift_select(
                            field,
                            shift,
                            disabled,
                            move |raw| apply(field, raw, "select-one"),
                        ),
                        _ => render_number(
                            field,
                            values.iter().find(|(f, _)| *f == field).map_or(0.0, |(_, v)| *v),
                            out_of_range.contains(&field),
                            disabled,
                            move |raw| apply(field, raw, "number"),
                        ),
                    }}
                }
            }
            if let Some(ref err) = error() {
                p { class: "field-error", "{err}" }
            }
        }
    }
}

fn render_text(
    field: Field,
    value: &str,
    disabled: bool,
    on_input: impl Fn(String) + 'static,
) -> Element {
    let id = field.name();
    let label = field.label();
    let value = value.to_owned();

    rsx! {
        div { class: "field",
            label { r#for: "{id}", class: "field-label", "{label}" }
            input {
                r#type: "text",
                id: "{id}",
                name: "{id}",
                value: "{value}",
                disabled,
                oninput: move |e| on_input(e.value()),
            }
        }
    }
}

fn render_shift_select(
    field: Field,
    current: HorizontalShift,
    disabled: bool,
    on_change: impl Fn(String) + 'static,
) -> Element {
    let id = field.name();
    let label = field.label();

    rsx! {
        div { class: "field",
            label { r#for: "{id}", class: "field-label", "{label}" }
            select {
                id: "{id}",
                name: "{id}",
                disabled,
                onchange: move |e| on_change(e.value()),
                for shift in HorizontalShift::ALL {
                    option {
                        key: "{shift.offset()}",
                        value: "{shift.offset()}",
                        selected: shift == current,
                        {shift_label(shift)}
                    }
                }
            }
        }
    }
}

/// Render a numeric input with an advisory range hint.
fn render_number(
    field: Field,
    value: f64,
    out_of_range: bool,
    disabled: bool,
    on_input: impl Fn(String) + 'static,
) -> Element {
    let id = field.name();
    let label = field.label();
    let hint = field
        .intended_range()
        .filter(|_| out_of_range)
        .map(|(lo, hi)| format!("Outside the intended range {lo}-{hi}; it will still be sent."));

    rsx! {
        div { class: "field",
            label { r#for: "{id}", class: "field-label", "{label}" }
            input {
                r#type: "number",
                id: "{id}",
                name: "{id}",
                step: "{NUMBER_STEP}",
                value: "{value}",
                disabled,
                oninput: move |e| on_input(e.value()),
            }
            if let Some(hint) = hint {
                p { class: "field-hint", "{hint}" }
            }
        }
    }
}

const fn shift_label(shift: HorizontalShift) -> &'static str {
    match shift {
        HorizontalShift::Left => "Left (-1)",
        HorizontalShift::Center => "Center (0)",
        HorizontalShift::Right => "Right (1)",
    }
}
