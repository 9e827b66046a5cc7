//! Form state: the parameters and image handles a submission is built from.
//!
//! [`FormStore`] is the single writer of [`FormParameters`]. Widget input
//! arrives as raw strings tagged with a [`WidgetKind`] and is coerced at
//! ingestion, so numeric fields only ever hold numbers.

use std::fmt;
use std::str::FromStr;

use crate::types::{HorizontalShift, ImageSlot};

/// A scalar form field, named by its wire key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Free-form attire prompt.
    Prompt,
    /// Fraction of the frame top kept clear of the subject.
    IdolSafeZoneTop,
    /// Lower bound of the subject group scale.
    MinGroupScale,
    /// Upper bound of the subject group scale.
    MaxGroupScale,
    /// Scale applied to the user within the group.
    UserScale,
    /// Three-way horizontal placement.
    HorizontalShift,
    /// Blend strength between subject and scene colors.
    ColorBalance,
}

impl Field {
    /// All fields, in form order.
    pub const ALL: [Self; 7] = [
        Self::Prompt,
        Self::IdolSafeZoneTop,
        Self::MinGroupScale,
        Self::MaxGroupScale,
        Self::UserScale,
        Self::HorizontalShift,
        Self::ColorBalance,
    ];

    /// JSON key and form input name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Prompt => "prompt",
            Self::IdolSafeZoneTop => "idol_safe_zone_top",
            Self::MinGroupScale => "min_group_scale",
            Self::MaxGroupScale => "max_group_scale",
            Self::UserScale => "user_scale",
            Self::HorizontalShift => "horizontal_shift",
            Self::ColorBalance => "color_balance",
        }
    }

    /// Human-readable label including the intended range.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Prompt => "Attire Prompt",
            Self::IdolSafeZoneTop => "Idol Safe Zone Top (0.3-0.7)",
            Self::MinGroupScale => "Min Group Scale (0.4-1.0)",
            Self::MaxGroupScale => "Max Group Scale (0.7-1.0)",
            Self::UserScale => "User Scale (0.5-1.0)",
            Self::HorizontalShift => "Horizontal Shift (-1, 0, 1)",
            Self::ColorBalance => "Color Balance (0.3-1.0)",
        }
    }

    /// Documented range for continuous numeric fields.
    ///
    /// These bounds are advisory: values outside them are still stored
    /// and transmitted.
    #[must_use]
    pub const fn intended_range(self) -> Option<(f64, f64)> {
        match self {
            Self::IdolSafeZoneTop => Some((0.3, 0.7)),
            Self::MinGroupScale => Some((0.4, 1.0)),
            Self::MaxGroupScale => Some((0.7, 1.0)),
            Self::UserScale => Some((0.5, 1.0)),
            Self::ColorBalance => Some((0.3, 1.0)),
            Self::Prompt | Self::HorizontalShift => None,
        }
    }

    /// Whether the field stores a number.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        !matches!(self, Self::Prompt)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| FormError::UnknownField(s.to_owned()))
    }
}

/// The kind of input widget a raw value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    /// Free text entry.
    Text,
    /// Numeric entry field.
    Number,
    /// Slider.
    Range,
    /// Single-choice select whose options are numbers.
    SelectOne,
}

impl WidgetKind {
    /// Classify an HTML input `type` (or `select-one` for a `<select>`).
    ///
    /// Anything that is not a numeric kind is treated as text.
    #[must_use]
    pub fn from_input_type(kind: &str) -> Self {
        match kind {
            "number" => Self::Number,
            "range" => Self::Range,
            "select-one" => Self::SelectOne,
            _ => Self::Text,
        }
    }

    /// Whether values from this widget are parsed to numbers.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Number | Self::Range | Self::SelectOne)
    }
}

/// A widget value after ingestion coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Parsed, finite number.
    Number(f64),
    /// Text stored as entered.
    Text(String),
}

impl FieldValue {
    /// Coerce a raw widget value for `field`.
    ///
    /// Numeric widgets always yield [`FieldValue::Number`]; text widgets
    /// yield [`FieldValue::Text`].
    ///
    /// # Errors
    ///
    /// Returns [`FormError::InvalidNumber`] if a numeric widget produced
    /// something that is not a finite number.
    pub fn coerce(field: Field, raw: &str, kind: WidgetKind) -> Result<Self, FormError> {
        if kind.is_numeric() {
            parse_number(field, raw).map(Self::Number)
        } else {
            Ok(Self::Text(raw.to_owned()))
        }
    }
}

fn parse_number(field: Field, raw: &str) -> Result<f64, FormError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| FormError::InvalidNumber {
            field,
            raw: raw.to_owned(),
        })
}

/// Rejected form input. The form is never modified by a failing call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormError {
    /// No field has this name.
    #[error("unknown form field: {0:?}")]
    UnknownField(String),

    /// A numeric field received something that is not a finite number.
    #[error("{field} expects a number, got {raw:?}")]
    InvalidNumber {
        /// Target field.
        field: Field,
        /// The value as entered.
        raw: String,
    },

    /// Horizontal shift outside {-1, 0, 1}.
    #[error("horizontal_shift must be -1, 0 or 1, got {0}")]
    InvalidShift(f64),

    /// A number was aimed at a text field.
    #[error("{field} expects text")]
    TypeMismatch {
        /// Target field.
        field: Field,
    },
}

/// Parameters and image handles for one session.
#[derive(Debug, Clone, PartialEq)]
pub struct FormParameters<S> {
    /// Photo of the user to composite.
    pub subject_image: Option<S>,
    /// Scene to composite onto.
    pub background_image: Option<S>,
    /// Attire prompt.
    pub prompt: String,
    /// Fraction of the frame top kept clear.
    pub idol_safe_zone_top: f64,
    /// Minimum group scale.
    pub min_group_scale: f64,
    /// Maximum group scale.
    pub max_group_scale: f64,
    /// User scale.
    pub user_scale: f64,
    /// Horizontal placement.
    pub horizontal_shift: HorizontalShift,
    /// Color balance.
    pub color_balance: f64,
}

impl<S> FormParameters<S> {
    /// Default attire prompt.
    pub const DEFAULT_PROMPT: &str = "The attire is a Bengali attire";
    /// Default safe zone top.
    pub const DEFAULT_IDOL_SAFE_ZONE_TOP: f64 = 0.3;
    /// Default minimum group scale.
    pub const DEFAULT_MIN_GROUP_SCALE: f64 = 0.4;
    /// Default maximum group scale.
    pub const DEFAULT_MAX_GROUP_SCALE: f64 = 0.7;
    /// Default user scale.
    pub const DEFAULT_USER_SCALE: f64 = 0.5;
    /// Default color balance.
    pub const DEFAULT_COLOR_BALANCE: f64 = 0.3;

    /// The handle in `slot`, if one is selected.
    #[must_use]
    pub const fn image(&self, slot: ImageSlot) -> Option<&S> {
        match slot {
            ImageSlot::Subject => self.subject_image.as_ref(),
            ImageSlot::Background => self.background_image.as_ref(),
        }
    }

    /// Slots that have no image selected, in form order.
    #[must_use]
    pub fn missing_images(&self) -> Vec<ImageSlot> {
        ImageSlot::ALL
            .into_iter()
            .filter(|slot| self.image(*slot).is_none())
            .collect()
    }

    /// Current value of a numeric field. `None` for the prompt.
    #[must_use]
    pub fn number(&self, field: Field) -> Option<f64> {
        match field {
            Field::Prompt => None,
            Field::IdolSafeZoneTop => Some(self.idol_safe_zone_top),
            Field::MinGroupScale => Some(self.min_group_scale),
            Field::MaxGroupScale => Some(self.max_group_scale),
            Field::UserScale => Some(self.user_scale),
            Field::HorizontalShift => Some(f64::from(self.horizontal_shift.offset())),
            Field::ColorBalance => Some(self.color_balance),
        }
    }

    /// Numeric fields whose value lies outside [`Field::intended_range`].
    #[must_use]
    pub fn out_of_range_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|field| {
                match (field.intended_range(), self.number(*field)) {
                    (Some((lo, hi)), Some(v)) => v < lo || v > hi,
                    _ => false,
                }
            })
            .collect()
    }

    fn slot_mut(&mut self, slot: ImageSlot) -> &mut Option<S> {
        match slot {
            ImageSlot::Subject => &mut self.subject_image,
            ImageSlot::Background => &mut self.background_image,
        }
    }
}

impl<S> Default for FormParameters<S> {
    fn default() -> Self {
        Self {
            subject_image: None,
            background_image: None,
            prompt: Self::DEFAULT_PROMPT.to_owned(),
            idol_safe_zone_top: Self::DEFAULT_IDOL_SAFE_ZONE_TOP,
            min_group_scale: Self::DEFAULT_MIN_GROUP_SCALE,
            max_group_scale: Self::DEFAULT_MAX_GROUP_SCALE,
            user_scale: Self::DEFAULT_USER_SCALE,
            horizontal_shift: HorizontalShift::default(),
            color_balance: Self::DEFAULT_COLOR_BALANCE,
        }
    }
}

/// Single writer of the session's [`FormParameters`].
#[derive(Debug, Clone)]
pub struct FormStore<S> {
    params: FormParameters<S>,
}

impl<S> FormStore<S> {
    /// A store holding `params`.
    #[must_use]
    pub const fn new(params: FormParameters<S>) -> Self {
        Self { params }
    }

    /// Current parameters.
    #[must_use]
    pub const fn params(&self) -> &FormParameters<S> {
        &self.params
    }

    /// Replace the image in `slot`.
    ///
    /// The previous handle, if any, is dropped here, which releases any
    /// resources it holds (such as a preview URL).
    pub fn set_image(&mut self, slot: ImageSlot, image: S) {
        *self.params.slot_mut(slot) = Some(image);
    }

    /// Ingest a raw widget value into the field called `name`.
    ///
    /// # Errors
    ///
    /// Returns a [`FormError`] for unknown names, unparseable numbers,
    /// invalid shifts and numbers aimed at the prompt. The form is left
    /// untouched on error.
    pub fn set_field(&mut self, name: &str, raw: &str, kind: WidgetKind) -> Result<(), FormError> {
        let field: Field = name.parse()?;
        let value = FieldValue::coerce(field, raw, kind)?;
        self.apply(field, value)
    }

    /// Store an already-coerced value.
    ///
    /// Text aimed at a numeric field is parsed and non-finite numbers are
    /// rejected, so the numeric invariant holds regardless of where the
    /// value came from.
    ///
    /// # Errors
    ///
    /// See [`FormStore::set_field`].
    pub fn apply(&mut self, field: Field, value: FieldValue) -> Result<(), FormError> {
        match (field, value) {
            (Field::Prompt, FieldValue::Text(text)) => {
                self.params.prompt = text;
                Ok(())
            }
            (Field::Prompt, FieldValue::Number(_)) => Err(FormError::TypeMismatch { field }),
            (_, FieldValue::Number(n)) => self.store_number(field, n),
            (_, FieldValue::Text(text)) => {
                let n = parse_number(field, &text)?;
                self.store_number(field, n)
            }
        }
    }

    fn store_number(&mut self, field: Field, number: f64) -> Result<(), FormError> {
        if !number.is_finite() {
            return Err(FormError::InvalidNumber {
                field,
                raw: number.to_string(),
            });
        }
        let p = &mut self.params;
        let slot = match field {
            Field::Prompt => return Err(FormError::TypeMismatch { field }),
            Field::HorizontalShift => {
                p.horizontal_shift =
                    HorizontalShift::from_number(number).ok_or(FormError::InvalidShift(number))?;
                return Ok(());
            }
            Field::IdolSafeZoneTop => &mut p.idol_safe_zone_top,
            Field::MinGroupScale => &mut p.min_group_scale,
            Field::MaxGroupScale => &mut p.max_group_scale,
            Field::UserScale => &mut p.user_scale,
            Field::ColorBalance => &mut p.color_balance,
        };
        *slot = number;
        Ok(())
    }

    /// Restore every field to its default and clear both image slots.
    pub fn reset(&mut self) {
        self.params = FormParameters::default();
    }
}

impl<S: Clone> FormStore<S> {
    /// Immutable copy of the current parameters.
    #[must_use]
    pub fn snapshot(&self) -> FormParameters<S> {
        self.params.clone()
    }
}

impl<S> Default for FormStore<S> {
    fn default() -> Self {
        Self::new(FormParameters::default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    type Store = FormStore<&'static str>;

    /// Counts how many handles have been dropped.
    #[derive(Debug, Clone)]
    struct Tracked(Rc<Cell<usize>>);

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn defaults_match_documented_values() {
        let p = FormParameters::<()>::default();
        assert!(p.subject_image.is_none());
        assert!(p.background_image.is_none());
        assert_eq!(p.prompt, "The attire is a Bengali attire");
        assert_eq!(p.idol_safe_zone_top, 0.3);
        assert_eq!(p.min_group_scale, 0.4);
        assert_eq!(p.max_group_scale, 0.7);
        assert_eq!(p.user_scale, 0.5);
        assert_eq!(p.horizontal_shift, HorizontalShift::Center);
        assert_eq!(p.color_balance, 0.3);
    }

    #[test]
    fn field_names_parse_back() {
        for field in Field::ALL {
            assert_eq!(field.name().parse::<Field>().unwrap(), field);
        }
    }

    #[test]
    fn widget_kind_from_input_type() {
        assert_eq!(WidgetKind::from_input_type("number"), WidgetKind::Number);
        assert_eq!(WidgetKind::from_input_type("range"), WidgetKind::Range);
        assert_eq!(WidgetKind::from_input_type("select-one"), WidgetKind::SelectOne);
        assert_eq!(WidgetKind::from_input_type("text"), WidgetKind::Text);
        assert_eq!(WidgetKind::from_input_type("textarea"), WidgetKind::Text);
    }

    #[test]
    fn numeric_widget_stores_number() {
        let mut store = Store::default();
        store
            .set_field("color_balance", " 0.85 ", WidgetKind::Range)
            .unwrap();
        assert_eq!(store.params().color_balance, 0.85);
    }

    #[test]
    fn select_widget_stores_shift_as_number() {
        let mut store = Store::default();
        store
            .set_field("horizontal_shift", "1", WidgetKind::SelectOne)
            .unwrap();
        assert_eq!(store.params().horizontal_shift, HorizontalShift::Right);
        store
            .set_field("horizontal_shift", "-1", WidgetKind::SelectOne)
            .unwrap();
        assert_eq!(store.params().horizontal_shift, HorizontalShift::Left);
    }

    #[test]
    fn text_widget_on_numeric_field_still_stores_number() {
        let mut store = Store::default();
        store.set_field("user_scale", "0.9", WidgetKind::Text).unwrap();
        assert_eq!(store.params().user_scale, 0.9);
    }

    #[test]
    fn prompt_stores_text() {
        let mut store = Store::default();
        store
            .set_field("prompt", "A navy suit", WidgetKind::Text)
            .unwrap();
        assert_eq!(store.params().prompt, "A navy suit");
    }

    #[test]
    fn unknown_field_is_rejected_without_change() {
        let mut store = Store::default();
        let before = store.snapshot();
        let err = store
            .set_field("feather_px", "9", WidgetKind::Number)
            .unwrap_err();
        assert_eq!(err, FormError::UnknownField("feather_px".into()));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn garbage_number_is_rejected_without_change() {
        let mut store = Store::default();
        for raw in ["", "abc", "NaN", "inf"] {
            let err = store
                .set_field("min_group_scale", raw, WidgetKind::Number)
                .unwrap_err();
            assert!(matches!(err, FormError::InvalidNumber { field: Field::MinGroupScale, .. }));
        }
        assert_eq!(store.params().min_group_scale, 0.4);
    }

    #[test]
    fn non_finite_coerced_number_is_rejected_without_change() {
        let mut store = Store::default();
        let before = store.snapshot();
        for n in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = store
                .apply(Field::UserScale, FieldValue::Number(n))
                .unwrap_err();
            assert!(matches!(err, FormError::InvalidNumber { field: Field::UserScale, .. }));
        }
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn invalid_shift_is_rejected() {
        let mut store = Store::default();
        let err = store
            .set_field("horizontal_shift", "2", WidgetKind::SelectOne)
            .unwrap_err();
        assert_eq!(err, FormError::InvalidShift(2.0));
        assert_eq!(store.params().horizontal_shift, HorizontalShift::Center);
    }

    #[test]
    fn number_aimed_at_prompt_is_rejected() {
        let mut store = Store::default();
        let err = store
            .set_field("prompt", "3", WidgetKind::Number)
            .unwrap_err();
        assert_eq!(err, FormError::TypeMismatch { field: Field::Prompt });
        assert_eq!(store.params().prompt, FormParameters::<()>::DEFAULT_PROMPT);
    }

    #[test]
    fn out_of_range_values_are_kept_and_reported() {
        let mut store = Store::default();
        store
            .set_field("color_balance", "1.5", WidgetKind::Number)
            .unwrap();
        store
            .set_field("idol_safe_zone_top", "0.1", WidgetKind::Number)
            .unwrap();
        assert_eq!(store.params().color_balance, 1.5);
        assert_eq!(
            store.params().out_of_range_fields(),
            vec![Field::IdolSafeZoneTop, Field::ColorBalance]
        );
    }

    #[test]
    fn defaults_are_in_range() {
        assert!(FormParameters::<()>::default().out_of_range_fields().is_empty());
    }

    #[test]
    fn reset_restores_defaults_from_any_state() {
        let mut store = Store::default();
        store.set_image(ImageSlot::Subject, "me.png");
        store.set_image(ImageSlot::Background, "beach.jpg");
        store.set_field("prompt", "x", WidgetKind::Text).unwrap();
        store.set_field("user_scale", "0.99", WidgetKind::Range).unwrap();
        store
            .set_field("horizontal_shift", "-1", WidgetKind::SelectOne)
            .unwrap();

        store.reset();

        assert_eq!(store.snapshot(), FormParameters::default());
        assert_eq!(
            store.params().missing_images(),
            vec![ImageSlot::Subject, ImageSlot::Background]
        );
    }

    #[test]
    fn replacing_or_resetting_releases_previous_handle() {
        let dropped = Rc::new(Cell::new(0));
        let mut store = FormStore::<Tracked>::default();

        store.set_image(ImageSlot::Subject, Tracked(Rc::clone(&dropped)));
        assert_eq!(dropped.get(), 0);

        store.set_image(ImageSlot::Subject, Tracked(Rc::clone(&dropped)));
        assert_eq!(dropped.get(), 1, "replaced handle should be released");

        store.set_image(ImageSlot::Background, Tracked(Rc::clone(&dropped)));
        store.reset();
        assert_eq!(dropped.get(), 3, "reset should release both handles");
    }

    #[test]
    fn missing_images_reports_empty_slots() {
        let mut store = Store::default();
        store.set_image(ImageSlot::Subject, "me.png");
        assert_eq!(store.params().missing_images(), vec![ImageSlot::Background]);
    }
}
