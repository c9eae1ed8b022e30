#![forbid(unsafe_code)]

//! Value conversion between model and UI representations.
//!
//! A [`Converter`] is attached per binding. When none is attached the
//! default conversion applies:
//!
//! | Declared type | UI value | Model value |
//! |---------------|----------|-------------|
//! | any | `Null` | `Null` |
//! | `Text` | anything | its text form |
//! | `Int` / `Float` / `Bool` | text | parsed; empty text becomes `Null` |
//! | `Float` | `Int` | widened |
//! | otherwise | same kind | unchanged |
//!
//! Unparsable text becomes `Null` and is logged at `warn` level.
//!
//! Toward the UI, value elements receive the model value unchanged and text
//! elements receive its [`Display`](std::fmt::Display) form.

use std::fmt;
use std::rc::Rc;

use crate::catalog::DeclaredType;
use crate::value::Value;

/// Bidirectional transform between a model value and its UI representation.
pub trait Converter {
    /// Convert a raw UI value into the model's representation.
    fn to_model(&self, ui_value: &Value) -> Value;

    /// Convert a model value into the UI representation.
    ///
    /// For text-only elements the result is rendered with `Display`.
    fn to_ui(&self, model_value: &Value) -> Value;
}

/// Shared converter handle, as stored in a binding.
pub type ConverterRef = Rc<dyn Converter>;

/// A [`Converter`] built from two closures.
pub struct FnConverter<M, U> {
    to_model: M,
    to_ui: U,
}

impl<M, U> FnConverter<M, U>
where
    M: Fn(&Value) -> Value + 'static,
    U: Fn(&Value) -> Value + 'static,
{
    pub fn new(to_model: M, to_ui: U) -> Self {
        Self { to_model, to_ui }
    }

    /// Wrap into a shareable [`ConverterRef`].
    pub fn shared(to_model: M, to_ui: U) -> ConverterRef {
        Rc::new(Self::new(to_model, to_ui))
    }
}

impl<M, U> Converter for FnConverter<M, U>
where
    M: Fn(&Value) -> Value,
    U: Fn(&Value) -> Value,
{
    fn to_model(&self, ui_value: &Value) -> Value {
        (self.to_model)(ui_value)
    }

    fn to_ui(&self, model_value: &Value) -> Value {
        (self.to_ui)(model_value)
    }
}

impl<M, U> fmt::Debug for FnConverter<M, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnConverter").finish()
    }
}

/// Whether two converter handles are the same converter.
#[must_use]
pub fn same_converter(a: &ConverterRef, b: &ConverterRef) -> bool {
    Rc::ptr_eq(a, b)
}

/// Convert a UI value into a value for a property of `declared` type.
pub fn to_model_value(
    declared: DeclaredType,
    ui_value: Value,
    converter: Option<&dyn Converter>,
) -> Value {
    if let Some(converter) = converter {
        return converter.to_model(&ui_value);
    }
    match (declared, ui_value) {
        (_, Value::Null) => Value::Null,
        (DeclaredType::Text, Value::Text(s)) => Value::Text(s),
        (DeclaredType::Text, other) => Value::Text(other.to_string()),
        (DeclaredType::Int, Value::Text(s)) => parse_text(declared, &s, |t| {
            t.parse::<i64>().ok().map(Value::Int)
        }),
        (DeclaredType::Float, Value::Text(s)) => parse_text(declared, &s, |t| {
            t.parse::<f64>().ok().map(Value::Float)
        }),
        (DeclaredType::Float, Value::Int(i)) => Value::Float(i as f64),
        (DeclaredType::Bool, Value::Text(s)) => parse_text(declared, &s, parse_bool),
        (_, other) => other,
    }
}

/// Convert a model value into the value pushed to a value element.
pub fn to_ui_value(model_value: &Value, converter: Option<&dyn Converter>) -> Value {
    match converter {
        Some(converter) => converter.to_ui(model_value),
        None => model_value.clone(),
    }
}

/// Convert a model value into the text pushed to a text element.
pub fn to_ui_text(model_value: &Value, converter: Option<&dyn Converter>) -> String {
    match to_ui_value(model_value, converter) {
        Value::Text(s) => s,
        other => other.to_string(),
    }
}

fn parse_text(declared: DeclaredType, raw: &str, parse: impl Fn(&str) -> Option<Value>) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    parse(trimmed).unwrap_or_else(|| {
        tracing::warn!(%declared, input = raw, "cannot convert UI text to model value");
        Value::Null
    })
}

fn parse_bool(text: &str) -> Option<Value> {
    if text.eq_ignore_ascii_case("true") {
        Some(Value::Bool(true))
    } else if text.eq_ignore_ascii_case("false") {
        Some(Value::Bool(false))
    } else {
        None
    }
}
