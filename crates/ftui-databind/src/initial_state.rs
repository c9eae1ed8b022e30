#![forbid(unsafe_code)]

//! Which side wins when a binding is first established.

use crate::value::Value;

/// Initial-state policy applied on every direct bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "policy-config", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "policy-config", serde(rename_all = "snake_case"))]
pub enum InitialState {
    /// No synchronization; model and element keep their values.
    #[default]
    None,
    /// The model value is pushed to the element.
    FromModel,
    /// The element value is written into the model.
    FromUi,
}

impl InitialState {
    /// Whether binding triggers a synchronization at all.
    #[must_use]
    pub const fn syncs(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Pick the value that wins under this policy.
    ///
    /// `ui_value` is `None` for elements that expose neither a value nor a
    /// text; the model value wins in that case.
    #[must_use]
    pub fn initial_value(self, model_value: Value, ui_value: Option<Value>) -> Value {
        match (self, ui_value) {
            (Self::FromUi, Some(ui)) => ui,
            _ => model_value,
        }
    }
}
