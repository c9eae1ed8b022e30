#![forbid(unsafe_code)]

//! Binder configuration.
//!
//! With the `policy-config` feature a [`BinderConfig`] can be loaded from
//! TOML or JSON:
//!
//! ```toml
//! initial_state = "from_model"
//! notify_unchanged = true
//! ```
//!
//! Missing keys take their defaults.

#[cfg(feature = "policy-config")]
use crate::error::ConfigError;
use crate::initial_state::InitialState;

/// Settings shared by an agent and every nested agent it creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "policy-config", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct BinderConfig {
    /// Policy applied on every direct bind.
    pub initial_state: InitialState,
    /// Write and fire even when the new value equals the old one.
    ///
    /// On by default. Turning it off skips the write, the element update and
    /// the change event for UI edits and [`set_property`] calls that change
    /// nothing.
    ///
    /// [`set_property`]: crate::BindingAgent::set_property
    pub notify_unchanged: bool,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            initial_state: InitialState::default(),
            notify_unchanged: true,
        }
    }
}

impl BinderConfig {
    #[must_use]
    pub fn new(initial_state: InitialState) -> Self {
        Self {
            initial_state,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_initial_state(mut self, initial_state: InitialState) -> Self {
        self.initial_state = initial_state;
        self
    }

    #[must_use]
    pub fn with_notify_unchanged(mut self, notify: bool) -> Self {
        self.notify_unchanged = notify;
        self
    }

    /// Parse a TOML document.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Parse a JSON document.
    #[cfg(feature = "policy-config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }
}
