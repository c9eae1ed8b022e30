#![forbid(unsafe_code)]

//! Error types for binding and configuration.
//!
//! Every [`BindingError`] is a structural mistake made by the caller (a bad
//! path, a property the model does not have, an element bound twice). They
//! are reported synchronously from `bind`/`unbind` and are never retried.

use thiserror::Error;

/// Errors raised while binding or unbinding properties.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    /// The property path is empty or has an empty segment.
    #[error(
        "binding expression (property chain) cannot be empty, start or end with '.', or contain an empty segment: {path:?}"
    )]
    InvalidPath { path: String },

    /// The property (or the root of a property chain) is not part of the model.
    #[error("property '{property}' does not exist on model type {model}")]
    UnknownProperty {
        model: &'static str,
        property: String,
    },

    /// The root of a property chain exists but its type is not bindable.
    #[error("the type of property '{property}' ({declared}) is not a bindable type")]
    NotBindable {
        property: String,
        declared: String,
    },

    /// The element is already bound to a property of this agent.
    #[error("element already bound to property: {property}")]
    DuplicateBinding { property: String },
}

/// Errors raised while loading a [`BinderConfig`](crate::BinderConfig).
#[cfg(feature = "policy-config")]
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid TOML binder config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON binder config: {0}")]
    Json(#[from] serde_json::Error),
}
