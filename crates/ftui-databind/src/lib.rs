#![forbid(unsafe_code)]

//! Two-way data binding between models and UI elements for FrankenTUI.
//!
//! This crate provides:
//! - [`DataBinder`] and [`BindingAgent`] for binding element capabilities to
//!   model properties, including property chains such as `address.street`
//! - [`PropertyAccessor`] and [`ModelType`], the by-name model contract
//! - [`PropertyCatalog`], the cached per-type property list
//! - [`Converter`] for per-binding value conversion
//! - [`PropertyChangeRegistry`] for global and per-property change handlers
//! - [`BinderConfig`] and [`InitialState`] for sync policy
//!
//! Everything here is single-threaded (`Rc` handles); only the catalog
//! registry is process-wide and thread-safe.

pub mod agent;
pub mod binder;
pub mod catalog;
pub mod config;
pub mod convert;
pub mod element;
pub mod error;
pub mod event;
pub mod initial_state;
pub mod model;
pub mod table;
pub mod value;

#[cfg(test)]
mod testing;

pub use agent::{BindingAgent, PATH_SEPARATOR};
pub use binder::DataBinder;
pub use catalog::{DeclaredType, PropertyCatalog, PropertyType, catalog_for};
pub use config::BinderConfig;
pub use convert::{Converter, ConverterRef, FnConverter};
pub use element::{
    ChangeCallback, ChangeListeners, Element, ElementRef, Subscription, TextHolder, ValueHolder,
    same_element,
};
#[cfg(feature = "policy-config")]
pub use error::ConfigError;
pub use error::BindingError;
pub use event::{ChangeHandler, HandlerId, PropertyChangeEvent, PropertyChangeRegistry};
pub use initial_state::InitialState;
pub use model::{ModelRef, ModelType, PropertyAccessor, new_model, same_model};
pub use table::{Binding, BindingTable};
pub use value::Value;
