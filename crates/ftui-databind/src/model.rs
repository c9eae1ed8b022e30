#![forbid(unsafe_code)]

//! The property accessor contract implemented by bindable models.
//!
//! The binding engine never inspects a model's fields. It reads and writes
//! properties by name through [`PropertyAccessor`], and learns which
//! properties exist from the model's [`ModelType`] descriptor. How a model
//! implements the accessor (hand-written `match`, a generated table, a
//! map-backed record) is up to the model.
//!
//! # Example
//!
//! ```
//! use ftui_databind::{DeclaredType, ModelRef, ModelType, PropertyAccessor, PropertyType, Value, new_model};
//!
//! #[derive(Default)]
//! struct Counter {
//!     count: i64,
//! }
//!
//! static COUNTER: ModelType = ModelType {
//!     name: "Counter",
//!     properties: counter_properties,
//!     create: new_counter,
//! };
//!
//! fn counter_properties() -> Vec<PropertyType> {
//!     vec![PropertyType::new("count", DeclaredType::Int)]
//! }
//!
//! fn new_counter() -> ModelRef {
//!     new_model(Counter::default())
//! }
//!
//! impl PropertyAccessor for Counter {
//!     fn model_type(&self) -> &'static ModelType {
//!         &COUNTER
//!     }
//!
//!     fn get(&self, property: &str) -> Value {
//!         match property {
//!             "count" => Value::Int(self.count),
//!             _ => Value::Null,
//!         }
//!     }
//!
//!     fn set(&mut self, property: &str, value: Value) {
//!         if property == "count" {
//!             self.count = value.as_int().unwrap_or_default();
//!         }
//!     }
//! }
//!
//! let model = new_counter();
//! model.borrow_mut().set("count", Value::Int(3));
//! assert_eq!(model.borrow().get("count"), Value::Int(3));
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::catalog::{PropertyCatalog, PropertyType};
use crate::value::Value;

/// Shared handle to a live model.
pub type ModelRef = Rc<RefCell<dyn PropertyAccessor>>;

/// Read/write access to a model's properties by name.
///
/// Writes must be visible to the next `get` immediately. Only top-level
/// property names are passed in; the binding engine resolves property
/// chains itself.
pub trait PropertyAccessor {
    /// Static descriptor of this model's type.
    fn model_type(&self) -> &'static ModelType;

    /// Current value of `property`, or [`Value::Null`] if unknown or unset.
    fn get(&self, property: &str) -> Value;

    /// Write `value` into `property`. Unknown properties are ignored.
    fn set(&mut self, property: &str, value: Value);
}

/// Static description of a bindable model type.
///
/// Declared once per type, usually as a `static`. The property list is
/// computed lazily and cached process-wide (see [`ModelType::catalog`]).
pub struct ModelType {
    /// Type name, unique per process.
    pub name: &'static str,
    /// Produces the declared properties of the type.
    pub properties: fn() -> Vec<PropertyType>,
    /// Produces a fresh default instance.
    pub create: fn() -> ModelRef,
}

impl ModelType {
    /// The shared, immutable property catalog for this type.
    #[must_use]
    pub fn catalog(&'static self) -> std::sync::Arc<PropertyCatalog> {
        crate::catalog::catalog_for(self)
    }

    /// Create a fresh default instance.
    #[must_use]
    pub fn instantiate(&self) -> ModelRef {
        (self.create)()
    }
}

impl PartialEq for ModelType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ModelType {}

impl fmt::Debug for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelType").field("name", &self.name).finish()
    }
}

/// Wrap a model into a shared [`ModelRef`].
pub fn new_model<M: PropertyAccessor + 'static>(model: M) -> ModelRef {
    Rc::new(RefCell::new(model))
}

/// Whether two handles point at the same model.
#[must_use]
pub fn same_model(a: &ModelRef, b: &ModelRef) -> bool {
    Rc::ptr_eq(a, b)
}
