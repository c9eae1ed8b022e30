#![forbid(unsafe_code)]

//! The binding agent: keeps one model and its bound elements in sync.
//!
//! A [`BindingAgent`] is paired with exactly one model. It owns
//!
//! - the [`BindingTable`] of property-to-element bindings,
//! - nested [`DataBinder`]s for property chains (`address.street`),
//! - a snapshot of the last observed value of every cataloged property,
//! - a shared [`PropertyChangeRegistry`].
//!
//! # Propagation
//!
//! - **UI to model**: a value element reports an edit, the agent converts it,
//!   writes the model, updates the snapshot and fires a change event. The
//!   originating element is not written back.
//! - **Model to UI, direct**: writes made through [`BindingAgent::set_property`]
//!   update the bound element and fire immediately.
//! - **Model to UI, dirty check**: [`BindingAgent::reconcile`] compares every
//!   cataloged property against the snapshot and propagates the differences.
//!   Call it after mutating the model behind the agent's back.
//!
//! # Invariants
//!
//! 1. An element appears in at most one binding of an agent.
//! 2. A property has at most one binding; rebinding replaces it.
//! 3. The snapshot is updated before change handlers run, so `reconcile`
//!    right after any propagated change reports nothing.
//! 4. No `RefCell` borrow is held while calling into elements, converters,
//!    models or handlers; handlers may bind, unbind or reconcile the agent
//!    they are observing.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Bad path | empty, or an empty segment (`.a`, `a.`, `a..b`) | `BindingError::InvalidPath` |
//! | Unknown property | not in the catalog | `BindingError::UnknownProperty` |
//! | Chain through plain value | root not a nested model | `BindingError::NotBindable` |
//! | Element bound twice | same element, same agent | `BindingError::DuplicateBinding` |
//! | Agent used after `copy_from` | stale handle | Ignored, warning logged |
//!
//! # Example
//!
//! ```ignore
//! let binder = DataBinder::for_model(person, InitialState::FromModel);
//! let agent = binder.agent();
//! agent.bind(name_input.clone(), "name", None)?;
//! agent.bind(street_label.clone(), "address.street", None)?;
//!
//! agent.add_property_change_handler("name", |e| println!("{:?} -> {:?}", e.old_value, e.new_value));
//!
//! person.borrow_mut().rename_everyone();
//! agent.reconcile();
//! ```

mod nested;
mod propagate;
mod sync;

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use ahash::AHashMap;

use crate::binder::DataBinder;
use crate::catalog::{PropertyCatalog, PropertyType};
use crate::config::BinderConfig;
use crate::convert::ConverterRef;
use crate::element::ElementRef;
use crate::error::BindingError;
use crate::event::{HandlerId, PropertyChangeEvent, PropertyChangeRegistry};
use crate::initial_state::InitialState;
use crate::model::ModelRef;
use crate::table::{Binding, BindingTable};
use crate::value::Value;

/// Separator between the segments of a property chain.
pub const PATH_SEPARATOR: char = '.';

/// Handle to a binding agent. Clones share the same agent.
#[derive(Clone)]
pub struct BindingAgent {
    state: Rc<AgentState>,
}

struct AgentState {
    model: ModelRef,
    catalog: Arc<PropertyCatalog>,
    config: BinderConfig,
    table: RefCell<BindingTable>,
    nested: RefCell<BTreeMap<String, DataBinder>>,
    known: RefCell<AHashMap<String, Value>>,
    handlers: RefCell<Rc<PropertyChangeRegistry>>,
    retired: Cell<bool>,
}

impl BindingAgent {
    /// Create an agent for `model` and snapshot its current property values.
    #[must_use]
    pub fn new(model: ModelRef, config: BinderConfig) -> Self {
        let catalog = model.borrow().model_type().catalog();
        let agent = Self {
            state: Rc::new(AgentState {
                model,
                catalog,
                config,
                table: RefCell::new(BindingTable::new()),
                nested: RefCell::new(BTreeMap::new()),
                known: RefCell::new(AHashMap::new()),
                handlers: RefCell::new(Rc::new(PropertyChangeRegistry::new())),
                retired: Cell::new(false),
            }),
        };
        agent.copy_values();
        agent
    }

    /// The model this agent manages.
    #[must_use]
    pub fn model(&self) -> ModelRef {
        ModelRef::clone(&self.state.model)
    }

    #[must_use]
    pub fn config(&self) -> BinderConfig {
        self.state.config
    }

    #[must_use]
    pub fn initial_state(&self) -> InitialState {
        self.state.config.initial_state
    }

    /// The property catalog of the model type.
    #[must_use]
    pub fn catalog(&self) -> Arc<PropertyCatalog> {
        Arc::clone(&self.state.catalog)
    }

    /// Bind `element` to `property`, which may be a property chain.
    ///
    /// For a plain property the element is subscribed to (if it holds a
    /// value) and initial-state synchronization runs. For a chain the
    /// remainder is bound on the nested binder of the first segment.
    ///
    /// # Errors
    ///
    /// See [`BindingError`].
    pub fn bind(
        &self,
        element: ElementRef,
        property: &str,
        converter: Option<ConverterRef>,
    ) -> Result<(), BindingError> {
        if self.warn_if_retired("bind") {
            return Ok(());
        }
        validate_path(property)?;

        if let Some((root, rest)) = split_path(property) {
            self.ensure_unbound(&element)?;
            self.bind_chain(root, rest, ElementRef::clone(&element), converter.clone())?;
            let replaced = self
                .state
                .table
                .borrow_mut()
                .insert(Binding::new(property, element, converter, None));
            drop(replaced);
            tracing::debug!(model = self.state.catalog.model(), property, "bound property chain");
            return Ok(());
        }

        self.property_type(property)?;
        self.ensure_unbound(&element)?;

        let subscription = element
            .as_value_holder()
            .map(|holder| holder.subscribe(self.ui_listener(property, &element)));
        let replaced = self.state.table.borrow_mut().insert(Binding::new(
            property,
            ElementRef::clone(&element),
            converter,
            subscription,
        ));
        drop(replaced);
        tracing::debug!(model = self.state.catalog.model(), property, "bound property");

        self.sync_binding(&element, property);
        Ok(())
    }

    /// Unbind one property (or property chain).
    ///
    /// For a chain, only the binding inside the nested binder is removed;
    /// the nested binder itself is kept. Unbinding an unbound property is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// [`BindingError::InvalidPath`] for a malformed path.
    pub fn unbind(&self, property: &str) -> Result<(), BindingError> {
        validate_path(property)?;

        if let Some((root, rest)) = split_path(property) {
            if let Some(child) = self.nested_binder(root) {
                child.unbind(rest)?;
            }
        }

        let removed = self.state.table.borrow_mut().remove(property);
        if removed.is_some() {
            tracing::debug!(model = self.state.catalog.model(), property, "unbound property");
        }
        drop(removed);
        Ok(())
    }

    /// Unbind everything: all bindings, all subscriptions, all nested binders.
    ///
    /// The agent stays usable afterwards.
    pub fn unbind_all(&self) {
        for child in self.take_nested_binders() {
            child.unbind_all();
        }
        let released = self.state.table.borrow_mut().drain();
        tracing::debug!(
            model = self.state.catalog.model(),
            bindings = released.len(),
            "unbound all properties"
        );
        drop(released);
    }

    /// Bound property names (chains included) in bind order.
    #[must_use]
    pub fn bound_properties(&self) -> Vec<String> {
        self.state.table.borrow().properties()
    }

    /// The element bound to `property`.
    #[must_use]
    pub fn element_for(&self, property: &str) -> Option<ElementRef> {
        self.state
            .table
            .borrow()
            .get(property)
            .map(|b| ElementRef::clone(b.element()))
    }

    /// The converter configured for `property`.
    #[must_use]
    pub fn converter_for(&self, property: &str) -> Option<ConverterRef> {
        self.state
            .table
            .borrow()
            .get(property)
            .and_then(|b| b.converter().cloned())
    }

    /// Register a handler for changes of any property.
    pub fn add_change_handler(
        &self,
        handler: impl Fn(&PropertyChangeEvent) + 'static,
    ) -> HandlerId {
        self.registry().add(handler)
    }

    /// Register a handler for changes of `property`.
    pub fn add_property_change_handler(
        &self,
        property: &str,
        handler: impl Fn(&PropertyChangeEvent) + 'static,
    ) -> HandlerId {
        self.registry().add_for(property, handler)
    }

    pub fn remove_change_handler(&self, id: HandlerId) -> bool {
        self.registry().remove(id)
    }

    pub fn remove_property_change_handler(&self, property: &str, id: HandlerId) -> bool {
        self.registry().remove_for(property, id)
    }

    /// The change registry currently used by this agent.
    #[must_use]
    pub fn registry(&self) -> Rc<PropertyChangeRegistry> {
        Rc::clone(&self.state.handlers.borrow())
    }

    /// Take over the bindings and change handlers of `other`.
    ///
    /// Every binding of `other` is first checked against this agent's model
    /// type. If all of them resolve, the bindings of `other` are released
    /// and replayed through [`bind`](Self::bind) on this agent, then this
    /// agent adopts the change registry of `other` (shared, not copied).
    /// `other` is retired: any handle to it that survives is inert.
    ///
    /// # Errors
    ///
    /// The [`BindingError`] of the first binding that does not resolve on
    /// this model type. `other` is left untouched in that case.
    pub fn copy_from(&self, other: BindingAgent) -> Result<(), BindingError> {
        debug_assert!(
            !Rc::ptr_eq(&self.state, &other.state),
            "an agent cannot copy from itself"
        );
        let triples = other.state.table.borrow().triples();
        for (_, property, _) in &triples {
            self.check_path(property)?;
        }

        other.retire();
        tracing::debug!(
            model = self.state.catalog.model(),
            bindings = triples.len(),
            "copying agent state"
        );
        let replayed = triples
            .into_iter()
            .try_for_each(|(element, property, converter)| self.bind(element, &property, converter));

        // Handlers follow even if a replay failed; `other` no longer serves them.
        let registry = other.registry();
        *self.state.handlers.borrow_mut() = registry;
        replayed
    }

    /// Whether this agent was consumed by [`copy_from`](Self::copy_from).
    #[must_use]
    pub fn is_retired(&self) -> bool {
        self.state.retired.get()
    }

    fn retire(&self) {
        self.state.retired.set(true);
        self.unbind_all();
    }

    fn warn_if_retired(&self, operation: &'static str) -> bool {
        let retired = self.is_retired();
        if retired {
            tracing::warn!(
                model = self.state.catalog.model(),
                operation,
                "binding agent used after its state was transferred"
            );
        }
        retired
    }

    fn property_type(&self, property: &str) -> Result<&PropertyType, BindingError> {
        self.state
            .catalog
            .get(property)
            .ok_or_else(|| BindingError::UnknownProperty {
                model: self.state.catalog.model(),
                property: property.to_owned(),
            })
    }

    fn ensure_unbound(&self, element: &ElementRef) -> Result<(), BindingError> {
        match self.state.table.borrow().find_element(element) {
            Some(existing) => Err(BindingError::DuplicateBinding {
                property: existing.property().to_owned(),
            }),
            None => Ok(()),
        }
    }

    /// Snapshot every cataloged property.
    fn copy_values(&self) {
        for property in self.state.catalog.iter() {
            let value = self.read(property.name());
            self.state
                .known
                .borrow_mut()
                .insert(property.name().to_owned(), value);
        }
    }

    /// Last observed value of `property`.
    fn known(&self, property: &str) -> Value {
        self.state
            .known
            .borrow()
            .get(property)
            .cloned()
            .unwrap_or_default()
    }

    fn read(&self, property: &str) -> Value {
        self.state.model.borrow().get(property)
    }

    fn write(&self, property: &str, value: Value) {
        self.state.model.borrow_mut().set(property, value);
    }
}

impl fmt::Debug for BindingAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingAgent")
            .field("model", &self.state.catalog.model())
            .field("bindings", &*self.state.table.borrow())
            .field("nested", &self.state.nested.borrow().keys().collect::<Vec<_>>())
            .field("initial_state", &self.state.config.initial_state)
            .field("retired", &self.state.retired.get())
            .finish()
    }
}

/// Reject empty paths and paths with an empty segment (`.a`, `a.`, `a..b`).
pub(crate) fn validate_path(path: &str) -> Result<(), BindingError> {
    if path.split(PATH_SEPARATOR).any(str::is_empty) {
        return Err(BindingError::InvalidPath {
            path: path.to_owned(),
        });
    }
    Ok(())
}

/// Split `a.b.c` into `("a", "b.c")`; `None` for a plain property.
pub(crate) fn split_path(path: &str) -> Option<(&str, &str)> {
    path.split_once(PATH_SEPARATOR)
}
