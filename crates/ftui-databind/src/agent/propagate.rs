#![forbid(unsafe_code)]

//! Change propagation: UI edits into the model, model changes out to
//! elements and handlers, and the dirty check.

use std::rc::{Rc, Weak};
use std::sync::Arc;

use super::{AgentState, BindingAgent};
use crate::convert::{self, Converter};
use crate::element::{ChangeCallback, Element, ElementRef, same_element};
use crate::error::BindingError;
use crate::event::PropertyChangeEvent;
use crate::value::Value;

impl BindingAgent {
    /// Write `value` to `property` through the agent.
    ///
    /// The bound element is updated and handlers fire right away, without
    /// waiting for [`reconcile`](Self::reconcile). Writing a new model into a
    /// property with a nested binder moves that binder onto the new model.
    ///
    /// # Errors
    ///
    /// [`BindingError::UnknownProperty`] if `property` is not cataloged.
    pub fn set_property(&self, property: &str, value: Value) -> Result<(), BindingError> {
        self.property_type(property)?;
        if self.warn_if_retired("set_property") {
            return Ok(());
        }
        self.write_through(property, value);
        Ok(())
    }

    /// Read `property` from the model; `None` if it is not cataloged.
    #[must_use]
    pub fn property(&self, property: &str) -> Option<Value> {
        self.state
            .catalog
            .contains(property)
            .then(|| self.read(property))
    }

    /// Propagate model changes made behind the agent's back.
    ///
    /// Every cataloged property whose current value differs from the last
    /// observed one updates its element and fires one change event. Nested
    /// binders whose model was replaced are moved onto the new model, then
    /// every nested binder reconciles in turn. Calling this twice in a row
    /// fires nothing the second time.
    pub fn reconcile(&self) {
        if self.warn_if_retired("reconcile") {
            return;
        }
        let catalog = Arc::clone(&self.state.catalog);
        for property in catalog.iter() {
            let name = property.name();
            let known = self.known(name);
            let actual = self.read(name);
            if known == actual {
                continue;
            }
            tracing::trace!(model = catalog.model(), property = name, "dirty property");
            self.rehome_nested(name, &actual);
            self.update_elements_and_fire(name, known, actual, None);
        }

        for child in self.nested_binders() {
            child.agent().reconcile();
        }
    }

    /// Write through the agent and propagate the change.
    pub(super) fn write_through(&self, property: &str, value: Value) {
        let old = self.read(property);
        if value.as_model().is_some() {
            self.rehome_nested(property, &value);
        }
        self.write(property, value.clone());
        if old != value || self.state.config.notify_unchanged {
            self.update_elements_and_fire(property, old, value, None);
        }
    }

    /// Element listener feeding user edits of `property` back into the model.
    pub(super) fn ui_listener(&self, property: &str, element: &ElementRef) -> ChangeCallback {
        let agent: Weak<AgentState> = Rc::downgrade(&self.state);
        let origin: Weak<dyn Element> = Rc::downgrade(element);
        let property = property.to_owned();
        Box::new(move |value: &Value| {
            let (Some(state), Some(origin)) = (agent.upgrade(), origin.upgrade()) else {
                return;
            };
            BindingAgent { state }.apply_ui_change(&property, &origin, value.clone());
        })
    }

    fn apply_ui_change(&self, property: &str, origin: &ElementRef, ui_value: Value) {
        if self.warn_if_retired("apply_ui_change") {
            return;
        }
        let Some(declared) = self.state.catalog.get(property).map(|p| p.declared_type()) else {
            return;
        };
        let converter = self.converter_for(property);
        let new = convert::to_model_value(declared, ui_value, converter.as_deref());
        let old = self.read(property);
        if old == new && !self.state.config.notify_unchanged {
            return;
        }
        tracing::trace!(model = self.state.catalog.model(), property, "ui edit");
        self.write(property, new.clone());
        self.update_elements_and_fire(property, old, new, Some(origin));
    }

    /// Push `new` to the element bound to `property` (unless it is
    /// `excluding`), then fire the change event.
    pub(super) fn update_elements_and_fire(
        &self,
        property: &str,
        old: Value,
        new: Value,
        excluding: Option<&ElementRef>,
    ) {
        let target = self
            .state
            .table
            .borrow()
            .get(property)
            .map(|b| (ElementRef::clone(b.element()), b.converter().cloned()));
        if let Some((element, converter)) = target {
            if !excluding.is_some_and(|origin| same_element(origin, &element)) {
                push_to_element(&element, &new, converter.as_deref());
            }
        }
        self.fire(property, old, new);
    }

    /// Record `new` as observed and notify handlers.
    pub(super) fn fire(&self, property: &str, old: Value, new: Value) {
        self.state
            .known
            .borrow_mut()
            .insert(property.to_owned(), new.clone());
        let registry = self.registry();
        registry.notify(&PropertyChangeEvent {
            source: self.model(),
            property: property.to_owned(),
            old_value: old,
            new_value: new,
        });
    }
}

/// Show a model value on an element, through its value or text capability.
pub(super) fn push_to_element(element: &ElementRef, value: &Value, converter: Option<&dyn Converter>) {
    if let Some(holder) = element.as_value_holder() {
        holder.set_value(convert::to_ui_value(value, converter));
    } else if let Some(holder) = element.as_text_holder() {
        holder.set_text(&convert::to_ui_text(value, converter));
    }
}
