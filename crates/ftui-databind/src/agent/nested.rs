#![forbid(unsafe_code)]

//! Property chains.
//!
//! Binding `address.street` creates (or reuses) a nested [`DataBinder`] for
//! the `address` property and binds `street` on it. The outer property is
//! then written back through the agent so it holds the nested binder's
//! model. When `address` is later replaced by another model, the nested
//! binder moves onto it with [`InitialState::FromModel`], which refreshes
//! every element bound below it.
//!
//! Clearing `address` to `Null` leaves the nested binder on its previous
//! model; it moves again when a model is assigned.

use super::{BindingAgent, PATH_SEPARATOR, validate_path};
use crate::binder::DataBinder;
use crate::convert::ConverterRef;
use crate::element::ElementRef;
use crate::error::BindingError;
use crate::initial_state::InitialState;
use crate::model::same_model;
use crate::value::Value;

impl BindingAgent {
    /// The nested binder serving chains through `property`.
    #[must_use]
    pub fn nested_binder(&self, property: &str) -> Option<DataBinder> {
        self.state.nested.borrow().get(property).cloned()
    }

    /// Properties that currently have a nested binder, sorted.
    #[must_use]
    pub fn nested_properties(&self) -> Vec<String> {
        self.state.nested.borrow().keys().cloned().collect()
    }

    pub(super) fn nested_binders(&self) -> Vec<DataBinder> {
        self.state.nested.borrow().values().cloned().collect()
    }

    pub(super) fn take_nested_binders(&self) -> Vec<DataBinder> {
        std::mem::take(&mut *self.state.nested.borrow_mut())
            .into_values()
            .collect()
    }

    /// Check that `path` resolves on this agent's model type: every segment
    /// but the last names a nested model property, the last one exists.
    pub(super) fn check_path(&self, path: &str) -> Result<(), BindingError> {
        validate_path(path)?;
        let mut catalog = self.catalog();
        let mut segments = path.split(PATH_SEPARATOR).peekable();
        while let Some(segment) = segments.next() {
            let info = catalog
                .get(segment)
                .ok_or_else(|| BindingError::UnknownProperty {
                    model: catalog.model(),
                    property: segment.to_owned(),
                })?;
            if segments.peek().is_none() {
                break;
            }
            let declared = info.declared_type();
            let nested = declared
                .model_type()
                .filter(|_| info.is_bindable())
                .ok_or_else(|| BindingError::NotBindable {
                    property: segment.to_owned(),
                    declared: declared.to_string(),
                })?;
            catalog = nested.catalog();
        }
        Ok(())
    }

    /// Bind `rest` on the nested binder of `root`.
    pub(super) fn bind_chain(
        &self,
        root: &str,
        rest: &str,
        element: ElementRef,
        converter: Option<ConverterRef>,
    ) -> Result<(), BindingError> {
        let info = self.property_type(root)?;
        let declared = info.declared_type();
        let model_type = declared
            .model_type()
            .filter(|_| info.is_bindable())
            .ok_or_else(|| BindingError::NotBindable {
                property: root.to_owned(),
                declared: declared.to_string(),
            })?;

        let current = self.read(root);
        let child = match self.nested_binder(root) {
            Some(child) => {
                self.rehome_nested(root, &current);
                child.bind(element, rest, converter)?;
                child
            }
            None => {
                let config = self.state.config;
                let child = match current.into_model() {
                    Some(model) => DataBinder::with_config(model, config),
                    None => DataBinder::for_type_with_config(model_type, config),
                };
                child.bind(element, rest, converter)?;
                tracing::debug!(
                    model = self.state.catalog.model(),
                    property = root,
                    nested = model_type.name,
                    "created nested binder"
                );
                self.state
                    .nested
                    .borrow_mut()
                    .insert(root.to_owned(), child.clone());
                child
            }
        };

        let managed = child.model();
        let holds_managed = self
            .read(root)
            .as_model()
            .is_some_and(|model| same_model(model, &managed));
        if !holds_managed {
            self.write_through(root, Value::Model(managed));
        }
        Ok(())
    }

    /// Move the nested binder of `property` onto `value` if it holds a
    /// different model.
    pub(super) fn rehome_nested(&self, property: &str, value: &Value) {
        let Some(child) = self.nested_binder(property) else {
            return;
        };
        let Some(model) = value.as_model() else {
            tracing::debug!(
                model = self.state.catalog.model(),
                property,
                "nested model cleared; keeping nested binder"
            );
            return;
        };
        if same_model(&child.model(), model) {
            return;
        }
        tracing::debug!(model = self.state.catalog.model(), property, "moving nested binder");
        if let Err(error) = child.set_model(model.clone(), InitialState::FromModel) {
            tracing::warn!(
                model = self.state.catalog.model(),
                property,
                %error,
                "failed to move nested binder onto new model"
            );
        }
    }
}
