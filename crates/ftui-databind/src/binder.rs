#![forbid(unsafe_code)]

//! [`DataBinder`]: the user-facing handle of a binding agent.
//!
//! A binder owns the current agent and can swap the model underneath it.
//! [`DataBinder::set_model`] builds a fresh agent for the new model and
//! transfers every binding and change handler onto it, so code holding the
//! binder never sees the hand-over. Code holding an old [`BindingAgent`]
//! handle does: that agent is retired and ignores further calls.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::agent::BindingAgent;
use crate::config::BinderConfig;
use crate::convert::ConverterRef;
use crate::element::ElementRef;
use crate::error::BindingError;
use crate::event::{HandlerId, PropertyChangeEvent};
use crate::initial_state::InitialState;
use crate::model::{ModelRef, ModelType};

/// Binds UI elements to one model at a time. Clones share the binder.
#[derive(Clone)]
pub struct DataBinder {
    agent: Rc<RefCell<BindingAgent>>,
}

impl DataBinder {
    /// Binder for an existing model.
    #[must_use]
    pub fn for_model(model: ModelRef, initial_state: InitialState) -> Self {
        Self::with_config(model, BinderConfig::new(initial_state))
    }

    /// Binder for a fresh instance of `model_type`.
    #[must_use]
    pub fn for_type(model_type: &'static ModelType, initial_state: InitialState) -> Self {
        Self::for_type_with_config(model_type, BinderConfig::new(initial_state))
    }

    #[must_use]
    pub fn with_config(model: ModelRef, config: BinderConfig) -> Self {
        Self {
            agent: Rc::new(RefCell::new(BindingAgent::new(model, config))),
        }
    }

    #[must_use]
    pub fn for_type_with_config(model_type: &'static ModelType, config: BinderConfig) -> Self {
        Self::with_config(model_type.instantiate(), config)
    }

    /// The current agent.
    #[must_use]
    pub fn agent(&self) -> BindingAgent {
        self.agent.borrow().clone()
    }

    /// The current model.
    #[must_use]
    pub fn model(&self) -> ModelRef {
        self.agent().model()
    }

    /// Bind `element` to `property`. Chainable.
    ///
    /// # Errors
    ///
    /// See [`BindingAgent::bind`].
    pub fn bind(
        &self,
        element: ElementRef,
        property: &str,
        converter: Option<ConverterRef>,
    ) -> Result<&Self, BindingError> {
        self.agent().bind(element, property, converter)?;
        Ok(self)
    }

    /// Unbind `property`. Chainable.
    ///
    /// # Errors
    ///
    /// See [`BindingAgent::unbind`].
    pub fn unbind(&self, property: &str) -> Result<&Self, BindingError> {
        self.agent().unbind(property)?;
        Ok(self)
    }

    pub fn unbind_all(&self) -> &Self {
        self.agent().unbind_all();
        self
    }

    /// Replace the model, keeping all bindings and change handlers.
    ///
    /// Elements are synchronized with the new model according to
    /// `initial_state`. Returns the new model.
    ///
    /// # Errors
    ///
    /// A [`BindingError`] if a binding cannot be recreated on the new model
    /// (for example because its type lacks the property). The binder then
    /// keeps its current model, bindings and change handlers.
    pub fn set_model(
        &self,
        model: ModelRef,
        initial_state: InitialState,
    ) -> Result<ModelRef, BindingError> {
        let previous = self.agent();
        let next = BindingAgent::new(model, previous.config().with_initial_state(initial_state));
        tracing::debug!(
            model = next.catalog().model(),
            ?initial_state,
            bindings = previous.bound_properties().len(),
            "replacing binder model"
        );
        *self.agent.borrow_mut() = next.clone();
        if let Err(error) = next.copy_from(previous.clone()) {
            if !previous.is_retired() {
                *self.agent.borrow_mut() = previous;
            }
            return Err(error);
        }
        Ok(next.model())
    }

    /// Register a handler for changes of any property.
    pub fn add_change_handler(
        &self,
        handler: impl Fn(&PropertyChangeEvent) + 'static,
    ) -> HandlerId {
        self.agent().add_change_handler(handler)
    }

    /// Register a handler for changes of `property`.
    pub fn add_property_change_handler(
        &self,
        property: &str,
        handler: impl Fn(&PropertyChangeEvent) + 'static,
    ) -> HandlerId {
        self.agent().add_property_change_handler(property, handler)
    }

    pub fn remove_change_handler(&self, id: HandlerId) -> bool {
        self.agent().remove_change_handler(id)
    }

    pub fn remove_property_change_handler(&self, property: &str, id: HandlerId) -> bool {
        self.agent().remove_property_change_handler(property, id)
    }

    /// Propagate model changes made behind the binder's back.
    pub fn reconcile(&self) {
        self.agent().reconcile();
    }
}

impl fmt::Debug for DataBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DataBinder").field(&*self.agent.borrow()).finish()
    }
}
