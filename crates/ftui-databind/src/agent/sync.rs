#![forbid(unsafe_code)]

//! Initial-state synchronization of freshly bound elements.

use super::BindingAgent;
use crate::convert;
use crate::element::ElementRef;
use crate::initial_state::InitialState;
use crate::value::Value;

impl BindingAgent {
    /// Re-run initial-state synchronization for every binding, nested
    /// binders included.
    ///
    /// With [`InitialState::None`] this does nothing.
    pub fn sync_state(&self) {
        if self.warn_if_retired("sync_state") || !self.state.config.initial_state.syncs() {
            return;
        }
        let direct: Vec<(ElementRef, String)> = self
            .state
            .table
            .borrow()
            .iter()
            .filter(|b| !b.is_pass_through())
            .map(|b| (ElementRef::clone(b.element()), b.property().to_owned()))
            .collect();
        for (element, property) in direct {
            self.sync_binding(&element, &property);
        }
        for child in self.nested_binders() {
            child.agent().sync_state();
        }
    }

    /// Apply the initial-state policy to one direct binding.
    ///
    /// `FromModel` always pushes and fires, even when nothing differs.
    pub(super) fn sync_binding(&self, element: &ElementRef, property: &str) {
        let policy = self.state.config.initial_state;
        if !policy.syncs() {
            return;
        }
        let ui_value = element
            .as_value_holder()
            .map(|holder| holder.value())
            .or_else(|| element.as_text_holder().map(|holder| Value::Text(holder.text())));
        let from_ui = ui_value.is_some();
        let value = policy.initial_value(self.read(property), ui_value);
        let old = self.known(property);

        match policy {
            InitialState::FromModel => self.update_elements_and_fire(property, old, value, None),
            InitialState::FromUi => {
                let value = match self.state.catalog.get(property) {
                    Some(info) if from_ui => {
                        let converter = self.converter_for(property);
                        convert::to_model_value(info.declared_type(), value, converter.as_deref())
                    }
                    _ => value,
                };
                tracing::trace!(model = self.state.catalog.model(), property, "initial state from ui");
                self.write(property, value.clone());
                self.fire(property, old, value);
            }
            InitialState::None => {}
        }
    }
}
