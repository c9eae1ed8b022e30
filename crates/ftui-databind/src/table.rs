#![forbid(unsafe_code)]

//! The live set of property-to-element bindings of one agent.
//!
//! Each property has at most one binding. Compound paths (`address.street`)
//! get a pass-through entry here while the nested agent owns the real
//! binding, so lookups by the full path still work on the outer agent.
//!
//! Bindings are kept in insertion order; that order is the replay order of
//! [`BindingAgent::copy_from`](crate::BindingAgent::copy_from).
//!
//! Dropping a [`Binding`] releases its element subscription.

use std::fmt;

use crate::convert::ConverterRef;
use crate::element::{ElementRef, Subscription, same_element};

/// One property-to-element association.
pub struct Binding {
    property: String,
    element: ElementRef,
    converter: Option<ConverterRef>,
    subscription: Option<Subscription>,
}

impl Binding {
    pub(crate) fn new(
        property: impl Into<String>,
        element: ElementRef,
        converter: Option<ConverterRef>,
        subscription: Option<Subscription>,
    ) -> Self {
        Self {
            property: property.into(),
            element,
            converter,
            subscription,
        }
    }

    #[must_use]
    pub fn property(&self) -> &str {
        &self.property
    }

    #[must_use]
    pub fn element(&self) -> &ElementRef {
        &self.element
    }

    #[must_use]
    pub fn converter(&self) -> Option<&ConverterRef> {
        self.converter.as_ref()
    }

    /// Whether this binding listens to element edits.
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Whether this is the outer entry of a property chain.
    #[must_use]
    pub fn is_pass_through(&self) -> bool {
        self.property.contains(crate::agent::PATH_SEPARATOR)
    }

    /// The `(element, property, converter)` triple needed to recreate it.
    pub(crate) fn triple(&self) -> (ElementRef, String, Option<ConverterRef>) {
        (
            ElementRef::clone(&self.element),
            self.property.clone(),
            self.converter.clone(),
        )
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("property", &self.property)
            .field("converter", &self.converter.is_some())
            .field("subscribed", &self.subscription.is_some())
            .finish()
    }
}

/// Property name to [`Binding`], one binding per property.
#[derive(Default)]
pub struct BindingTable {
    bindings: Vec<Binding>,
}

impl BindingTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `binding`, returning the binding it replaced, if any.
    pub fn insert(&mut self, binding: Binding) -> Option<Binding> {
        match self.position(&binding.property) {
            Some(i) => Some(std::mem::replace(&mut self.bindings[i], binding)),
            None => {
                self.bindings.push(binding);
                None
            }
        }
    }

    /// Remove and return the binding for `property`.
    pub fn remove(&mut self, property: &str) -> Option<Binding> {
        self.position(property).map(|i| self.bindings.remove(i))
    }

    #[must_use]
    pub fn get(&self, property: &str) -> Option<&Binding> {
        self.position(property).map(|i| &self.bindings[i])
    }

    /// The binding that holds `element`, if any.
    #[must_use]
    pub fn find_element(&self, element: &ElementRef) -> Option<&Binding> {
        self.bindings
            .iter()
            .find(|b| same_element(&b.element, element))
    }

    /// Bound property names in insertion order.
    #[must_use]
    pub fn properties(&self) -> Vec<String> {
        self.bindings.iter().map(|b| b.property.clone()).collect()
    }

    /// Replayable triples of every binding, in insertion order.
    pub(crate) fn triples(&self) -> Vec<(ElementRef, String, Option<ConverterRef>)> {
        self.bindings.iter().map(Binding::triple).collect()
    }

    /// Remove every binding. Subscriptions are released when the returned
    /// bindings are dropped.
    pub fn drain(&mut self) -> Vec<Binding> {
        std::mem::take(&mut self.bindings)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    fn position(&self, property: &str) -> Option<usize> {
        self.bindings.iter().position(|b| b.property == property)
    }
}

impl fmt::Debug for BindingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.bindings.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ValueHolder;
    use crate::value::Value;
    use crate::testing::{Label, TextInput};

    #[test]
    fn one_binding_per_property() {
        let mut table = BindingTable::new();
        let first: ElementRef = Label::new("");
        let second: ElementRef = Label::new("");
        assert!(table.insert(Binding::new("name", first.clone(), None, None)).is_none());
        let replaced = table.insert(Binding::new("name", second.clone(), None, None));

        assert!(same_element(replaced.unwrap().element(), &first));
        assert_eq!(table.len(), 1);
        assert!(same_element(table.get("name").unwrap().element(), &second));
    }

    #[test]
    fn insertion_order_is_kept() {
        let mut table = BindingTable::new();
        for p in ["b", "a", "address.street"] {
            table.insert(Binding::new(p, Label::new(""), None, None));
        }
        assert_eq!(table.properties(), ["b", "a", "address.street"]);
        assert!(table.get("address.street").unwrap().is_pass_through());
        assert!(!table.get("a").unwrap().is_pass_through());
    }

    #[test]
    fn find_by_element_identity() {
        let mut table = BindingTable::new();
        let el: ElementRef = Label::new("");
        table.insert(Binding::new("name", el.clone(), None, None));
        assert_eq!(table.find_element(&el).map(Binding::property), Some("name"));
        assert!(table.find_element(&(Label::new("") as ElementRef)).is_none());
    }

    #[test]
    fn removing_releases_the_subscription() {
        let input = TextInput::new("");
        let sub = input.subscribe(Box::new(|_: &Value| {}));
        let mut table = BindingTable::new();
        table.insert(Binding::new("name", input.clone(), None, Some(sub)));
        assert_eq!(input.listener_count(), 1);
        assert!(table.get("name").unwrap().is_subscribed());

        drop(table.remove("name"));
        assert_eq!(input.listener_count(), 0);
        assert!(table.is_empty());
    }

    #[test]
    fn drain_empties_the_table() {
        let input = TextInput::new("");
        let mut table = BindingTable::new();
        table.insert(Binding::new(
            "name",
            input.clone(),
            None,
            Some(input.subscribe(Box::new(|_: &Value| {}))),
        ));
        let drained = table.drain();
        assert_eq!(drained.len(), 1);
        assert!(table.is_empty());
        drop(drained);
        assert_eq!(input.listener_count(), 0);
    }
}
