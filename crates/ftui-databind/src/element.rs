#![forbid(unsafe_code)]

//! Capability contracts for bindable UI elements.
//!
//! The binding engine does not know concrete widget types. An element
//! advertises what it can do through [`Element`]:
//!
//! - [`ValueHolder`]: has a value, accepts a value, and reports user edits.
//!   Only value holders propagate changes from the UI into the model.
//! - [`TextHolder`]: displays text. Text-only elements are one-way
//!   (model to UI).
//!
//! An element may provide both; value holding wins when both are present.
//!
//! Element handles are shared (`Rc<dyn Element>`) and take `&self`, so
//! elements use interior mutability for their own state.
//!
//! # Change Listeners
//!
//! [`ChangeListeners`] is a ready-made listener list for element
//! implementations. Callbacks are stored as `Weak` pointers; the strong
//! side lives in the returned [`Subscription`], so dropping the subscription
//! disconnects the listener. Dead entries are pruned lazily on notify.
//!
//! # Invariants
//!
//! 1. Listeners are notified in subscription order.
//! 2. `set_value` / `set_text` never notify listeners (only user edits do).
//! 3. A listener subscribed or dropped during notification takes effect on
//!    the next notification.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::value::Value;

/// Shared handle to a bound element.
pub type ElementRef = Rc<dyn Element>;

/// Callback invoked with the new UI value after a user edit.
pub type ChangeCallback = Box<dyn Fn(&Value)>;

/// Capability query for a UI element.
pub trait Element {
    /// The element's value capability, if it has one.
    fn as_value_holder(&self) -> Option<&dyn ValueHolder> {
        None
    }

    /// The element's text capability, if it has one.
    fn as_text_holder(&self) -> Option<&dyn TextHolder> {
        None
    }
}

/// An element holding a value that the user can edit.
pub trait ValueHolder {
    fn value(&self) -> Value;

    /// Replace the displayed value without notifying listeners.
    fn set_value(&self, value: Value);

    /// Register `callback` for user edits. Dropping the returned
    /// [`Subscription`] unregisters it.
    fn subscribe(&self, callback: ChangeCallback) -> Subscription;
}

/// An element displaying text.
pub trait TextHolder {
    fn text(&self) -> String;

    fn set_text(&self, text: &str);
}

/// Whether two handles refer to the same element.
#[must_use]
pub fn same_element(a: &ElementRef, b: &ElementRef) -> bool {
    Rc::ptr_eq(a, b)
}

type Listener = dyn Fn(&Value);

/// RAII guard for an element change listener.
///
/// Dropping it (or calling [`Subscription::cancel`]) removes the listener
/// before the element's next notification.
pub struct Subscription {
    _callback: Rc<Listener>,
}

impl Subscription {
    /// Release the listener now.
    pub fn cancel(self) {}
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish()
    }
}

/// Listener list for [`ValueHolder`] implementations.
///
/// Cloning shares the list, so an element can hand a clone to whatever code
/// fires its change events.
#[derive(Clone, Default)]
pub struct ChangeListeners {
    callbacks: Rc<RefCell<Vec<Weak<Listener>>>>,
}

impl ChangeListeners {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a boxed callback.
    pub fn subscribe(&self, callback: ChangeCallback) -> Subscription {
        let strong: Rc<Listener> = Rc::from(callback);
        self.callbacks.borrow_mut().push(Rc::downgrade(&strong));
        Subscription { _callback: strong }
    }

    /// Register a closure.
    pub fn subscribe_fn(&self, callback: impl Fn(&Value) + 'static) -> Subscription {
        self.subscribe(Box::new(callback))
    }

    /// Notify every live listener of a user edit.
    pub fn notify(&self, value: &Value) {
        let live: Vec<Rc<Listener>> = {
            let mut callbacks = self.callbacks.borrow_mut();
            callbacks.retain(|weak| weak.strong_count() > 0);
            callbacks.iter().filter_map(Weak::upgrade).collect()
        };
        for callback in live {
            callback(value);
        }
    }

    /// Number of live listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks
            .borrow()
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ChangeListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeListeners")
            .field("live", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Label, TextInput};
    use std::cell::Cell;

    #[test]
    fn listeners_fire_in_order() {
        let listeners = ChangeListeners::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let l1 = Rc::clone(&log);
        let l2 = Rc::clone(&log);
        let _a = listeners.subscribe_fn(move |_| l1.borrow_mut().push(1));
        let _b = listeners.subscribe_fn(move |_| l2.borrow_mut().push(2));

        listeners.notify(&Value::Null);
        assert_eq!(*log.borrow(), [1, 2]);
    }

    #[test]
    fn dropping_subscription_disconnects() {
        let listeners = ChangeListeners::new();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let sub = listeners.subscribe_fn(move |_| h.set(h.get() + 1));
        assert_eq!(listeners.len(), 1);

        listeners.notify(&Value::Int(1));
        sub.cancel();
        listeners.notify(&Value::Int(2));
        assert_eq!(hits.get(), 1);
        assert!(listeners.is_empty());
    }

    #[test]
    fn subscribing_during_notify_waits_for_next_round() {
        let listeners = ChangeListeners::new();
        let late_hits = Rc::new(Cell::new(0));
        let held = Rc::new(RefCell::new(Vec::new()));

        let inner = listeners.clone();
        let late = Rc::clone(&late_hits);
        let store = Rc::clone(&held);
        let _sub = listeners.subscribe_fn(move |_| {
            let late = Rc::clone(&late);
            let sub = inner.subscribe_fn(move |_| late.set(late.get() + 1));
            store.borrow_mut().push(sub);
        });

        listeners.notify(&Value::Null);
        assert_eq!(late_hits.get(), 0);
        listeners.notify(&Value::Null);
        assert_eq!(late_hits.get(), 1);
    }

    #[test]
    fn capabilities_are_queried_not_inspected() {
        let input: ElementRef = TextInput::new("x");
        let label: ElementRef = Label::new("y");
        assert!(input.as_value_holder().is_some());
        assert!(input.as_text_holder().is_some());
        assert!(label.as_value_holder().is_none());
        assert_eq!(label.as_text_holder().map(TextHolder::text), Some("y".into()));
    }

    #[test]
    fn element_identity() {
        let a: ElementRef = Label::new("");
        let b: ElementRef = Label::new("");
        assert!(same_element(&a, &Rc::clone(&a)));
        assert!(!same_element(&a, &b));
    }
}
