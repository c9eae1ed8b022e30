#![forbid(unsafe_code)]

//! Property change events and their handler registry.
//!
//! A [`PropertyChangeRegistry`] holds global handlers (every property) and
//! property-scoped handlers. Registries are shared through `Rc` so an agent
//! can hand its registry over to a successor (see
//! [`BindingAgent::copy_from`](crate::BindingAgent::copy_from)); handler ids
//! stay valid across that hand-over.
//!
//! # Invariants
//!
//! 1. Handler ids are unique per process and increase with registration.
//! 2. `notify` calls global and scoped handlers merged in registration order.
//! 3. The handler set is captured before dispatch: handlers added or removed
//!    by a running handler take effect on the next event.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use ahash::AHashMap;

use crate::model::ModelRef;
use crate::value::Value;

/// Global counter for handler ids.
static HANDLER_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Identifies a registered change handler, for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandlerId(u64);

impl HandlerId {
    fn next() -> Self {
        Self(HANDLER_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw id value.
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// A change of one model property.
#[derive(Clone)]
pub struct PropertyChangeEvent {
    /// The model whose property changed.
    pub source: ModelRef,
    /// Name of the changed property (top-level, never a chain).
    pub property: String,
    pub old_value: Value,
    pub new_value: Value,
}

impl fmt::Debug for PropertyChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyChangeEvent")
            .field("property", &self.property)
            .field("old_value", &self.old_value)
            .field("new_value", &self.new_value)
            .finish_non_exhaustive()
    }
}

/// Handler invoked for property change events.
pub type ChangeHandler = Rc<dyn Fn(&PropertyChangeEvent)>;

/// Global and per-property change handlers.
#[derive(Default)]
pub struct PropertyChangeRegistry {
    global: RefCell<Vec<(HandlerId, ChangeHandler)>>,
    scoped: RefCell<AHashMap<String, Vec<(HandlerId, ChangeHandler)>>>,
}

impl PropertyChangeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for every property.
    pub fn add(&self, handler: impl Fn(&PropertyChangeEvent) + 'static) -> HandlerId {
        let id = HandlerId::next();
        self.global.borrow_mut().push((id, Rc::new(handler)));
        id
    }

    /// Register a handler for one property.
    pub fn add_for(
        &self,
        property: impl Into<String>,
        handler: impl Fn(&PropertyChangeEvent) + 'static,
    ) -> HandlerId {
        let id = HandlerId::next();
        self.scoped
            .borrow_mut()
            .entry(property.into())
            .or_default()
            .push((id, Rc::new(handler)));
        id
    }

    /// Remove a global handler. Returns whether it was registered.
    pub fn remove(&self, id: HandlerId) -> bool {
        let mut global = self.global.borrow_mut();
        let before = global.len();
        global.retain(|(h, _)| *h != id);
        global.len() != before
    }

    /// Remove a handler scoped to `property`. Returns whether it was registered.
    pub fn remove_for(&self, property: &str, id: HandlerId) -> bool {
        let mut scoped = self.scoped.borrow_mut();
        let Some(handlers) = scoped.get_mut(property) else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|(h, _)| *h != id);
        let removed = handlers.len() != before;
        if handlers.is_empty() {
            scoped.remove(property);
        }
        removed
    }

    /// Dispatch `event` to global handlers and handlers scoped to its property.
    pub fn notify(&self, event: &PropertyChangeEvent) {
        let mut targets: Vec<(HandlerId, ChangeHandler)> = self.global.borrow().clone();
        if let Some(scoped) = self.scoped.borrow().get(&event.property) {
            targets.extend(scoped.iter().cloned());
        }
        targets.sort_by_key(|(id, _)| *id);

        tracing::trace!(
            property = %event.property,
            old = ?event.old_value,
            new = ?event.new_value,
            handlers = targets.len(),
            "property change"
        );
        for (_, handler) in targets {
            handler(event);
        }
    }

    /// Total number of registered handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.global.borrow().len() + self.scoped.borrow().values().map(Vec::len).sum::<usize>()
    }
}

impl fmt::Debug for PropertyChangeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyChangeRegistry")
            .field("global", &self.global.borrow().len())
            .field("scoped", &self.scoped.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Address;
    use std::cell::Cell;

    fn event(property: &str) -> PropertyChangeEvent {
        PropertyChangeEvent {
            source: Address::new_ref("", ""),
            property: property.into(),
            old_value: Value::Null,
            new_value: Value::Int(1),
        }
    }

    fn recorder(
        log: &Rc<RefCell<Vec<&'static str>>>,
        tag: &'static str,
    ) -> impl Fn(&PropertyChangeEvent) + 'static {
        let log = Rc::clone(log);
        move |_: &PropertyChangeEvent| log.borrow_mut().push(tag)
    }

    #[test]
    fn global_and_scoped_in_registration_order() {
        let registry = PropertyChangeRegistry::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        registry.add_for("street", recorder(&log, "scoped-1"));
        registry.add(recorder(&log, "global"));
        registry.add_for("street", recorder(&log, "scoped-2"));
        registry.add_for("city", recorder(&log, "other"));

        registry.notify(&event("street"));
        assert_eq!(*log.borrow(), ["scoped-1", "global", "scoped-2"]);
    }

    #[test]
    fn removal_by_id() {
        let registry = PropertyChangeRegistry::new();
        let hits = Rc::new(Cell::new(0));
        let h1 = Rc::clone(&hits);
        let h2 = Rc::clone(&hits);
        let global = registry.add(move |_| h1.set(h1.get() + 1));
        let scoped = registry.add_for("city", move |_| h2.set(h2.get() + 10));
        assert_eq!(registry.handler_count(), 2);

        assert!(registry.remove(global));
        assert!(!registry.remove(global));
        assert!(!registry.remove_for("street", scoped));
        assert!(registry.remove_for("city", scoped));
        registry.notify(&event("city"));
        assert_eq!(hits.get(), 0);
        assert_eq!(registry.handler_count(), 0);
    }

    #[test]
    fn handlers_may_register_during_dispatch() {
        let registry = Rc::new(PropertyChangeRegistry::new());
        let late = Rc::new(Cell::new(0));

        let reg = Rc::clone(&registry);
        let counter = Rc::clone(&late);
        registry.add(move |_| {
            let counter = Rc::clone(&counter);
            reg.add(move |_| counter.set(counter.get() + 1));
        });

        registry.notify(&event("city"));
        assert_eq!(late.get(), 0);
        registry.notify(&event("city"));
        assert_eq!(late.get(), 1);
    }

    #[test]
    fn handler_ids_increase() {
        let registry = PropertyChangeRegistry::new();
        let a = registry.add(|_| {});
        let b = registry.add_for("x", |_| {});
        assert!(b.id() > a.id());
    }
}
