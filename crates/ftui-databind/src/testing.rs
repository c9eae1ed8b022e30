//! Test models and elements shared by the unit tests.

use std::cell::RefCell;
use std::rc::Rc;

use crate::agent::BindingAgent;
use crate::catalog::{DeclaredType, PropertyType};
use crate::element::{ChangeCallback, ChangeListeners, Element, Subscription, TextHolder, ValueHolder};
use crate::model::{ModelRef, ModelType, PropertyAccessor, new_model};
use crate::value::Value;

pub static PERSON: ModelType = ModelType {
    name: "Person",
    properties: person_properties,
    create: new_person,
};

pub static ADDRESS: ModelType = ModelType {
    name: "Address",
    properties: address_properties,
    create: new_address,
};

fn new_person() -> ModelRef {
    new_model(Person::default())
}

fn new_address() -> ModelRef {
    new_model(Address::default())
}

fn person_properties() -> Vec<PropertyType> {
    vec![
        PropertyType::new("name", DeclaredType::Text),
        PropertyType::new("age", DeclaredType::Int),
        PropertyType::new("active", DeclaredType::Bool),
        PropertyType::new("address", DeclaredType::Model(&ADDRESS)),
    ]
}

fn address_properties() -> Vec<PropertyType> {
    vec![
        PropertyType::new("street", DeclaredType::Text),
        PropertyType::new("city", DeclaredType::Text),
    ]
}

#[derive(Default)]
pub struct Person {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub active: bool,
    pub address: Option<ModelRef>,
}

impl Person {
    pub fn shared(name: &str, age: i64) -> Rc<RefCell<Person>> {
        Rc::new(RefCell::new(Person {
            name: Some(name.to_owned()),
            age: Some(age),
            ..Person::default()
        }))
    }

    pub fn set_address(&mut self, address: ModelRef) {
        self.address = Some(address);
    }
}

impl PropertyAccessor for Person {
    fn model_type(&self) -> &'static ModelType {
        &PERSON
    }

    fn get(&self, property: &str) -> Value {
        match property {
            "name" => Value::from(self.name.clone()),
            "age" => Value::from(self.age),
            "active" => Value::Bool(self.active),
            "address" => Value::from(self.address.clone()),
            _ => Value::Null,
        }
    }

    fn set(&mut self, property: &str, value: Value) {
        match property {
            "name" => self.name = value.into_text(),
            "age" => self.age = value.as_int(),
            "active" => self.active = value.as_bool().unwrap_or_default(),
            "address" => self.address = value.into_model(),
            _ => {}
        }
    }
}

#[derive(Default)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
}

impl Address {
    pub fn shared(street: &str, city: &str) -> Rc<RefCell<Address>> {
        Rc::new(RefCell::new(Address {
            street: Some(street.to_owned()),
            city: Some(city.to_owned()),
        }))
    }

    pub fn new_ref(street: &str, city: &str) -> ModelRef {
        Self::shared(street, city)
    }
}

impl PropertyAccessor for Address {
    fn model_type(&self) -> &'static ModelType {
        &ADDRESS
    }

    fn get(&self, property: &str) -> Value {
        match property {
            "street" => Value::from(self.street.clone()),
            "city" => Value::from(self.city.clone()),
            _ => Value::Null,
        }
    }

    fn set(&mut self, property: &str, value: Value) {
        match property {
            "street" => self.street = value.into_text(),
            "city" => self.city = value.into_text(),
            _ => {}
        }
    }
}

/// Editable text field: value and text capability.
#[derive(Default)]
pub struct TextInput {
    text: RefCell<String>,
    listeners: ChangeListeners,
}

impl TextInput {
    pub fn new(text: &str) -> Rc<Self> {
        Rc::new(Self {
            text: RefCell::new(text.to_owned()),
            listeners: ChangeListeners::new(),
        })
    }

    /// Simulate the user typing `text`.
    pub fn type_text(&self, text: &str) {
        *self.text.borrow_mut() = text.to_owned();
        self.listeners.notify(&Value::from(text));
    }

    pub fn current(&self) -> String {
        self.text.borrow().clone()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Element for TextInput {
    fn as_value_holder(&self) -> Option<&dyn ValueHolder> {
        Some(self)
    }

    fn as_text_holder(&self) -> Option<&dyn TextHolder> {
        Some(self)
    }
}

impl ValueHolder for TextInput {
    fn value(&self) -> Value {
        Value::from(self.current())
    }

    fn set_value(&self, value: Value) {
        *self.text.borrow_mut() = value.to_string();
    }

    fn subscribe(&self, callback: ChangeCallback) -> Subscription {
        self.listeners.subscribe(callback)
    }
}

impl TextHolder for TextInput {
    fn text(&self) -> String {
        self.current()
    }

    fn set_text(&self, text: &str) {
        *self.text.borrow_mut() = text.to_owned();
    }
}

/// Checkbox: value capability only, carries `Bool` values.
#[derive(Default)]
pub struct CheckBox {
    checked: RefCell<Value>,
    listeners: ChangeListeners,
}

impl CheckBox {
    pub fn new(checked: bool) -> Rc<Self> {
        Rc::new(Self {
            checked: RefCell::new(Value::Bool(checked)),
            listeners: ChangeListeners::new(),
        })
    }

    pub fn click(&self) {
        let next = Value::Bool(!self.is_checked());
        *self.checked.borrow_mut() = next.clone();
        self.listeners.notify(&next);
    }

    pub fn is_checked(&self) -> bool {
        self.checked.borrow().as_bool().unwrap_or_default()
    }
}

impl Element for CheckBox {
    fn as_value_holder(&self) -> Option<&dyn ValueHolder> {
        Some(self)
    }
}

impl ValueHolder for CheckBox {
    fn value(&self) -> Value {
        self.checked.borrow().clone()
    }

    fn set_value(&self, value: Value) {
        *self.checked.borrow_mut() = value;
    }

    fn subscribe(&self, callback: ChangeCallback) -> Subscription {
        self.listeners.subscribe(callback)
    }
}

/// Read-only text display.
#[derive(Default)]
pub struct Label {
    text: RefCell<String>,
}

impl Label {
    pub fn new(text: &str) -> Rc<Self> {
        Rc::new(Self {
            text: RefCell::new(text.to_owned()),
        })
    }

    pub fn current(&self) -> String {
        self.text.borrow().clone()
    }
}

impl Element for Label {
    fn as_text_holder(&self) -> Option<&dyn TextHolder> {
        Some(self)
    }
}

impl TextHolder for Label {
    fn text(&self) -> String {
        self.current()
    }

    fn set_text(&self, text: &str) {
        *self.text.borrow_mut() = text.to_owned();
    }
}

pub type EventLog = Rc<RefCell<Vec<(String, Value, Value)>>>;

/// Record every change event of `agent` as `(property, old, new)`.
pub fn record_events(agent: &BindingAgent) -> EventLog {
    let log: EventLog = Rc::default();
    let sink = Rc::clone(&log);
    agent.add_change_handler(move |event| {
        sink.borrow_mut().push((
            event.property.clone(),
            event.old_value.clone(),
            event.new_value.clone(),
        ));
    });
    log
}
