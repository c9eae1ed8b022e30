#![forbid(unsafe_code)]

//! Per-model-type property catalog.
//!
//! A [`PropertyCatalog`] lists the properties of one [`ModelType`] with their
//! declared types and whether each one is itself bindable (and therefore
//! usable as the root of a property chain).
//!
//! Catalogs live in a process-wide registry keyed by model type name. Each
//! catalog is computed on first use and never changes afterwards, so every
//! agent binding the same type shares one `Arc<PropertyCatalog>`.
//!
//! # Invariants
//!
//! 1. A catalog is computed at most once per type name; concurrent first
//!    lookups are serialized, later lookups take no lock.
//! 2. Iteration follows declaration order.
//! 3. `bindable` is true exactly for properties declared as nested models.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Duplicate property name | Bad `properties` fn | First declaration wins, warning logged |
//! | Two types share a name | Bad `ModelType` statics | First registered catalog is used |
//! | Poisoned init lock | Panic in a `properties` fn | Lock recovered, lookup continues |

use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use ahash::AHashMap;
use arc_swap::ArcSwap;

use crate::model::ModelType;

/// Declared type of a model property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaredType {
    Bool,
    Int,
    Float,
    Text,
    /// A nested bindable model.
    Model(&'static ModelType),
    /// Any other type, identified by name. Never bindable.
    Opaque(&'static str),
}

impl DeclaredType {
    #[must_use]
    pub fn is_bindable(self) -> bool {
        matches!(self, Self::Model(_))
    }

    /// The nested model type, for bindable properties.
    #[must_use]
    pub fn model_type(self) -> Option<&'static ModelType> {
        match self {
            Self::Model(ty) => Some(ty),
            _ => None,
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Text => f.write_str("text"),
            Self::Model(ty) => f.write_str(ty.name),
            Self::Opaque(name) => f.write_str(name),
        }
    }
}

/// Name, declared type and bindability of one property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyType {
    name: String,
    declared_type: DeclaredType,
    bindable: bool,
}

impl PropertyType {
    #[must_use]
    pub fn new(name: impl Into<String>, declared_type: DeclaredType) -> Self {
        Self {
            name: name.into(),
            declared_type,
            bindable: declared_type.is_bindable(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn declared_type(&self) -> DeclaredType {
        self.declared_type
    }

    #[must_use]
    pub fn is_bindable(&self) -> bool {
        self.bindable
    }
}

/// Immutable property map of one model type.
#[derive(Debug, Clone)]
pub struct PropertyCatalog {
    model: &'static str,
    properties: Vec<PropertyType>,
    index: AHashMap<String, usize>,
}

impl PropertyCatalog {
    /// Build a catalog from declared properties.
    #[must_use]
    pub fn new(model: &'static str, declared: Vec<PropertyType>) -> Self {
        let mut properties = Vec::with_capacity(declared.len());
        let mut index = AHashMap::with_capacity(declared.len());
        for property in declared {
            if index.contains_key(property.name()) {
                tracing::warn!(
                    model,
                    property = property.name(),
                    "duplicate property declaration ignored"
                );
                continue;
            }
            index.insert(property.name().to_owned(), properties.len());
            properties.push(property);
        }
        Self {
            model,
            properties,
            index,
        }
    }

    /// Name of the model type this catalog describes.
    #[must_use]
    pub fn model(&self) -> &'static str {
        self.model
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropertyType> {
        self.index.get(name).map(|&i| &self.properties[i])
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Properties in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &PropertyType> {
        self.properties.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

type CatalogMap = AHashMap<&'static str, Arc<PropertyCatalog>>;

struct CatalogRegistry {
    entries: ArcSwap<CatalogMap>,
    init: Mutex<()>,
}

impl CatalogRegistry {
    fn new() -> Self {
        Self {
            entries: ArcSwap::from_pointee(CatalogMap::default()),
            init: Mutex::new(()),
        }
    }

    fn lookup(&self, model_type: &'static ModelType) -> Arc<PropertyCatalog> {
        if let Some(catalog) = self.entries.load().get(model_type.name) {
            return Arc::clone(catalog);
        }

        let _guard = self.init.lock().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have finished while we waited.
        if let Some(catalog) = self.entries.load().get(model_type.name) {
            return Arc::clone(catalog);
        }

        let catalog = Arc::new(PropertyCatalog::new(
            model_type.name,
            (model_type.properties)(),
        ));
        let mut next = CatalogMap::clone(&self.entries.load());
        next.insert(model_type.name, Arc::clone(&catalog));
        self.entries.store(Arc::new(next));
        tracing::debug!(
            model = model_type.name,
            properties = catalog.len(),
            "property catalog computed"
        );
        catalog
    }
}

static REGISTRY: OnceLock<CatalogRegistry> = OnceLock::new();

fn registry() -> &'static CatalogRegistry {
    REGISTRY.get_or_init(CatalogRegistry::new)
}

/// The shared catalog for `model_type`, computing it on first use.
#[must_use]
pub fn catalog_for(model_type: &'static ModelType) -> Arc<PropertyCatalog> {
    registry().lookup(model_type)
}
