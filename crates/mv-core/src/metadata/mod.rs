//! Typed metadata storage attached to view-models and requests
//!
//! A [`MetadataContext`] maps typed [`MetadataKey`]s to values. Keys are
//! plain constants; each key may carry a default-value strategy that is used
//! when nothing was stored under it.

pub mod keys;

use ahash::AHashMap;
use parking_lot::RwLock;
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// A typed key into a [`MetadataContext`]
pub struct MetadataKey<T> {
    name: &'static str,
    default: Option<fn() -> T>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> MetadataKey<T> {
    /// Create a key without a default value
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            default: None,
            _marker: PhantomData,
        }
    }

    /// Create a key whose lookups fall back to `default` when no value is stored
    pub const fn with_default(name: &'static str, default: fn() -> T) -> Self {
        Self {
            name,
            default: Some(default),
            _marker: PhantomData,
        }
    }

    /// The key name, unique within a context
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Resolve the default value for this key, if it has one
    pub fn default_value(&self) -> Option<T> {
        self.default.map(|default| default())
    }
}

impl<T> Clone for MetadataKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for MetadataKey<T> {}

impl<T> fmt::Debug for MetadataKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MetadataKey({})", self.name)
    }
}

#[derive(Clone)]
struct StoredValue {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl StoredValue {
    fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    fn downcast<T: Clone + 'static>(&self, key: &'static str) -> Option<T> {
        let value = self.value.downcast_ref::<T>().cloned();
        if value.is_none() {
            tracing::warn!(
                "Metadata key '{}' holds a {} but a {} was requested",
                key,
                self.type_name,
                std::any::type_name::<T>()
            );
        }
        value
    }
}

/// Thread-safe typed key-value store
///
/// Cloning a context takes a snapshot: the clone shares stored values but
/// later writes to either side are not visible to the other.
#[derive(Default)]
pub struct MetadataContext {
    values: RwLock<AHashMap<&'static str, StoredValue>>,
}

impl MetadataContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style set, handy for request metadata
    pub fn with<T>(self, key: &MetadataKey<T>, value: T) -> Self
    where
        T: Send + Sync + 'static,
    {
        self.set(key, value);
        self
    }

    /// Get the stored value, falling back to the key's default
    pub fn get<T>(&self, key: &MetadataKey<T>) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let stored = self.values.read().get(key.name).cloned();
        match stored {
            Some(stored) => stored
                .downcast::<T>(key.name)
                .or_else(|| key.default_value()),
            None => key.default_value(),
        }
    }

    /// Whether a value is explicitly stored under the key
    pub fn contains<T>(&self, key: &MetadataKey<T>) -> bool {
        self.values.read().contains_key(key.name)
    }

    /// Store a value, replacing any previous one
    pub fn set<T>(&self, key: &MetadataKey<T>, value: T)
    where
        T: Send + Sync + 'static,
    {
        self.values.write().insert(key.name, StoredValue::new(value));
    }

    /// Get the stored value or store the one produced by `factory`
    ///
    /// The lookup and the insert happen under one write lock, so concurrent
    /// callers all observe the same value and `factory` runs at most once.
    pub fn get_or_add<T, F>(&self, key: &MetadataKey<T>, factory: F) -> T
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        if let Some(value) = self
            .values
            .read()
            .get(key.name)
            .and_then(|stored| stored.value.downcast_ref::<T>().cloned())
        {
            return value;
        }

        let mut values = self.values.write();
        if let Some(value) = values
            .get(key.name)
            .and_then(|stored| stored.value.downcast_ref::<T>().cloned())
        {
            return value;
        }

        let value = factory();
        values.insert(key.name, StoredValue::new(value.clone()));
        value
    }

    /// Remove the value stored under the key
    pub fn remove<T>(&self, key: &MetadataKey<T>) -> bool {
        self.values.write().remove(key.name).is_some()
    }

    /// Copy every entry of `other` into this context, overwriting on conflict
    pub fn merge(&self, other: &MetadataContext) {
        let incoming: Vec<_> = other
            .values
            .read()
            .iter()
            .map(|(name, value)| (*name, value.clone()))
            .collect();

        let mut values = self.values.write();
        for (name, value) in incoming {
            values.insert(name, value);
        }
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }

    /// Human-readable listing of keys and value types, sorted by key
    pub fn dump(&self) -> String {
        let values = self.values.read();
        let mut entries: Vec<_> = values
            .iter()
            .map(|(name, value)| format!("{}: {}", name, value.type_name))
            .collect();
        entries.sort();
        format!("{{{}}}", entries.join(", "))
    }
}

impl Clone for MetadataContext {
    fn clone(&self) -> Self {
        Self {
            values: RwLock::new(self.values.read().clone()),
        }
    }
}

impl fmt::Debug for MetadataContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MetadataContext{}", self.dump())
    }
}
