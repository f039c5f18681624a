//! Views, view initializers and the managers that resolve them

use crate::metadata::MetadataContext;
use crate::view_model::{ViewModelId, ViewModelRef};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// Platform view type descriptor
///
/// Two view types are equal when their names are; declared supertypes only
/// feed [`ViewType::is_assignable_to`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewType {
    name: String,
    /// Types this view type can be used as
    supertypes: Vec<String>,
}

impl ViewType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            supertypes: Vec::new(),
        }
    }

    /// Declare a type this view type is assignable to
    pub fn with_supertype(mut self, name: impl Into<String>) -> Self {
        self.supertypes.push(name.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a view of this type can be used where `target` is expected
    pub fn is_assignable_to(&self, target: &ViewType) -> bool {
        self.name == target.name || self.supertypes.iter().any(|s| *s == target.name)
    }
}

impl PartialEq for ViewType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ViewType {}

impl Hash for ViewType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for ViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Describes how to materialize a view for a view-model type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewInitializer {
    pub id: String,
    pub view_type: ViewType,
    pub view_model_type: String,
}

impl ViewInitializer {
    pub fn new(id: impl Into<String>, view_type: ViewType, view_model_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            view_type,
            view_model_type: view_model_type.into(),
        }
    }
}

/// A materialized view bound to a view-model
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub id: Uuid,
    pub initializer: ViewInitializer,
    pub view_model_id: ViewModelId,
}

impl View {
    pub fn new(initializer: ViewInitializer, view_model_id: ViewModelId) -> Self {
        Self {
            id: Uuid::new_v4(),
            initializer,
            view_model_id,
        }
    }
}

/// Resolves candidate views for a view-model
pub trait ViewManager: Send + Sync {
    /// Candidate initializers in preference order
    fn initializers_for(&self, view_model: &ViewModelRef, metadata: &MetadataContext) -> Vec<ViewInitializer>;
}

/// Decides whether one view type can be wrapped into another
pub trait WrapperManager: Send + Sync {
    fn can_wrap(&self, source: &ViewType, target: &ViewType, metadata: &MetadataContext) -> bool;
}

/// [`ViewManager`] backed by a list of initializers keyed by view-model type
#[derive(Default)]
pub struct ViewMappingRegistry {
    mappings: RwLock<Vec<ViewInitializer>>,
}

impl ViewMappingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mapping; later mappings for the same view-model type rank after earlier ones
    pub fn add_mapping(&self, initializer: ViewInitializer) {
        tracing::debug!(
            "Mapping view-model '{}' to view '{}' ({})",
            initializer.view_model_type,
            initializer.view_type,
            initializer.id
        );
        self.mappings.write().push(initializer);
    }

    /// Remove a mapping by initializer id
    pub fn remove_mapping(&self, initializer_id: &str) -> bool {
        let mut mappings = self.mappings.write();
        let before = mappings.len();
        mappings.retain(|m| m.id != initializer_id);
        mappings.len() != before
    }
}

impl ViewManager for ViewMappingRegistry {
    fn initializers_for(&self, view_model: &ViewModelRef, _metadata: &MetadataContext) -> Vec<ViewInitializer> {
        self.mappings
            .read()
            .iter()
            .filter(|m| m.view_model_type == view_model.type_name())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view_model::ViewModelBase;

    #[test]
    fn test_assignability() {
        let window = ViewType::new("Window");
        let dialog = ViewType::new("Dialog").with_supertype("Window");

        assert!(dialog.is_assignable_to(&window));
        assert!(dialog.is_assignable_to(&dialog));
        assert!(!window.is_assignable_to(&dialog));
    }

    #[test]
    fn test_equality_ignores_supertypes() {
        let bare = ViewType::new("Dialog");
        let declared = ViewType::new("Dialog").with_supertype("Window");
        assert_eq!(bare, declared);
        assert_ne!(bare, ViewType::new("Window"));

        let set: ahash::AHashSet<ViewType> = [bare, declared].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_mapping_registry() {
        let registry = ViewMappingRegistry::new();
        registry.add_mapping(ViewInitializer::new("main", ViewType::new("MainPage"), "MainViewModel"));
        registry.add_mapping(ViewInitializer::new("alt", ViewType::new("AltPage"), "MainViewModel"));
        registry.add_mapping(ViewInitializer::new("other", ViewType::new("OtherPage"), "OtherViewModel"));

        let vm = ViewModelBase::new("MainViewModel").into_ref();
        let ids: Vec<_> = registry
            .initializers_for(&vm, &MetadataContext::new())
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, vec!["main", "alt"]);

        assert!(registry.remove_mapping("main"));
        assert!(!registry.remove_mapping("main"));
        assert_eq!(registry.initializers_for(&vm, &MetadataContext::new()).len(), 1);
    }
}
