//! View-model abstraction consumed by the presenter core

use crate::metadata::MetadataContext;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// View-model identifier type
pub type ViewModelId = Uuid;

/// Shared handle to a view-model
pub type ViewModelRef = Arc<dyn ViewModel>;

/// Anything that can be presented
///
/// The presenter keeps all of its per-view-model state (mediators, pending
/// callbacks, close handler) in the view-model's metadata.
pub trait ViewModel: Send + Sync + 'static {
    /// Stable identity of this view-model
    fn id(&self) -> ViewModelId;

    /// Type name used to look up view mappings
    fn type_name(&self) -> &str;

    /// Metadata attached to this view-model
    fn metadata(&self) -> &MetadataContext;
}

impl fmt::Debug for dyn ViewModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.type_name(), self.id())
    }
}

/// Minimal view-model carrying only identity and metadata
pub struct ViewModelBase {
    id: ViewModelId,
    type_name: String,
    metadata: MetadataContext,
}

impl ViewModelBase {
    /// Create a view-model of the given type name with a fresh id
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            type_name: type_name.into(),
            metadata: MetadataContext::new(),
        }
    }

    /// Wrap into a shared handle
    pub fn into_ref(self) -> ViewModelRef {
        Arc::new(self)
    }
}

impl ViewModel for ViewModelBase {
    fn id(&self) -> ViewModelId {
        self.id
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn metadata(&self) -> &MetadataContext {
        &self.metadata
    }
}
