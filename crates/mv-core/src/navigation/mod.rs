use serde::{Serialize, Deserialize};
use std::fmt;
use std::sync::Arc;

use crate::metadata::MetadataContext;
use crate::view_model::ViewModelRef;

mod callback;
mod dispatcher;
mod journal;
mod listener;

pub use callback::{CallbackOutcome, NavigationCallback, NavigationCallbackType};
pub use dispatcher::NavigationDispatcher;
pub use journal::{NavigationCallbackProvider, NavigationEntry, NavigationJournal};
pub use listener::NavigationDispatcherListener;

/// Error raised by the navigation machinery outside the presenter core.
///
/// Shared so every callback awaiting the same navigation observes one fault.
pub type NavigationFault = Arc<anyhow::Error>;

/// Kind of surface a view-model is navigated to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NavigationType {
    Page,
    Window,
    Popup,
    Tab,
    Background,
    Custom(String),
}

impl fmt::Display for NavigationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationType::Custom(name) => f.write_str(name),
            other => write!(f, "{:?}", other),
        }
    }
}

/// Direction of a navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NavigationMode {
    /// First presentation of a view-model
    New,
    /// An already shown view-model brought back to front
    Refresh,
    /// Returning to a previous view-model
    Back,
    /// A view re-attached after the host recreated it
    Restore,
    /// Dismissal of a view-model
    Close,
}

impl NavigationMode {
    pub fn is_new(&self) -> bool {
        matches!(self, NavigationMode::New)
    }

    pub fn is_close(&self) -> bool {
        matches!(self, NavigationMode::Close)
    }
}

/// Identity of whatever performed a navigation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NavigationProvider {
    id: String,
}

impl NavigationProvider {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for NavigationProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Context passed to dispatcher listeners for every navigation event
#[derive(Clone)]
pub struct NavigationContext {
    pub target: ViewModelRef,
    pub provider: NavigationProvider,
    pub navigation_id: String,
    pub navigation_type: NavigationType,
    pub mode: NavigationMode,
    pub metadata: Arc<MetadataContext>,
}

impl NavigationContext {
    pub fn new(
        target: ViewModelRef,
        provider: NavigationProvider,
        navigation_type: NavigationType,
        mode: NavigationMode,
    ) -> Self {
        Self {
            target,
            provider,
            navigation_id: uuid::Uuid::new_v4().to_string(),
            navigation_type,
            mode,
            metadata: Arc::new(MetadataContext::new()),
        }
    }

    pub fn with_metadata(mut self, metadata: MetadataContext) -> Self {
        self.metadata = Arc::new(metadata);
        self
    }
}

impl fmt::Debug for NavigationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationContext")
            .field("target", &self.target)
            .field("provider", &self.provider.id())
            .field("navigation_id", &self.navigation_id)
            .field("navigation_type", &self.navigation_type)
            .field("mode", &self.mode)
            .finish()
    }
}
