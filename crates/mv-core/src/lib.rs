//! Core contracts for the MVVM navigation presenter
//!
//! This crate provides the abstractions the presenter consumes: typed
//! metadata, view-models, views and view managers, and the navigation
//! dispatcher with its journal and awaitable callbacks.

pub mod error;
pub mod metadata;
pub mod navigation;
pub mod token;
pub mod view;
pub mod view_model;

// Re-export commonly used types
pub use error::NavigationError;
pub use metadata::{MetadataContext, MetadataKey};
pub use navigation::{
    CallbackOutcome, NavigationCallback, NavigationCallbackProvider, NavigationCallbackType,
    NavigationContext, NavigationDispatcher, NavigationDispatcherListener, NavigationEntry,
    NavigationFault, NavigationJournal, NavigationMode, NavigationProvider, NavigationType,
};
pub use token::ActionToken;
pub use view::{View, ViewInitializer, ViewManager, ViewMappingRegistry, ViewType, WrapperManager};
pub use view_model::{ViewModel, ViewModelBase, ViewModelId, ViewModelRef};
