//! Metadata keys the presenter stores on view-models and results

use mv_core::{MetadataContext, MetadataKey, NavigationCallback, NavigationCallbackType, ViewModelRef};
use parking_lot::Mutex;
use std::sync::Arc;

use crate::mediator::NavigationMediator;
use crate::result::ChildPresenterResult;

/// Pending callbacks of one kind for one view-model
pub type CallbackList = Arc<Mutex<Vec<Arc<NavigationCallback>>>>;

/// Mediators cached for one view-model
pub type MediatorList = Arc<Mutex<Vec<Arc<dyn NavigationMediator>>>>;

/// The single window mediator of a view-model
pub type MediatorSlot = Arc<Mutex<Option<Arc<dyn NavigationMediator>>>>;

/// Externally supplied close logic for a view-model
pub type CloseHandler = Arc<dyn Fn(&ViewModelRef, &MetadataContext) -> Option<ChildPresenterResult> + Send + Sync>;

/// Marks a presenter result whose close callback may outlive the process
pub const IS_RESTORABLE_CALLBACK: MetadataKey<bool> =
    MetadataKey::with_default("presenter.is_restorable_callback", || false);

pub const SHOWING_CALLBACKS: MetadataKey<CallbackList> = MetadataKey::new("presenter.showing_callbacks");
pub const CLOSING_CALLBACKS: MetadataKey<CallbackList> = MetadataKey::new("presenter.closing_callbacks");
pub const CLOSE_CALLBACKS: MetadataKey<CallbackList> = MetadataKey::new("presenter.close_callbacks");

pub const NAVIGATION_MEDIATORS: MetadataKey<MediatorList> = MetadataKey::new("presenter.navigation_mediators");
pub const WINDOW_MEDIATOR: MetadataKey<MediatorSlot> = MetadataKey::new("presenter.window_mediator");
pub const CLOSE_HANDLER: MetadataKey<CloseHandler> = MetadataKey::new("presenter.close_handler");

/// The list key holding callbacks of the given type
pub fn callback_key(callback_type: NavigationCallbackType) -> &'static MetadataKey<CallbackList> {
    match callback_type {
        NavigationCallbackType::Showing => &SHOWING_CALLBACKS,
        NavigationCallbackType::Closing => &CLOSING_CALLBACKS,
        NavigationCallbackType::Close => &CLOSE_CALLBACKS,
    }
}

/// Install a close handler on a view-model
pub fn set_close_handler<F>(view_model: &ViewModelRef, handler: F)
where
    F: Fn(&ViewModelRef, &MetadataContext) -> Option<ChildPresenterResult> + Send + Sync + 'static,
{
    let handler: CloseHandler = Arc::new(handler);
    view_model.metadata().set(&CLOSE_HANDLER, handler);
}
