//! Callback bookkeeping for presenter results
//!
//! The [`PresenterCallbackManager`] creates a [`NavigationCallback`] for every
//! presenter result and resolves it when the navigation dispatcher reports
//! the matching navigation. Dispatcher events are held back while a
//! presenter operation is running so callbacks are never resolved before
//! they are registered.
//!
//! [`NavigationCallback`]: mv_core::NavigationCallback

mod manager;
mod suspend;

pub use manager::{NavigationCallbackListener, PresenterCallbackManager};
pub use suspend::SuspendableDispatcherListener;

use mv_core::NavigationFault;

/// Dispatcher event kinds the callback manager reacts to
#[derive(Debug, Clone)]
pub(crate) enum DispatcherEvent {
    Navigated,
    NavigationFailed(NavigationFault),
    NavigationCanceled,
    NavigatingCanceled,
}
