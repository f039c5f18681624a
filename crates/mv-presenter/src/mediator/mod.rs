//! Navigation mediators
//!
//! A mediator owns the navigation session of one view-model shown through
//! one view initializer. It doubles as the [`NavigationProvider`] of the
//! navigations it performs, so dispatcher events can be matched back to the
//! callbacks created for it.

mod view;

pub use view::{CloseDecision, ShowDecision, ViewHost, ViewHostMediatorFactory, ViewLifecycleEvent, ViewNavigationMediator};

use mv_core::{MetadataContext, NavigationProvider, NavigationType, View, ViewInitializer, ViewModelRef};
use std::sync::Arc;

use crate::error::Result;
use crate::result::ChildPresenterResult;

/// Where a mediator is in its view's lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediatorState {
    Closed,
    Showing,
    Shown,
    Closing,
}

/// Mediator id: the mediator type name followed by the view initializer id
pub fn mediator_id<M: ?Sized>(initializer_id: &str) -> String {
    format!("{}/{}", std::any::type_name::<M>(), initializer_id)
}

/// Owns the show/close/restore lifecycle of one (view-model, view initializer) pair
pub trait NavigationMediator: Send + Sync {
    /// The provider identity used for every navigation this mediator performs
    fn provider(&self) -> &NavigationProvider;

    fn id(&self) -> &str {
        self.provider().id()
    }

    fn view_initializer(&self) -> &ViewInitializer;

    fn navigation_type(&self) -> &NavigationType;

    fn state(&self) -> MediatorState;

    /// The current view, if one is materialized
    fn view(&self) -> Option<View>;

    /// Show or refresh the view; `None` when the mediator cannot show right now
    fn try_show(&self, metadata: &MetadataContext) -> Result<Option<ChildPresenterResult>>;

    /// Start closing; `None` when nothing is shown
    fn try_close(&self, metadata: &MetadataContext) -> Result<Option<ChildPresenterResult>>;

    /// Re-attach a view recreated by the host; `None` when the view is not ours
    fn try_restore(&self, view: &View, metadata: &MetadataContext) -> Result<Option<ChildPresenterResult>>;
}

/// Creates mediators for the mediator presenter
pub trait NavigationMediatorFactory: Send + Sync {
    fn priority(&self) -> i32 {
        0
    }

    /// A mediator for the pair, or `None` to let the next factory try
    fn try_create(
        &self,
        view_model: &ViewModelRef,
        initializer: &ViewInitializer,
        metadata: &MetadataContext,
    ) -> Option<Arc<dyn NavigationMediator>>;

    /// Close every mediator of a view-model at once instead of one by one
    fn try_close_all(
        &self,
        _view_model: &ViewModelRef,
        _mediators: &[Arc<dyn NavigationMediator>],
        _metadata: &MetadataContext,
    ) -> Option<Vec<ChildPresenterResult>> {
        None
    }
}
