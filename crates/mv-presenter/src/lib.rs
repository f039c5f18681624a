//! View-model presenter and navigation callback coordination
//!
//! The [`ViewModelPresenter`] shows, closes and restores view-models by
//! delegating to priority-ordered [`ChildPresenter`]s. Every result it hands
//! out carries [`NavigationCallback`]s that complete once the navigation
//! dispatcher reports how the navigation ended.
//!
//! [`NavigationCallback`]: mv_core::NavigationCallback

pub mod callback;
pub mod child;
pub mod error;
pub mod keys;
pub mod mediator;
pub mod presenter;
pub mod result;
pub mod settings;

#[cfg(test)]
mod testing;

pub use callback::{NavigationCallbackListener, PresenterCallbackManager, SuspendableDispatcherListener};
pub use child::{
    ChildPresenter, CloseHandlerPresenter, NavigationMediatorPresenter, RestorableChildPresenter, WindowPresenter,
};
pub use error::{PresenterError, Result};
pub use mediator::{
    MediatorState, NavigationMediator, NavigationMediatorFactory, ViewHost, ViewHostMediatorFactory,
    ViewNavigationMediator,
};
pub use presenter::{
    ChildPresenterChangedListener, ConditionPresenterListener, PresenterListener, PresenterResultListener,
    ViewModelPresenter,
};
pub use result::{
    ChildPresenterResult, CloseOutput, ClosingPresenterResult, RestorationPresenterResult, ShowOutput,
    ViewModelPresenterResult,
};
pub use settings::PresenterSettings;

use mv_core::{NavigationDispatcher, ViewManager};
use std::sync::Arc;

/// A wired presenter together with the pieces callers usually extend
pub struct PresenterBundle {
    pub presenter: Arc<ViewModelPresenter>,
    /// Add [`NavigationMediatorFactory`]s here to make view types presentable
    pub mediator_presenter: Arc<NavigationMediatorPresenter>,
}

/// Build a presenter with the mediator and close-handler presenters
///
/// The callback manager and the mediator presenter are registered with
/// `dispatcher`, which only keeps weak references: keep the bundle alive
/// for as long as navigation should be tracked.
pub fn default_presenter(
    dispatcher: &NavigationDispatcher,
    view_manager: Arc<dyn ViewManager>,
    settings: &PresenterSettings,
) -> PresenterBundle {
    let callback_manager = Arc::new(PresenterCallbackManager::new(settings));
    callback_manager.attach(dispatcher);

    let mediator_presenter = Arc::new(NavigationMediatorPresenter::new(
        view_manager,
        settings.mediator_presenter_priority,
    ));
    dispatcher.add_listener(mediator_presenter.clone());

    let presenter = Arc::new(ViewModelPresenter::new(callback_manager));
    presenter.add_presenter(mediator_presenter.clone());
    presenter.add_presenter(Arc::new(CloseHandlerPresenter::new(
        settings.close_handler_presenter_priority,
    )));

    tracing::info!("Presenter ready with {} child presenters", presenter.presenters().len());
    PresenterBundle {
        presenter,
        mediator_presenter,
    }
}
