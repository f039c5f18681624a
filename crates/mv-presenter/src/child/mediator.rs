use mv_core::metadata::keys::{VIEW, VIEW_MODEL};
use mv_core::{
    MetadataContext, NavigationContext, NavigationDispatcherListener, ViewInitializer, ViewManager, ViewModelRef,
};
use parking_lot::RwLock;
use std::sync::Arc;

use super::{request_view_model, ChildPresenter, RestorableChildPresenter};
use crate::error::{PresenterError, Result};
use crate::keys::{MediatorList, NAVIGATION_MEDIATORS};
use crate::mediator::{NavigationMediator, NavigationMediatorFactory};
use crate::result::{ChildPresenterResult, CloseOutput, ShowOutput};
use crate::settings::MEDIATOR_PRESENTER_PRIORITY;

/// General purpose child presenter backed by navigation mediators
///
/// Mediators are cached per view-model under [`NAVIGATION_MEDIATORS`], one
/// per view initializer, and reused by later show/close/restore requests.
/// Register the presenter with the navigation dispatcher so closed
/// mediators are dropped from the cache.
pub struct NavigationMediatorPresenter {
    view_manager: Arc<dyn ViewManager>,
    factories: RwLock<Vec<Arc<dyn NavigationMediatorFactory>>>,
    priority: i32,
}

impl NavigationMediatorPresenter {
    pub fn new(view_manager: Arc<dyn ViewManager>, priority: i32) -> Self {
        Self {
            view_manager,
            factories: RwLock::new(Vec::new()),
            priority,
        }
    }

    pub fn with_default_priority(view_manager: Arc<dyn ViewManager>) -> Self {
        Self::new(view_manager, MEDIATOR_PRESENTER_PRIORITY)
    }

    /// Add a mediator factory; factories are tried by descending priority
    pub fn add_factory(&self, factory: Arc<dyn NavigationMediatorFactory>) {
        let mut factories = self.factories.write();
        let index = factories
            .iter()
            .position(|f| f.priority() < factory.priority())
            .unwrap_or(factories.len());
        factories.insert(index, factory);
    }

    pub fn remove_factory(&self, factory: &Arc<dyn NavigationMediatorFactory>) -> bool {
        let mut factories = self.factories.write();
        let before = factories.len();
        factories.retain(|f| !Arc::ptr_eq(f, factory));
        factories.len() != before
    }

    /// Mediators currently cached for `view_model`
    pub fn mediators(&self, view_model: &ViewModelRef) -> Vec<Arc<dyn NavigationMediator>> {
        view_model
            .metadata()
            .get(&NAVIGATION_MEDIATORS)
            .map(|list| list.lock().clone())
            .unwrap_or_default()
    }

    fn get_or_create(
        &self,
        view_model: &ViewModelRef,
        initializer: &ViewInitializer,
        metadata: &MetadataContext,
    ) -> Option<Arc<dyn NavigationMediator>> {
        let list = view_model
            .metadata()
            .get_or_add(&NAVIGATION_MEDIATORS, MediatorList::default);
        let mut mediators = list.lock();
        if let Some(mediator) = mediators
            .iter()
            .find(|mediator| mediator.view_initializer().id == initializer.id)
        {
            return Some(mediator.clone());
        }

        let factories = self.factories.read().clone();
        for factory in factories {
            if let Some(mediator) = factory.try_create(view_model, initializer, metadata) {
                tracing::debug!("Created mediator '{}' for {:?}", mediator.id(), view_model);
                mediators.push(mediator.clone());
                return Some(mediator);
            }
        }

        tracing::trace!("No factory accepted initializer '{}'", initializer.id);
        None
    }
}

impl ChildPresenter for NavigationMediatorPresenter {
    fn name(&self) -> &str {
        "navigation-mediator"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn try_show(&self, metadata: &MetadataContext) -> Result<Option<ShowOutput>> {
        let Some(view_model) = request_view_model(metadata) else {
            return Ok(None);
        };

        for initializer in self.view_manager.initializers_for(&view_model, metadata) {
            let Some(mediator) = self.get_or_create(&view_model, &initializer, metadata) else {
                continue;
            };
            if let Some(result) = mediator.try_show(metadata)? {
                return Ok(Some(result.with_presenter(self.name()).into()));
            }
        }
        Ok(None)
    }

    fn try_close(&self, metadata: &MetadataContext) -> Result<Vec<CloseOutput>> {
        let Some(view_model) = request_view_model(metadata) else {
            return Ok(Vec::new());
        };
        let mediators = self.mediators(&view_model);
        if mediators.is_empty() {
            return Ok(Vec::new());
        }

        let factories = self.factories.read().clone();
        for factory in factories {
            if let Some(results) = factory.try_close_all(&view_model, &mediators, metadata) {
                tracing::debug!("Closed {} mediators of {:?} as one batch", mediators.len(), view_model);
                return Ok(results
                    .into_iter()
                    .map(|result| result.with_presenter(self.name()).into())
                    .collect());
            }
        }

        let mut outputs = Vec::new();
        for mediator in mediators {
            if let Some(result) = mediator.try_close(metadata)? {
                outputs.push(result.with_presenter(self.name()).into());
            }
        }
        Ok(outputs)
    }

    fn as_restorable(&self) -> Option<&dyn RestorableChildPresenter> {
        Some(self)
    }
}

impl RestorableChildPresenter for NavigationMediatorPresenter {
    fn try_restore(&self, metadata: &MetadataContext) -> Result<Option<ChildPresenterResult>> {
        let Some(view) = metadata.get(&VIEW) else {
            return Ok(None);
        };
        let view_model = request_view_model(metadata).ok_or(PresenterError::MissingMetadata {
            key: VIEW_MODEL.name(),
        })?;

        let Some(mediator) = self.get_or_create(&view_model, &view.initializer, metadata) else {
            return Ok(None);
        };
        Ok(mediator
            .try_restore(&view, metadata)?
            .map(|result| result.with_presenter(self.name())))
    }
}

impl NavigationDispatcherListener for NavigationMediatorPresenter {
    fn on_navigated(&self, context: &NavigationContext) {
        if !context.mode.is_close() {
            return;
        }
        let Some(list) = context.target.metadata().get(&NAVIGATION_MEDIATORS) else {
            return;
        };

        let mut mediators = list.lock();
        let before = mediators.len();
        mediators.retain(|mediator| mediator.id() != context.provider.id());
        if mediators.len() != before {
            tracing::debug!("Dropped closed mediator '{}'", context.provider);
        }
    }
}
