use mv_core::metadata::keys::{VIEW, VIEW_MODEL};
use mv_core::{
    ActionToken, MetadataContext, NavigationContext, NavigationDispatcherListener, ViewInitializer, ViewManager,
    ViewModelRef, ViewType, WrapperManager,
};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::{request_view_model, ChildPresenter, RestorableChildPresenter};
use crate::error::{PresenterError, Result};
use crate::keys::{MediatorSlot, WINDOW_MEDIATOR};
use crate::mediator::NavigationMediator;
use crate::result::{ChildPresenterResult, CloseOutput, ShowOutput};

/// Builds the window mediator for a matched initializer
pub type WindowMediatorFactory =
    Arc<dyn Fn(&ViewModelRef, &ViewInitializer, &MetadataContext) -> Option<Arc<dyn NavigationMediator>> + Send + Sync>;

#[derive(Clone)]
struct Registration {
    id: u64,
    view_type: ViewType,
    exact: bool,
    priority: i32,
    factory: WindowMediatorFactory,
}

/// Child presenter for window-style views
///
/// A view-model has at most one window mediator, kept in the
/// [`WINDOW_MEDIATOR`] slot of its metadata.
pub struct WindowPresenter {
    view_manager: Arc<dyn ViewManager>,
    wrapper_manager: Option<Arc<dyn WrapperManager>>,
    registrations: Arc<RwLock<Vec<Registration>>>,
    next_id: AtomicU64,
    priority: i32,
}

impl WindowPresenter {
    pub fn new(view_manager: Arc<dyn ViewManager>, priority: i32) -> Self {
        Self {
            view_manager,
            wrapper_manager: None,
            registrations: Arc::new(RwLock::new(Vec::new())),
            next_id: AtomicU64::new(1),
            priority,
        }
    }

    pub fn with_wrapper_manager(mut self, wrapper_manager: Arc<dyn WrapperManager>) -> Self {
        self.wrapper_manager = Some(wrapper_manager);
        self
    }

    /// Register a mediator factory for `view_type`
    ///
    /// An `exact` registration only matches that very view type; otherwise
    /// subtypes and wrappable types match too. Disposing the returned token
    /// removes the registration.
    pub fn register<F>(&self, view_type: ViewType, exact: bool, priority: i32, factory: F) -> ActionToken
    where
        F: Fn(&ViewModelRef, &ViewInitializer, &MetadataContext) -> Option<Arc<dyn NavigationMediator>>
            + Send
            + Sync
            + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        {
            let mut registrations = self.registrations.write();
            let index = registrations
                .iter()
                .position(|r| r.priority < priority)
                .unwrap_or(registrations.len());
            tracing::debug!("Registered window mediator factory for {}", view_type);
            registrations.insert(
                index,
                Registration {
                    id,
                    view_type,
                    exact,
                    priority,
                    factory: Arc::new(factory),
                },
            );
        }

        let registrations = Arc::downgrade(&self.registrations);
        ActionToken::new(move || {
            if let Some(registrations) = registrations.upgrade() {
                registrations.write().retain(|r| r.id != id);
            }
        })
    }

    pub fn registration_count(&self) -> usize {
        self.registrations.read().len()
    }

    /// The window mediator currently attached to `view_model`
    pub fn mediator(&self, view_model: &ViewModelRef) -> Option<Arc<dyn NavigationMediator>> {
        view_model
            .metadata()
            .get(&WINDOW_MEDIATOR)
            .and_then(|slot| slot.lock().clone())
    }

    fn matches(&self, registration: &Registration, initializer: &ViewInitializer, metadata: &MetadataContext) -> bool {
        if initializer.view_type.name() == registration.view_type.name() {
            return true;
        }
        if registration.exact {
            return false;
        }
        initializer.view_type.is_assignable_to(&registration.view_type)
            || self
                .wrapper_manager
                .as_ref()
                .map(|w| w.can_wrap(&initializer.view_type, &registration.view_type, metadata))
                .unwrap_or(false)
    }

    fn create(
        &self,
        view_model: &ViewModelRef,
        initializer: &ViewInitializer,
        metadata: &MetadataContext,
    ) -> Option<Arc<dyn NavigationMediator>> {
        let registrations = self.registrations.read().clone();
        registrations
            .iter()
            .filter(|registration| self.matches(registration, initializer, metadata))
            .find_map(|registration| (registration.factory)(view_model, initializer, metadata))
    }

    /// Cached mediator, or a new one for the first initializer a registration accepts
    fn get_or_create(
        &self,
        view_model: &ViewModelRef,
        initializers: &[ViewInitializer],
        metadata: &MetadataContext,
    ) -> Option<Arc<dyn NavigationMediator>> {
        if let Some(mediator) = self.mediator(view_model) {
            return Some(mediator);
        }

        let mediator = initializers
            .iter()
            .find_map(|initializer| self.create(view_model, initializer, metadata))?;

        // only a view-model that got a mediator carries the slot
        let slot = view_model.metadata().get_or_add(&WINDOW_MEDIATOR, MediatorSlot::default);
        let mut slot = slot.lock();
        if let Some(existing) = slot.as_ref() {
            return Some(existing.clone());
        }
        tracing::debug!("Created window mediator '{}' for {:?}", mediator.id(), view_model);
        *slot = Some(mediator.clone());
        Some(mediator)
    }
}

impl ChildPresenter for WindowPresenter {
    fn name(&self) -> &str {
        "window"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn try_show(&self, metadata: &MetadataContext) -> Result<Option<ShowOutput>> {
        let Some(view_model) = request_view_model(metadata) else {
            return Ok(None);
        };

        let initializers = self.view_manager.initializers_for(&view_model, metadata);
        let Some(mediator) = self.get_or_create(&view_model, &initializers, metadata) else {
            return Ok(None);
        };
        Ok(mediator
            .try_show(metadata)?
            .map(|result| result.with_presenter(self.name()).into()))
    }

    fn try_close(&self, metadata: &MetadataContext) -> Result<Vec<CloseOutput>> {
        let Some(view_model) = request_view_model(metadata) else {
            return Ok(Vec::new());
        };
        let Some(mediator) = self.mediator(&view_model) else {
            return Ok(Vec::new());
        };
        Ok(mediator
            .try_close(metadata)?
            .map(|result| CloseOutput::from(result.with_presenter(self.name())))
            .into_iter()
            .collect())
    }

    fn as_restorable(&self) -> Option<&dyn RestorableChildPresenter> {
        Some(self)
    }
}

impl RestorableChildPresenter for WindowPresenter {
    fn try_restore(&self, metadata: &MetadataContext) -> Result<Option<ChildPresenterResult>> {
        let Some(view) = metadata.get(&VIEW) else {
            return Ok(None);
        };
        let view_model = request_view_model(metadata).ok_or(PresenterError::MissingMetadata {
            key: VIEW_MODEL.name(),
        })?;

        let initializers = [view.initializer.clone()];
        let Some(mediator) = self.get_or_create(&view_model, &initializers, metadata) else {
            return Ok(None);
        };
        Ok(mediator
            .try_restore(&view, metadata)?
            .map(|result| result.with_presenter(self.name())))
    }
}

impl NavigationDispatcherListener for WindowPresenter {
    fn on_navigated(&self, context: &NavigationContext) {
        if !context.mode.is_close() {
            return;
        }
        let Some(slot) = context.target.metadata().get(&WINDOW_MEDIATOR) else {
            return;
        };

        let mut slot = slot.lock();
        if slot.as_ref().is_some_and(|mediator| mediator.id() == context.provider.id()) {
            tracing::debug!("Cleared closed window mediator '{}'", context.provider);
            *slot = None;
        }
    }
}
