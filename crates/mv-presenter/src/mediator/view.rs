use mv_core::metadata::keys::NAVIGATION_TYPE;
use mv_core::{
    MetadataContext, NavigationContext, NavigationDispatcher, NavigationFault, NavigationMode, NavigationProvider,
    NavigationType, View, ViewInitializer, ViewModel, ViewModelRef, ViewType,
};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

use super::{mediator_id, MediatorState, NavigationMediator, NavigationMediatorFactory};
use crate::error::Result;
use crate::result::ChildPresenterResult;

/// How a host responded to a show or activate request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowDecision {
    /// The view is visible now
    Shown,
    /// The host reports [`ViewLifecycleEvent::Appeared`] later
    Pending,
}

/// How a host responded to a close request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    Closed,
    /// The view refused to close
    Vetoed,
    /// The host reports the outcome later
    Pending,
}

/// Lifecycle notifications a host sends back to the mediator
#[derive(Debug, Clone)]
pub enum ViewLifecycleEvent {
    Appeared,
    Closed,
    CloseCanceled,
    NavigationCanceled,
    NavigationFailed(NavigationFault),
}

/// Platform side of a [`ViewNavigationMediator`]
pub trait ViewHost: Send + Sync {
    /// Present a freshly created view
    fn show(&self, view: &View, context: &NavigationContext) -> anyhow::Result<ShowDecision>;

    /// Bring an already presented view to front
    fn activate(&self, _view: &View, _context: &NavigationContext) -> anyhow::Result<ShowDecision> {
        Ok(ShowDecision::Shown)
    }

    /// Dismiss the view
    fn close(&self, view: &View, context: &NavigationContext) -> anyhow::Result<CloseDecision>;
}

enum Dispatch {
    Navigated,
    NavigatingCanceled,
    Canceled,
    Failed(NavigationFault),
}

struct MediatorInner {
    state: MediatorState,
    view: Option<View>,
    /// Context of the navigation the host has not finished yet
    pending: Option<NavigationContext>,
}

/// Mediator that drives a [`ViewHost`] and reports navigations to the dispatcher
pub struct ViewNavigationMediator {
    provider: NavigationProvider,
    initializer: ViewInitializer,
    navigation_type: NavigationType,
    view_model: Weak<dyn ViewModel>,
    host: Arc<dyn ViewHost>,
    dispatcher: Arc<NavigationDispatcher>,
    inner: Mutex<MediatorInner>,
}

impl ViewNavigationMediator {
    pub fn new(
        view_model: &ViewModelRef,
        initializer: ViewInitializer,
        navigation_type: NavigationType,
        host: Arc<dyn ViewHost>,
        dispatcher: Arc<NavigationDispatcher>,
    ) -> Self {
        Self {
            provider: NavigationProvider::new(mediator_id::<Self>(&initializer.id)),
            initializer,
            navigation_type,
            view_model: Arc::downgrade(view_model),
            host,
            dispatcher,
            inner: Mutex::new(MediatorInner {
                state: MediatorState::Closed,
                view: None,
                pending: None,
            }),
        }
    }

    fn context(&self, view_model: ViewModelRef, mode: NavigationMode, metadata: &MetadataContext) -> NavigationContext {
        NavigationContext::new(view_model, self.provider.clone(), self.navigation_type.clone(), mode)
            .with_metadata(metadata.clone())
    }

    fn fresh_context(&self, mode: NavigationMode) -> Option<NavigationContext> {
        let view_model = self.view_model.upgrade()?;
        Some(self.context(view_model, mode, &MetadataContext::new()))
    }

    fn result(&self, metadata: &MetadataContext) -> ChildPresenterResult {
        ChildPresenterResult::new(self.provider.clone(), self.navigation_type.clone(), metadata.clone())
    }

    /// Feed a lifecycle notification from the host
    pub fn on_view_lifecycle(&self, event: ViewLifecycleEvent) {
        let next = {
            let mut inner = self.inner.lock();
            match event {
                ViewLifecycleEvent::Appeared => {
                    if inner.state == MediatorState::Closed {
                        tracing::debug!("Ignoring appearance of closed view for '{}'", self.provider);
                        return;
                    }
                    inner.state = MediatorState::Shown;
                    let context = inner
                        .pending
                        .take()
                        .filter(|c| !c.mode.is_close())
                        .or_else(|| self.fresh_context(NavigationMode::Refresh));
                    context.map(|c| (c, Dispatch::Navigated))
                }
                ViewLifecycleEvent::Closed => {
                    if inner.state == MediatorState::Closed {
                        return;
                    }
                    inner.state = MediatorState::Closed;
                    inner.view = None;
                    let context = inner
                        .pending
                        .take()
                        .filter(|c| c.mode.is_close())
                        .or_else(|| self.fresh_context(NavigationMode::Close));
                    context.map(|c| (c, Dispatch::Navigated))
                }
                ViewLifecycleEvent::CloseCanceled => {
                    if inner.state != MediatorState::Closing {
                        return;
                    }
                    inner.state = MediatorState::Shown;
                    let context = inner
                        .pending
                        .take()
                        .filter(|c| c.mode.is_close())
                        .or_else(|| self.fresh_context(NavigationMode::Close));
                    context.map(|c| (c, Dispatch::NavigatingCanceled))
                }
                ViewLifecycleEvent::NavigationCanceled | ViewLifecycleEvent::NavigationFailed(_) => {
                    let mode = match inner.state {
                        MediatorState::Showing => {
                            inner.state = MediatorState::Closed;
                            inner.view = None;
                            NavigationMode::New
                        }
                        MediatorState::Closing => {
                            inner.state = MediatorState::Shown;
                            NavigationMode::Close
                        }
                        MediatorState::Shown => NavigationMode::Refresh,
                        MediatorState::Closed => NavigationMode::New,
                    };
                    let dispatch = match event {
                        ViewLifecycleEvent::NavigationFailed(error) => Dispatch::Failed(error),
                        _ => Dispatch::Canceled,
                    };
                    let context = inner.pending.take().or_else(|| self.fresh_context(mode));
                    context.map(|c| (c, dispatch))
                }
            }
        };

        let Some((context, dispatch)) = next else {
            tracing::warn!("View-model of '{}' is gone; dropping lifecycle event", self.provider);
            return;
        };

        match dispatch {
            Dispatch::Navigated => self.dispatcher.on_navigated(&context),
            Dispatch::NavigatingCanceled => self.dispatcher.on_navigating_canceled(&context),
            Dispatch::Canceled => self.dispatcher.on_navigation_canceled(&context),
            Dispatch::Failed(error) => self.dispatcher.on_navigation_failed(&context, &error),
        }
    }
}

impl NavigationMediator for ViewNavigationMediator {
    fn provider(&self) -> &NavigationProvider {
        &self.provider
    }

    fn view_initializer(&self) -> &ViewInitializer {
        &self.initializer
    }

    fn navigation_type(&self) -> &NavigationType {
        &self.navigation_type
    }

    fn state(&self) -> MediatorState {
        self.inner.lock().state
    }

    fn view(&self) -> Option<View> {
        self.inner.lock().view.clone()
    }

    fn try_show(&self, metadata: &MetadataContext) -> Result<Option<ChildPresenterResult>> {
        let Some(view_model) = self.view_model.upgrade() else {
            return Ok(None);
        };

        let (view, context) = {
            let mut inner = self.inner.lock();
            let mode = match inner.state {
                MediatorState::Closing => {
                    tracing::debug!("'{}' is closing; cannot show", self.provider);
                    return Ok(None);
                }
                MediatorState::Closed => {
                    inner.state = MediatorState::Showing;
                    NavigationMode::New
                }
                MediatorState::Showing | MediatorState::Shown => NavigationMode::Refresh,
            };
            let view = inner
                .view
                .get_or_insert_with(|| View::new(self.initializer.clone(), view_model.id()))
                .clone();
            let context = self.context(view_model, mode, metadata);
            inner.pending = Some(context.clone());
            (view, context)
        };

        let decision = if context.mode.is_new() {
            self.host.show(&view, &context)
        } else {
            self.host.activate(&view, &context)
        };

        match decision {
            Ok(ShowDecision::Shown) => self.on_view_lifecycle(ViewLifecycleEvent::Appeared),
            Ok(ShowDecision::Pending) => {}
            Err(error) => self.on_view_lifecycle(ViewLifecycleEvent::NavigationFailed(Arc::new(error))),
        }
        Ok(Some(self.result(metadata)))
    }

    fn try_close(&self, metadata: &MetadataContext) -> Result<Option<ChildPresenterResult>> {
        let Some(view_model) = self.view_model.upgrade() else {
            return Ok(None);
        };

        let (view, context) = {
            let mut inner = self.inner.lock();
            if !matches!(inner.state, MediatorState::Showing | MediatorState::Shown) {
                return Ok(None);
            }
            inner.state = MediatorState::Closing;
            let view = inner
                .view
                .get_or_insert_with(|| View::new(self.initializer.clone(), view_model.id()))
                .clone();
            let context = self.context(view_model, NavigationMode::Close, metadata);
            inner.pending = Some(context.clone());
            (view, context)
        };

        match self.host.close(&view, &context) {
            Ok(CloseDecision::Closed) => self.on_view_lifecycle(ViewLifecycleEvent::Closed),
            Ok(CloseDecision::Vetoed) => self.on_view_lifecycle(ViewLifecycleEvent::CloseCanceled),
            Ok(CloseDecision::Pending) => {}
            Err(error) => self.on_view_lifecycle(ViewLifecycleEvent::NavigationFailed(Arc::new(error))),
        }
        Ok(Some(self.result(metadata)))
    }

    fn try_restore(&self, view: &View, metadata: &MetadataContext) -> Result<Option<ChildPresenterResult>> {
        if view.initializer.id != self.initializer.id {
            return Ok(None);
        }
        let Some(view_model) = self.view_model.upgrade() else {
            return Ok(None);
        };

        let context = self.context(view_model, NavigationMode::Restore, metadata);
        {
            let mut inner = self.inner.lock();
            inner.view = Some(view.clone());
            inner.state = MediatorState::Shown;
            inner.pending = None;
        }

        tracing::debug!("Restored view {} for '{}'", view.id, self.provider);
        self.dispatcher.on_navigated(&context);
        Ok(Some(self.result(metadata)))
    }
}

/// Creates [`ViewNavigationMediator`]s for initializers of a given view type
pub struct ViewHostMediatorFactory {
    navigation_type: NavigationType,
    view_type: Option<ViewType>,
    priority: i32,
    host: Arc<dyn ViewHost>,
    dispatcher: Arc<NavigationDispatcher>,
}

impl ViewHostMediatorFactory {
    pub fn new(navigation_type: NavigationType, host: Arc<dyn ViewHost>, dispatcher: Arc<NavigationDispatcher>) -> Self {
        Self {
            navigation_type,
            view_type: None,
            priority: 0,
            host,
            dispatcher,
        }
    }

    /// Only handle initializers whose view type is assignable to `view_type`
    pub fn with_view_type(mut self, view_type: ViewType) -> Self {
        self.view_type = Some(view_type);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl NavigationMediatorFactory for ViewHostMediatorFactory {
    fn priority(&self) -> i32 {
        self.priority
    }

    fn try_create(
        &self,
        view_model: &ViewModelRef,
        initializer: &ViewInitializer,
        metadata: &MetadataContext,
    ) -> Option<Arc<dyn NavigationMediator>> {
        if let Some(view_type) = &self.view_type {
            if !initializer.view_type.is_assignable_to(view_type) {
                return None;
            }
        }

        let navigation_type = metadata
            .get(&NAVIGATION_TYPE)
            .unwrap_or_else(|| self.navigation_type.clone());
        Some(Arc::new(ViewNavigationMediator::new(
            view_model,
            initializer.clone(),
            navigation_type,
            self.host.clone(),
            self.dispatcher.clone(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{initializer, RecordingDispatcherListener, TestHost};
    use mv_core::ViewModelBase;

    struct Fixture {
        vm: ViewModelRef,
        host: Arc<TestHost>,
        recorder: Arc<RecordingDispatcherListener>,
        mediator: ViewNavigationMediator,
        _dispatcher: Arc<NavigationDispatcher>,
    }

    fn fixture() -> Fixture {
        let dispatcher = Arc::new(NavigationDispatcher::new());
        let recorder = Arc::new(RecordingDispatcherListener::default());
        dispatcher.add_listener(recorder.clone());
        let host = Arc::new(TestHost::default());
        let vm = ViewModelBase::new("TestViewModel").into_ref();
        let mediator = ViewNavigationMediator::new(
            &vm,
            initializer("main", "MainPage", "TestViewModel"),
            NavigationType::Page,
            host.clone(),
            dispatcher.clone(),
        );
        Fixture {
            vm,
            host,
            recorder,
            mediator,
            _dispatcher: dispatcher,
        }
    }

    #[test]
    fn test_show_then_refresh() {
        let f = fixture();
        let metadata = MetadataContext::new();

        let result = f.mediator.try_show(&metadata).unwrap().unwrap();
        assert_eq!(result.navigation_provider, *f.mediator.provider());
        assert_eq!(f.mediator.state(), MediatorState::Shown);

        f.mediator.try_show(&metadata).unwrap().unwrap();
        assert_eq!(
            f.recorder.events(),
            vec![
                ("navigated".to_string(), NavigationMode::New),
                ("navigated".to_string(), NavigationMode::Refresh)
            ]
        );
        assert_eq!(f.host.shown(), 1);
        assert!(f.mediator.id().ends_with("/main"));
    }

    #[test]
    fn test_close_and_veto() {
        let f = fixture();
        let metadata = MetadataContext::new();
        assert!(f.mediator.try_close(&metadata).unwrap().is_none());

        f.mediator.try_show(&metadata).unwrap();
        f.host.set_close(Ok(CloseDecision::Vetoed));
        assert!(f.mediator.try_close(&metadata).unwrap().is_some());
        assert_eq!(f.mediator.state(), MediatorState::Shown);

        f.host.set_close(Ok(CloseDecision::Closed));
        f.mediator.try_close(&metadata).unwrap();
        assert_eq!(f.mediator.state(), MediatorState::Closed);
        assert!(f.mediator.view().is_none());

        let events = f.recorder.events();
        assert_eq!(events[1], ("navigating_canceled".to_string(), NavigationMode::Close));
        assert_eq!(events[2], ("navigated".to_string(), NavigationMode::Close));
    }

    #[test]
    fn test_failed_show_resets_state() {
        let f = fixture();
        f.host.set_show(Err("no window".to_string()));

        assert!(f.mediator.try_show(&MetadataContext::new()).unwrap().is_some());
        assert_eq!(f.mediator.state(), MediatorState::Closed);
        assert_eq!(f.recorder.events(), vec![("failed".to_string(), NavigationMode::New)]);
    }

    #[test]
    fn test_pending_host_reports_later() {
        let f = fixture();
        f.host.set_show(Ok(ShowDecision::Pending));

        f.mediator.try_show(&MetadataContext::new()).unwrap();
        assert_eq!(f.mediator.state(), MediatorState::Showing);
        assert!(f.recorder.events().is_empty());

        f.mediator.on_view_lifecycle(ViewLifecycleEvent::Appeared);
        // a host-initiated close still reports a close navigation
        f.mediator.on_view_lifecycle(ViewLifecycleEvent::Closed);
        assert_eq!(
            f.recorder.events(),
            vec![
                ("navigated".to_string(), NavigationMode::New),
                ("navigated".to_string(), NavigationMode::Close)
            ]
        );
    }

    #[test]
    fn test_restore_only_own_views() {
        let f = fixture();
        let metadata = MetadataContext::new();
        let foreign = View::new(initializer("other", "OtherPage", "TestViewModel"), f.vm.id());
        assert!(f.mediator.try_restore(&foreign, &metadata).unwrap().is_none());

        let own = View::new(initializer("main", "MainPage", "TestViewModel"), f.vm.id());
        assert!(f.mediator.try_restore(&own, &metadata).unwrap().is_some());
        assert_eq!(f.mediator.view(), Some(own));
        assert_eq!(f.recorder.events(), vec![("navigated".to_string(), NavigationMode::Restore)]);
    }

    #[test]
    fn test_factory_filters_view_types() {
        let dispatcher = Arc::new(NavigationDispatcher::new());
        let factory = ViewHostMediatorFactory::new(NavigationType::Window, Arc::new(TestHost::default()), dispatcher)
            .with_view_type(ViewType::new("Window"));
        let vm = ViewModelBase::new("TestViewModel").into_ref();
        let metadata = MetadataContext::new();

        assert!(factory
            .try_create(&vm, &initializer("page", "MainPage", "TestViewModel"), &metadata)
            .is_none());

        let dialog = ViewInitializer::new("dialog", ViewType::new("Dialog").with_supertype("Window"), "TestViewModel");
        let mediator = factory.try_create(&vm, &dialog, &metadata).unwrap();
        assert_eq!(*mediator.navigation_type(), NavigationType::Window);

        let popup = MetadataContext::new().with(&NAVIGATION_TYPE, NavigationType::Popup);
        let mediator = factory.try_create(&vm, &dialog, &popup).unwrap();
        assert_eq!(*mediator.navigation_type(), NavigationType::Popup);
    }
}
