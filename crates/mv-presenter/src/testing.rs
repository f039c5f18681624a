//! Fakes shared by the unit tests

use mv_core::metadata::keys::VIEW_MODEL;
use mv_core::{
    MetadataContext, NavigationCallback, NavigationCallbackType, NavigationContext, NavigationDispatcherListener,
    NavigationFault, NavigationMode, NavigationProvider, NavigationType, View, ViewInitializer, ViewModelRef, ViewType,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::callback::NavigationCallbackListener;
use crate::child::ChildPresenter;
use crate::error::Result;
use crate::mediator::{CloseDecision, ShowDecision, ViewHost};
use crate::result::{ChildPresenterResult, CloseOutput, ShowOutput};

pub fn child_result(provider: &str, navigation_type: NavigationType) -> ChildPresenterResult {
    ChildPresenterResult::new(NavigationProvider::new(provider), navigation_type, MetadataContext::new())
}

pub fn context(
    view_model: &ViewModelRef,
    provider: &str,
    navigation_type: NavigationType,
    mode: NavigationMode,
) -> NavigationContext {
    NavigationContext::new(view_model.clone(), NavigationProvider::new(provider), navigation_type, mode)
}

pub fn initializer(id: &str, view_type: &str, view_model_type: &str) -> ViewInitializer {
    ViewInitializer::new(id, ViewType::new(view_type), view_model_type)
}

/// Request metadata targeting `view_model`
pub fn request(view_model: &ViewModelRef) -> MetadataContext {
    MetadataContext::new().with(&VIEW_MODEL, view_model.clone())
}

#[derive(Default)]
pub struct RecordingCallbackListener {
    pub added: Mutex<Vec<NavigationCallbackType>>,
    pub executed: Mutex<Vec<NavigationCallbackType>>,
}

impl NavigationCallbackListener for RecordingCallbackListener {
    fn on_callback_added(
        &self,
        callback: &Arc<NavigationCallback>,
        _view_model: &ViewModelRef,
        _result: &ChildPresenterResult,
    ) {
        self.added.lock().push(callback.callback_type());
    }

    fn on_callback_executed(&self, callback: &Arc<NavigationCallback>, _context: &NavigationContext) {
        self.executed.lock().push(callback.callback_type());
    }
}

#[derive(Default)]
pub struct RecordingDispatcherListener {
    events: Mutex<Vec<(String, NavigationMode)>>,
}

impl RecordingDispatcherListener {
    pub fn events(&self) -> Vec<(String, NavigationMode)> {
        self.events.lock().clone()
    }

    fn record(&self, kind: &str, context: &NavigationContext) {
        self.events.lock().push((kind.to_string(), context.mode));
    }
}

impl NavigationDispatcherListener for RecordingDispatcherListener {
    fn on_navigated(&self, context: &NavigationContext) {
        self.record("navigated", context);
    }

    fn on_navigation_failed(&self, context: &NavigationContext, _error: &NavigationFault) {
        self.record("failed", context);
    }

    fn on_navigation_canceled(&self, context: &NavigationContext) {
        self.record("canceled", context);
    }

    fn on_navigating_canceled(&self, context: &NavigationContext) {
        self.record("navigating_canceled", context);
    }
}

/// Host whose answers are scripted; shows and closes synchronously by default
pub struct TestHost {
    show: Mutex<std::result::Result<ShowDecision, String>>,
    close: Mutex<std::result::Result<CloseDecision, String>>,
    shown: AtomicUsize,
}

impl Default for TestHost {
    fn default() -> Self {
        Self {
            show: Mutex::new(Ok(ShowDecision::Shown)),
            close: Mutex::new(Ok(CloseDecision::Closed)),
            shown: AtomicUsize::new(0),
        }
    }
}

impl TestHost {
    pub fn set_show(&self, decision: std::result::Result<ShowDecision, String>) {
        *self.show.lock() = decision;
    }

    pub fn set_close(&self, decision: std::result::Result<CloseDecision, String>) {
        *self.close.lock() = decision;
    }

    /// Number of fresh views presented
    pub fn shown(&self) -> usize {
        self.shown.load(Ordering::SeqCst)
    }
}

impl ViewHost for TestHost {
    fn show(&self, _view: &View, _context: &NavigationContext) -> anyhow::Result<ShowDecision> {
        self.shown.fetch_add(1, Ordering::SeqCst);
        self.show.lock().clone().map_err(anyhow::Error::msg)
    }

    fn close(&self, _view: &View, _context: &NavigationContext) -> anyhow::Result<CloseDecision> {
        self.close.lock().clone().map_err(anyhow::Error::msg)
    }
}

/// Child presenter returning canned results
pub struct StubPresenter {
    name: String,
    priority: i32,
    show: Option<ChildPresenterResult>,
    close: Vec<ChildPresenterResult>,
    show_calls: AtomicUsize,
    close_calls: AtomicUsize,
    log: Option<Arc<Mutex<Vec<String>>>>,
}

impl StubPresenter {
    pub fn new(name: &str, priority: i32) -> Self {
        Self {
            name: name.to_string(),
            priority,
            show: None,
            close: Vec::new(),
            show_calls: AtomicUsize::new(0),
            close_calls: AtomicUsize::new(0),
            log: None,
        }
    }

    pub fn showing(mut self, result: ChildPresenterResult) -> Self {
        self.show = Some(result);
        self
    }

    pub fn closing(mut self, results: Vec<ChildPresenterResult>) -> Self {
        self.close = results;
        self
    }

    /// Append this presenter's name to `log` on every show attempt
    pub fn logging_to(mut self, log: Arc<Mutex<Vec<String>>>) -> Self {
        self.log = Some(log);
        self
    }

    pub fn show_calls(&self) -> usize {
        self.show_calls.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }
}

impl ChildPresenter for StubPresenter {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn try_show(&self, _metadata: &MetadataContext) -> Result<Option<ShowOutput>> {
        self.show_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(log) = &self.log {
            log.lock().push(self.name.clone());
        }
        Ok(self.show.clone().map(ShowOutput::from))
    }

    fn try_close(&self, _metadata: &MetadataContext) -> Result<Vec<CloseOutput>> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.close.iter().cloned().map(CloseOutput::from).collect())
    }
}
