//! Navigation dispatcher implementation

use super::{NavigationContext, NavigationDispatcherListener, NavigationFault, NavigationJournal};
use parking_lot::RwLock;
use std::sync::{Arc, Weak};

/// Fans navigation lifecycle events out to registered listeners
pub struct NavigationDispatcher {
    listeners: Arc<RwLock<Vec<Weak<dyn NavigationDispatcherListener>>>>,
    journal: Arc<NavigationJournal>,
}

impl NavigationDispatcher {
    /// Create a new dispatcher with an empty journal
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(RwLock::new(Vec::new())),
            journal: Arc::new(NavigationJournal::new()),
        }
    }

    /// The journal of open navigations
    pub fn journal(&self) -> &Arc<NavigationJournal> {
        &self.journal
    }

    /// Add a listener; the dispatcher only keeps a weak reference
    pub fn add_listener(&self, listener: Arc<dyn NavigationDispatcherListener>) {
        let mut listeners = self.listeners.write();
        listeners.push(Arc::downgrade(&listener));
    }

    /// Remove a previously added listener
    pub fn remove_listener(&self, listener: &Arc<dyn NavigationDispatcherListener>) -> bool {
        let target = Arc::as_ptr(listener) as *const ();
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|weak| weak.as_ptr() as *const () != target);
        listeners.len() != before
    }

    /// Live listeners in registration order
    pub fn listeners(&self) -> Vec<Arc<dyn NavigationDispatcherListener>> {
        let mut listeners = self.listeners.write();

        // Remove any dead weak references
        listeners.retain(|weak| weak.strong_count() > 0);
        listeners.iter().filter_map(Weak::upgrade).collect()
    }

    /// Report a completed navigation
    pub fn on_navigated(&self, context: &NavigationContext) {
        tracing::debug!("Navigated: {:?}", context);
        self.journal.on_navigated(context);
        for listener in self.listeners() {
            listener.on_navigated(context);
        }
    }

    /// Report a navigation that failed after it started
    pub fn on_navigation_failed(&self, context: &NavigationContext, error: &NavigationFault) {
        tracing::warn!("Navigation failed: {:?}: {}", context, error);
        for listener in self.listeners() {
            listener.on_navigation_failed(context, error);
        }
    }

    /// Report a navigation canceled after it started
    pub fn on_navigation_canceled(&self, context: &NavigationContext) {
        tracing::debug!("Navigation canceled: {:?}", context);
        for listener in self.listeners() {
            listener.on_navigation_canceled(context);
        }
    }

    /// Report a close vetoed before it started
    pub fn on_navigating_canceled(&self, context: &NavigationContext) {
        tracing::debug!("Navigating canceled: {:?}", context);
        for listener in self.listeners() {
            listener.on_navigating_canceled(context);
        }
    }
}

impl Default for NavigationDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::{NavigationMode, NavigationProvider, NavigationType};
    use crate::view_model::ViewModelBase;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<&'static str>>,
    }

    impl NavigationDispatcherListener for Recorder {
        fn on_navigated(&self, _context: &NavigationContext) {
            self.events.lock().push("navigated");
        }

        fn on_navigating_canceled(&self, _context: &NavigationContext) {
            self.events.lock().push("navigating_canceled");
        }
    }

    fn context(mode: NavigationMode) -> NavigationContext {
        NavigationContext::new(
            ViewModelBase::new("TestViewModel").into_ref(),
            NavigationProvider::new("provider"),
            NavigationType::Page,
            mode,
        )
    }

    #[test]
    fn test_listeners_receive_events() {
        let dispatcher = NavigationDispatcher::new();
        let recorder = Arc::new(Recorder::default());
        dispatcher.add_listener(recorder.clone());

        dispatcher.on_navigated(&context(NavigationMode::New));
        dispatcher.on_navigating_canceled(&context(NavigationMode::Close));

        assert_eq!(*recorder.events.lock(), vec!["navigated", "navigating_canceled"]);
        assert_eq!(dispatcher.journal().entries().len(), 1);
    }

    #[test]
    fn test_remove_and_drop_listeners() {
        let dispatcher = NavigationDispatcher::new();
        let kept: Arc<dyn NavigationDispatcherListener> = Arc::new(Recorder::default());
        let dropped: Arc<dyn NavigationDispatcherListener> = Arc::new(Recorder::default());
        dispatcher.add_listener(kept.clone());
        dispatcher.add_listener(dropped.clone());

        drop(dropped);
        assert_eq!(dispatcher.listeners().len(), 1);

        assert!(dispatcher.remove_listener(&kept));
        assert!(!dispatcher.remove_listener(&kept));
        assert!(dispatcher.listeners().is_empty());
    }
}
