use mv_core::{
    ActionToken, MetadataContext, NavigationCallback, NavigationCallbackProvider, NavigationCallbackType,
    NavigationContext, NavigationDispatcher, NavigationDispatcherListener, NavigationEntry, NavigationFault,
    ViewModelRef,
};
use parking_lot::RwLock;
use std::sync::Arc;

use super::suspend::SuspendableDispatcherListener;
use super::DispatcherEvent;
use crate::error::Result;
use crate::keys::{self, CallbackList};
use crate::result::ChildPresenterResult;
use crate::settings::PresenterSettings;

/// Observes callback creation and resolution
pub trait NavigationCallbackListener: Send + Sync {
    fn on_callback_added(
        &self,
        _callback: &Arc<NavigationCallback>,
        _view_model: &ViewModelRef,
        _result: &ChildPresenterResult,
    ) {
    }

    fn on_callback_executed(&self, _callback: &Arc<NavigationCallback>, _context: &NavigationContext) {}
}

#[derive(Clone)]
enum Resolution {
    Result(bool),
    Fault(NavigationFault),
    Cancel,
}

/// Callback storage and the resolution rules, shared with the dispatcher listener
pub(crate) struct CallbackRegistry {
    serializable: bool,
    listeners: RwLock<Vec<Arc<dyn NavigationCallbackListener>>>,
}

impl CallbackRegistry {
    fn new(serializable: bool) -> Self {
        Self {
            serializable,
            listeners: RwLock::new(Vec::new()),
        }
    }

    fn listeners(&self) -> Vec<Arc<dyn NavigationCallbackListener>> {
        self.listeners.read().clone()
    }

    fn add_callback(
        &self,
        view_model: &ViewModelRef,
        callback_type: NavigationCallbackType,
        result: &ChildPresenterResult,
    ) -> Arc<NavigationCallback> {
        let is_serializable = self.serializable
            && callback_type == NavigationCallbackType::Close
            && result.metadata.get(&keys::IS_RESTORABLE_CALLBACK).unwrap_or(false);

        let callback = Arc::new(NavigationCallback::new(
            callback_type,
            result.navigation_provider.id(),
            result.navigation_type.clone(),
            is_serializable,
        ));

        let list = view_model
            .metadata()
            .get_or_add(keys::callback_key(callback_type), CallbackList::default);
        list.lock().push(callback.clone());

        tracing::debug!(
            "Added {:?} callback for {:?} via '{}' ({})",
            callback_type,
            view_model,
            result.navigation_provider,
            result.navigation_type
        );

        for listener in self.listeners() {
            listener.on_callback_added(&callback, view_model, result);
        }
        callback
    }

    fn get_callbacks(
        &self,
        entry: &NavigationEntry,
        callback_type: Option<NavigationCallbackType>,
    ) -> Vec<Arc<NavigationCallback>> {
        let types: Vec<NavigationCallbackType> = match callback_type {
            Some(callback_type) => vec![callback_type],
            None => NavigationCallbackType::ALL.to_vec(),
        };

        let metadata = entry.target.metadata();
        let mut callbacks = Vec::new();
        for callback_type in types {
            let Some(list) = metadata.get(keys::callback_key(callback_type)) else {
                continue;
            };
            callbacks.extend(
                list.lock()
                    .iter()
                    .filter(|callback| {
                        callback.navigation_provider_id() == entry.provider.id()
                            && *callback.navigation_type() == entry.navigation_type
                    })
                    .cloned(),
            );
        }
        callbacks
    }

    /// Apply one dispatcher event to the target view-model's pending callbacks
    pub(crate) fn resolve(&self, context: &NavigationContext, event: &DispatcherEvent) {
        match event {
            DispatcherEvent::Navigated => {
                if context.mode.is_close() {
                    for callback_type in NavigationCallbackType::ALL {
                        self.resolve_list(context, callback_type, &Resolution::Result(true));
                    }
                } else {
                    self.resolve_list(context, NavigationCallbackType::Showing, &Resolution::Result(true));
                }
            }
            DispatcherEvent::NavigationFailed(error) => self.resolve_failure(context, Some(error)),
            DispatcherEvent::NavigationCanceled => self.resolve_failure(context, None),
            DispatcherEvent::NavigatingCanceled => {
                if context.mode.is_close() {
                    self.resolve_list(context, NavigationCallbackType::Closing, &Resolution::Result(false));
                } else {
                    tracing::trace!("Ignoring navigating-canceled outside of close: {:?}", context);
                }
            }
        }
    }

    /// `error == None` means the navigation was canceled
    fn resolve_failure(&self, context: &NavigationContext, error: Option<&NavigationFault>) {
        let canceled = error.is_none();
        let resolution = match error {
            Some(error) => Resolution::Fault(error.clone()),
            None => Resolution::Cancel,
        };

        if context.mode.is_close() {
            self.resolve_list(context, NavigationCallbackType::Closing, &resolution);
            if !canceled {
                self.resolve_list(context, NavigationCallbackType::Showing, &resolution);
                self.resolve_list(context, NavigationCallbackType::Close, &resolution);
            }
        } else {
            self.resolve_list(context, NavigationCallbackType::Showing, &resolution);
            if context.mode.is_new() || !canceled {
                self.resolve_list(context, NavigationCallbackType::Closing, &resolution);
                self.resolve_list(context, NavigationCallbackType::Close, &resolution);
            }
        }
    }

    fn resolve_list(&self, context: &NavigationContext, callback_type: NavigationCallbackType, resolution: &Resolution) {
        let Some(list) = context.target.metadata().get(keys::callback_key(callback_type)) else {
            return;
        };

        let matched: Vec<Arc<NavigationCallback>> = {
            let mut callbacks = list.lock();
            let mut matched = Vec::new();
            callbacks.retain(|callback| {
                if callback.matches(context) {
                    matched.push(callback.clone());
                    false
                } else {
                    true
                }
            });
            matched
        };

        if matched.is_empty() {
            return;
        }

        let listeners = self.listeners();
        for callback in matched {
            let applied = match resolution {
                Resolution::Result(value) => callback.set_result(*value, context),
                Resolution::Fault(error) => callback.set_exception(error.clone(), context),
                Resolution::Cancel => callback.set_canceled(context),
            };
            if applied {
                for listener in &listeners {
                    listener.on_callback_executed(&callback, context);
                }
            }
        }
    }
}

/// Creates callbacks for presenter results and resolves them from dispatcher events
pub struct PresenterCallbackManager {
    registry: Arc<CallbackRegistry>,
    dispatcher_listener: Arc<SuspendableDispatcherListener>,
}

impl PresenterCallbackManager {
    pub fn new(settings: &PresenterSettings) -> Self {
        let registry = Arc::new(CallbackRegistry::new(settings.serializable_callbacks));
        Self {
            dispatcher_listener: Arc::new(SuspendableDispatcherListener::new(registry.clone())),
            registry,
        }
    }

    /// Subscribe to `dispatcher` and answer its journal's callback queries
    pub fn attach(self: &Arc<Self>, dispatcher: &NavigationDispatcher) {
        dispatcher.add_listener(self.dispatcher_listener());
        dispatcher.journal().add_callback_provider(self.clone());
    }

    /// The listener to register with a navigation dispatcher
    pub fn dispatcher_listener(&self) -> Arc<dyn NavigationDispatcherListener> {
        self.dispatcher_listener.clone()
    }

    /// Hold back dispatcher events until the returned token is released
    pub fn begin_presenter_operation(&self) -> ActionToken {
        self.dispatcher_listener.suspend()
    }

    /// Whether a presenter operation is still holding back dispatcher events
    pub fn is_suspended(&self) -> bool {
        self.dispatcher_listener.is_suspended()
    }

    pub fn add_listener(&self, listener: Arc<dyn NavigationCallbackListener>) {
        self.registry.listeners.write().push(listener);
    }

    pub fn remove_listener(&self, listener: &Arc<dyn NavigationCallbackListener>) -> bool {
        let mut listeners = self.registry.listeners.write();
        let before = listeners.len();
        listeners.retain(|l| !Arc::ptr_eq(l, listener));
        listeners.len() != before
    }

    /// Register a new pending callback for `view_model`
    pub fn add_callback(
        &self,
        view_model: &ViewModelRef,
        callback_type: NavigationCallbackType,
        result: &ChildPresenterResult,
    ) -> Arc<NavigationCallback> {
        self.registry.add_callback(view_model, callback_type, result)
    }

    /// Outstanding callbacks for a journal entry; `None` covers every callback type
    pub fn get_callbacks(
        &self,
        entry: &NavigationEntry,
        callback_type: Option<NavigationCallbackType>,
        _metadata: &MetadataContext,
    ) -> Vec<Arc<NavigationCallback>> {
        self.registry.get_callbacks(entry, callback_type)
    }

    /// Like [`get_callbacks`](Self::get_callbacks) with a serialized callback-type code
    pub fn get_callbacks_by_code(
        &self,
        entry: &NavigationEntry,
        code: Option<u8>,
        metadata: &MetadataContext,
    ) -> Result<Vec<Arc<NavigationCallback>>> {
        let callback_type = code.map(NavigationCallbackType::try_from).transpose()?;
        Ok(self.get_callbacks(entry, callback_type, metadata))
    }
}

impl NavigationCallbackProvider for PresenterCallbackManager {
    fn get_callbacks(
        &self,
        entry: &NavigationEntry,
        callback_type: Option<NavigationCallbackType>,
        metadata: &MetadataContext,
    ) -> Vec<Arc<NavigationCallback>> {
        PresenterCallbackManager::get_callbacks(self, entry, callback_type, metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PresenterError;
    use crate::testing::{child_result, context, RecordingCallbackListener};
    use mv_core::{NavigationMode, NavigationType, ViewModelBase};

    fn manager() -> PresenterCallbackManager {
        PresenterCallbackManager::new(&PresenterSettings::default())
    }

    fn register_all(manager: &PresenterCallbackManager, vm: &ViewModelRef) -> Vec<Arc<NavigationCallback>> {
        let result = child_result("provider", NavigationType::Page);
        NavigationCallbackType::ALL
            .iter()
            .map(|callback_type| manager.add_callback(vm, *callback_type, &result))
            .collect()
    }

    fn outcomes(callbacks: &[Arc<NavigationCallback>]) -> Vec<String> {
        callbacks
            .iter()
            .map(|callback| match callback.outcome() {
                None => "pending".to_string(),
                Some(outcome) if outcome.is_faulted() => "faulted".to_string(),
                Some(outcome) if outcome.is_canceled() => "canceled".to_string(),
                Some(outcome) => format!("{:?}", outcome.value()),
            })
            .collect()
    }

    #[test]
    fn test_callbacks_land_in_typed_lists() {
        let manager = manager();
        let vm = ViewModelBase::new("TestViewModel").into_ref();
        let listener = Arc::new(RecordingCallbackListener::default());
        manager.add_listener(listener.clone());

        register_all(&manager, &vm);

        for key in [&keys::SHOWING_CALLBACKS, &keys::CLOSING_CALLBACKS, &keys::CLOSE_CALLBACKS] {
            assert_eq!(vm.metadata().get(key).unwrap().lock().len(), 1);
        }
        assert_eq!(listener.added.lock().len(), 3);
    }

    #[test]
    fn test_serializable_only_for_restorable_close_callbacks() {
        let manager = PresenterCallbackManager::new(&PresenterSettings {
            serializable_callbacks: true,
            ..PresenterSettings::default()
        });
        let vm = ViewModelBase::new("TestViewModel").into_ref();

        let result = child_result("provider", NavigationType::Page);
        assert!(!manager.add_callback(&vm, NavigationCallbackType::Close, &result).is_serializable());

        result.metadata.set(&keys::IS_RESTORABLE_CALLBACK, true);
        assert!(manager.add_callback(&vm, NavigationCallbackType::Close, &result).is_serializable());
        assert!(!manager.add_callback(&vm, NavigationCallbackType::Showing, &result).is_serializable());

        let plain = self::manager();
        assert!(!plain.add_callback(&vm, NavigationCallbackType::Close, &result).is_serializable());
    }

    #[test]
    fn test_navigated_close_resolves_everything() {
        let manager = manager();
        let vm = ViewModelBase::new("TestViewModel").into_ref();
        let callbacks = register_all(&manager, &vm);

        manager
            .dispatcher_listener()
            .on_navigated(&context(&vm, "provider", NavigationType::Page, NavigationMode::Close));

        assert_eq!(outcomes(&callbacks), vec!["Some(true)", "Some(true)", "Some(true)"]);
        assert!(vm.metadata().get(&keys::CLOSE_CALLBACKS).unwrap().lock().is_empty());
    }

    #[test]
    fn test_navigated_show_resolves_only_showing() {
        let manager = manager();
        let vm = ViewModelBase::new("TestViewModel").into_ref();
        let callbacks = register_all(&manager, &vm);

        manager
            .dispatcher_listener()
            .on_navigated(&context(&vm, "provider", NavigationType::Page, NavigationMode::New));

        assert_eq!(outcomes(&callbacks), vec!["Some(true)", "pending", "pending"]);
    }

    #[test]
    fn test_non_matching_callbacks_stay_pending() {
        let manager = manager();
        let vm = ViewModelBase::new("TestViewModel").into_ref();
        let callbacks = register_all(&manager, &vm);
        let listener = manager.dispatcher_listener();

        listener.on_navigated(&context(&vm, "other", NavigationType::Page, NavigationMode::Close));
        listener.on_navigated(&context(&vm, "provider", NavigationType::Window, NavigationMode::Close));

        assert_eq!(outcomes(&callbacks), vec!["pending", "pending", "pending"]);
        assert_eq!(vm.metadata().get(&keys::SHOWING_CALLBACKS).unwrap().lock().len(), 1);
    }

    #[test]
    fn test_close_failure_cascades_but_close_cancel_does_not() {
        let manager = manager();
        let listener = manager.dispatcher_listener();

        let vm = ViewModelBase::new("TestViewModel").into_ref();
        let callbacks = register_all(&manager, &vm);
        listener.on_navigation_canceled(&context(&vm, "provider", NavigationType::Page, NavigationMode::Close));
        assert_eq!(outcomes(&callbacks), vec!["pending", "canceled", "pending"]);

        let vm = ViewModelBase::new("TestViewModel").into_ref();
        let callbacks = register_all(&manager, &vm);
        let error = Arc::new(anyhow::anyhow!("close failed"));
        listener.on_navigation_failed(&context(&vm, "provider", NavigationType::Page, NavigationMode::Close), &error);
        assert_eq!(outcomes(&callbacks), vec!["faulted", "faulted", "faulted"]);
    }

    #[test]
    fn test_show_cancel_cascades_only_for_new_navigations() {
        let manager = manager();
        let listener = manager.dispatcher_listener();

        let vm = ViewModelBase::new("TestViewModel").into_ref();
        let callbacks = register_all(&manager, &vm);
        listener.on_navigation_canceled(&context(&vm, "provider", NavigationType::Page, NavigationMode::New));
        assert_eq!(outcomes(&callbacks), vec!["canceled", "canceled", "canceled"]);

        let vm = ViewModelBase::new("TestViewModel").into_ref();
        let callbacks = register_all(&manager, &vm);
        listener.on_navigation_canceled(&context(&vm, "provider", NavigationType::Page, NavigationMode::Refresh));
        assert_eq!(outcomes(&callbacks), vec!["canceled", "pending", "pending"]);

        let vm = ViewModelBase::new("TestViewModel").into_ref();
        let callbacks = register_all(&manager, &vm);
        let error = Arc::new(anyhow::anyhow!("refresh failed"));
        listener.on_navigation_failed(&context(&vm, "provider", NavigationType::Page, NavigationMode::Refresh), &error);
        assert_eq!(outcomes(&callbacks), vec!["faulted", "faulted", "faulted"]);
    }

    #[test]
    fn test_navigating_canceled_is_a_veto() {
        let manager = manager();
        let vm = ViewModelBase::new("TestViewModel").into_ref();
        let callbacks = register_all(&manager, &vm);
        let listener = manager.dispatcher_listener();

        listener.on_navigating_canceled(&context(&vm, "provider", NavigationType::Page, NavigationMode::New));
        assert_eq!(outcomes(&callbacks), vec!["pending", "pending", "pending"]);

        listener.on_navigating_canceled(&context(&vm, "provider", NavigationType::Page, NavigationMode::Close));
        assert_eq!(outcomes(&callbacks), vec!["pending", "Some(false)", "pending"]);
    }

    #[test]
    fn test_executed_listener_sees_resolutions() {
        let manager = manager();
        let vm = ViewModelBase::new("TestViewModel").into_ref();
        let listener = Arc::new(RecordingCallbackListener::default());
        manager.add_listener(listener.clone());
        register_all(&manager, &vm);

        manager
            .dispatcher_listener()
            .on_navigated(&context(&vm, "provider", NavigationType::Page, NavigationMode::Close));
        assert_eq!(
            *listener.executed.lock(),
            vec![
                NavigationCallbackType::Showing,
                NavigationCallbackType::Closing,
                NavigationCallbackType::Close
            ]
        );

        let as_dyn: Arc<dyn NavigationCallbackListener> = listener.clone();
        assert!(manager.remove_listener(&as_dyn));
        assert!(!manager.remove_listener(&as_dyn));
    }

    #[test]
    fn test_get_callbacks_for_entry() {
        let manager = manager();
        let vm = ViewModelBase::new("TestViewModel").into_ref();
        register_all(&manager, &vm);

        let entry = NavigationEntry::new(vm.clone(), mv_core::NavigationProvider::new("provider"), NavigationType::Page);
        let metadata = MetadataContext::new();
        assert_eq!(manager.get_callbacks(&entry, None, &metadata).len(), 3);
        assert_eq!(
            manager
                .get_callbacks(&entry, Some(NavigationCallbackType::Closing), &metadata)
                .len(),
            1
        );

        let other = NavigationEntry::new(vm, mv_core::NavigationProvider::new("other"), NavigationType::Page);
        assert!(manager.get_callbacks(&other, None, &metadata).is_empty());

        assert_eq!(manager.get_callbacks_by_code(&entry, Some(2), &metadata).unwrap().len(), 1);
        assert!(matches!(
            manager.get_callbacks_by_code(&entry, Some(7), &metadata),
            Err(PresenterError::EnumOutOfRange { value: 7, .. })
        ));
    }

    #[test]
    fn test_journal_queries_reach_attached_manager() {
        let dispatcher = NavigationDispatcher::new();
        let manager = Arc::new(manager());
        manager.attach(&dispatcher);

        let vm = ViewModelBase::new("TestViewModel").into_ref();
        register_all(&manager, &vm);

        let entry = NavigationEntry::new(vm, mv_core::NavigationProvider::new("provider"), NavigationType::Page);
        assert_eq!(dispatcher.journal().get_callbacks(&entry, None, &MetadataContext::new()).len(), 3);
    }
}
