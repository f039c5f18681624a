//! Navigation journal: open entries and callback queries

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::{Arc, Weak};

use super::{
    NavigationCallback, NavigationCallbackType, NavigationContext, NavigationDispatcherListener,
    NavigationProvider, NavigationType,
};
use crate::metadata::MetadataContext;
use crate::view_model::{ViewModelId, ViewModelRef};

/// One open navigation recorded by the journal
#[derive(Clone)]
pub struct NavigationEntry {
    pub target: ViewModelRef,
    pub provider: NavigationProvider,
    pub navigation_type: NavigationType,
    pub navigation_id: String,
    pub opened_at: DateTime<Utc>,
}

impl NavigationEntry {
    pub fn new(target: ViewModelRef, provider: NavigationProvider, navigation_type: NavigationType) -> Self {
        Self {
            target,
            provider,
            navigation_type,
            navigation_id: uuid::Uuid::new_v4().to_string(),
            opened_at: Utc::now(),
        }
    }

    fn from_context(context: &NavigationContext) -> Self {
        Self {
            target: context.target.clone(),
            provider: context.provider.clone(),
            navigation_type: context.navigation_type.clone(),
            navigation_id: context.navigation_id.clone(),
            opened_at: Utc::now(),
        }
    }

    fn is_same_navigation(&self, context: &NavigationContext) -> bool {
        self.target.id() == context.target.id()
            && self.provider == context.provider
            && self.navigation_type == context.navigation_type
    }
}

impl std::fmt::Debug for NavigationEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationEntry")
            .field("target", &self.target)
            .field("provider", &self.provider.id())
            .field("navigation_type", &self.navigation_type)
            .field("navigation_id", &self.navigation_id)
            .field("opened_at", &self.opened_at)
            .finish()
    }
}

/// Answers which callbacks are outstanding for a journal entry
pub trait NavigationCallbackProvider: Send + Sync {
    fn get_callbacks(
        &self,
        entry: &NavigationEntry,
        callback_type: Option<NavigationCallbackType>,
        metadata: &MetadataContext,
    ) -> Vec<Arc<NavigationCallback>>;
}

/// Tracks open navigations and routes callback queries to registered providers
#[derive(Default)]
pub struct NavigationJournal {
    entries: RwLock<Vec<NavigationEntry>>,
    callback_providers: RwLock<Vec<Weak<dyn NavigationCallbackProvider>>>,
}

impl NavigationJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback provider; the journal only keeps a weak reference
    pub fn add_callback_provider(&self, provider: Arc<dyn NavigationCallbackProvider>) {
        self.callback_providers.write().push(Arc::downgrade(&provider));
    }

    pub fn remove_callback_provider(&self, provider: &Arc<dyn NavigationCallbackProvider>) -> bool {
        let target = Arc::as_ptr(provider) as *const ();
        let mut providers = self.callback_providers.write();
        providers.retain(|weak| weak.strong_count() > 0);
        let before = providers.len();
        providers.retain(|weak| weak.as_ptr() as *const () != target);
        providers.len() != before
    }

    /// Snapshot of all open entries, oldest first
    pub fn entries(&self) -> Vec<NavigationEntry> {
        self.entries.read().clone()
    }

    /// Open entries for one view-model
    pub fn entries_for(&self, view_model_id: ViewModelId) -> Vec<NavigationEntry> {
        self.entries
            .read()
            .iter()
            .filter(|entry| entry.target.id() == view_model_id)
            .cloned()
            .collect()
    }

    /// Outstanding callbacks for `entry` across every registered provider
    pub fn get_callbacks(
        &self,
        entry: &NavigationEntry,
        callback_type: Option<NavigationCallbackType>,
        metadata: &MetadataContext,
    ) -> Vec<Arc<NavigationCallback>> {
        let providers: Vec<_> = {
            let mut providers = self.callback_providers.write();
            providers.retain(|weak| weak.strong_count() > 0);
            providers.iter().filter_map(Weak::upgrade).collect()
        };

        providers
            .iter()
            .flat_map(|provider| provider.get_callbacks(entry, callback_type, metadata))
            .collect()
    }
}

impl NavigationDispatcherListener for NavigationJournal {
    fn on_navigated(&self, context: &NavigationContext) {
        let mut entries = self.entries.write();
        if context.mode.is_close() {
            entries.retain(|entry| !entry.is_same_navigation(context));
            return;
        }

        if !entries.iter().any(|entry| entry.is_same_navigation(context)) {
            tracing::debug!(
                "Journal opened {:?} for {:?} via '{}'",
                context.navigation_type,
                context.target,
                context.provider
            );
            entries.push(NavigationEntry::from_context(context));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::NavigationMode;
    use crate::view_model::ViewModelBase;

    #[test]
    fn test_entries_follow_navigations() {
        let journal = NavigationJournal::new();
        let vm = ViewModelBase::new("TestViewModel").into_ref();
        let provider = NavigationProvider::new("provider");

        let open = NavigationContext::new(vm.clone(), provider.clone(), NavigationType::Page, NavigationMode::New);
        journal.on_navigated(&open);
        journal.on_navigated(&NavigationContext::new(
            vm.clone(),
            provider.clone(),
            NavigationType::Page,
            NavigationMode::Refresh,
        ));
        assert_eq!(journal.entries_for(vm.id()).len(), 1);

        journal.on_navigated(&NavigationContext::new(vm.clone(), provider, NavigationType::Page, NavigationMode::Close));
        assert!(journal.entries().is_empty());
    }

    struct FixedProvider(Arc<NavigationCallback>);

    impl NavigationCallbackProvider for FixedProvider {
        fn get_callbacks(
            &self,
            _entry: &NavigationEntry,
            _callback_type: Option<NavigationCallbackType>,
            _metadata: &MetadataContext,
        ) -> Vec<Arc<NavigationCallback>> {
            vec![self.0.clone()]
        }
    }

    #[test]
    fn test_dropped_providers_are_pruned() {
        let journal = NavigationJournal::new();
        let callback = Arc::new(NavigationCallback::new(
            NavigationCallbackType::Close,
            "provider",
            NavigationType::Page,
            false,
        ));
        let provider: Arc<dyn NavigationCallbackProvider> = Arc::new(FixedProvider(callback));
        journal.add_callback_provider(provider.clone());

        let entry = NavigationEntry::new(
            ViewModelBase::new("TestViewModel").into_ref(),
            NavigationProvider::new("provider"),
            NavigationType::Page,
        );
        assert_eq!(journal.get_callbacks(&entry, None, &MetadataContext::new()).len(), 1);

        drop(provider);
        assert!(journal.get_callbacks(&entry, None, &MetadataContext::new()).is_empty());
    }

    #[test]
    fn test_remove_reports_only_the_target() {
        let journal = NavigationJournal::new();
        let callback = Arc::new(NavigationCallback::new(
            NavigationCallbackType::Close,
            "provider",
            NavigationType::Page,
            false,
        ));
        let dropped: Arc<dyn NavigationCallbackProvider> = Arc::new(FixedProvider(callback.clone()));
        let kept: Arc<dyn NavigationCallbackProvider> = Arc::new(FixedProvider(callback.clone()));
        let stranger: Arc<dyn NavigationCallbackProvider> = Arc::new(FixedProvider(callback));
        journal.add_callback_provider(dropped.clone());
        journal.add_callback_provider(kept.clone());
        drop(dropped);

        assert!(!journal.remove_callback_provider(&stranger));
        assert!(journal.remove_callback_provider(&kept));
        assert!(!journal.remove_callback_provider(&kept));
    }
}
