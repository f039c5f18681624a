//! The view-model presenter
//!
//! [`ViewModelPresenter`] is the entry point for showing, closing and
//! restoring view-models. It asks its child presenters in priority order,
//! turns their raw results into callback-bearing results and notifies
//! presenter listeners. Dispatcher events are held back for the duration of
//! each operation so the callbacks it creates cannot miss them.

mod listener;

pub use listener::{
    ChildPresenterChangedListener, ConditionPresenterListener, PresenterListener, PresenterResultListener,
};

use mv_core::metadata::keys::VIEW_MODEL;
use mv_core::{MetadataContext, NavigationCallbackType, ViewModelRef};
use parking_lot::RwLock;
use std::sync::Arc;

use crate::callback::PresenterCallbackManager;
use crate::child::ChildPresenter;
use crate::error::{PresenterError, Result};
use crate::result::{
    ChildPresenterResult, CloseOutput, ClosingPresenterResult, RestorationPresenterResult, ShowOutput,
    ViewModelPresenterResult,
};

pub struct ViewModelPresenter {
    presenters: RwLock<Vec<Arc<dyn ChildPresenter>>>,
    listeners: RwLock<Vec<Arc<dyn PresenterListener>>>,
    callback_manager: Arc<PresenterCallbackManager>,
}

impl ViewModelPresenter {
    pub fn new(callback_manager: Arc<PresenterCallbackManager>) -> Self {
        Self {
            presenters: RwLock::new(Vec::new()),
            listeners: RwLock::new(Vec::new()),
            callback_manager,
        }
    }

    pub fn callback_manager(&self) -> &Arc<PresenterCallbackManager> {
        &self.callback_manager
    }

    /// Child presenters, highest priority first
    pub fn presenters(&self) -> Vec<Arc<dyn ChildPresenter>> {
        self.presenters.read().clone()
    }

    /// Insert `child` after every presenter of equal or higher priority
    pub fn add_presenter(&self, child: Arc<dyn ChildPresenter>) {
        {
            let mut presenters = self.presenters.write();
            let index = presenters
                .iter()
                .position(|p| p.priority() < child.priority())
                .unwrap_or(presenters.len());
            presenters.insert(index, child.clone());
        }
        tracing::debug!("Added child presenter '{}' (priority {})", child.name(), child.priority());

        for listener in self.listeners() {
            if let Some(listener) = listener.as_child_presenter_listener() {
                listener.on_child_presenter_added(self, &child);
            }
        }
    }

    pub fn remove_presenter(&self, child: &Arc<dyn ChildPresenter>) -> bool {
        let removed = {
            let mut presenters = self.presenters.write();
            let before = presenters.len();
            presenters.retain(|p| !Arc::ptr_eq(p, child));
            presenters.len() != before
        };
        if removed {
            for listener in self.listeners() {
                if let Some(listener) = listener.as_child_presenter_listener() {
                    listener.on_child_presenter_removed(self, child);
                }
            }
        }
        removed
    }

    pub fn add_listener(&self, listener: Arc<dyn PresenterListener>) {
        self.listeners.write().push(listener);
    }

    pub fn remove_listener(&self, listener: &Arc<dyn PresenterListener>) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|l| !Arc::ptr_eq(l, listener));
        listeners.len() != before
    }

    fn listeners(&self) -> Vec<Arc<dyn PresenterListener>> {
        self.listeners.read().clone()
    }

    /// Show the view-model described by `metadata`
    ///
    /// The first child presenter that accepts the request wins. The returned
    /// callbacks complete asynchronously as the navigation progresses.
    pub fn show(&self, metadata: &MetadataContext) -> Result<ViewModelPresenterResult> {
        let _suspended = self.callback_manager.begin_presenter_operation();
        let listeners = self.listeners();

        for child in self.presenters() {
            let allowed = listeners
                .iter()
                .filter_map(|l| l.as_condition_listener())
                .all(|l| l.can_show(self, child.as_ref(), metadata));
            if !allowed {
                tracing::trace!("Show through '{}' vetoed", child.name());
                continue;
            }

            let Some(output) = child.try_show(metadata)? else {
                continue;
            };
            let result = match output {
                ShowOutput::Presented(result) => result,
                ShowOutput::Child(result) => {
                    let view_model = resolve_view_model(metadata, &result)?;
                    let showing_callback =
                        self.callback_manager
                            .add_callback(&view_model, NavigationCallbackType::Showing, &result);
                    let close_callback =
                        self.callback_manager
                            .add_callback(&view_model, NavigationCallbackType::Close, &result);
                    ViewModelPresenterResult {
                        view_model,
                        result,
                        showing_callback,
                        close_callback,
                    }
                }
            };

            tracing::debug!("'{}' showed {:?}", child.name(), result.view_model);
            for listener in &listeners {
                if let Some(listener) = listener.as_result_listener() {
                    listener.on_shown(self, metadata, &result);
                }
            }
            return Ok(result);
        }

        Err(PresenterError::CannotShowRequest {
            metadata: metadata.dump(),
        })
    }

    /// Ask every child presenter to close what `metadata` describes
    ///
    /// An empty list means nothing was open.
    pub fn try_close(&self, metadata: &MetadataContext) -> Result<Vec<ClosingPresenterResult>> {
        let _suspended = self.callback_manager.begin_presenter_operation();
        let listeners = self.listeners();

        let mut outputs: Vec<CloseOutput> = Vec::new();
        for child in self.presenters() {
            let allowed = listeners
                .iter()
                .filter_map(|l| l.as_condition_listener())
                .all(|l| l.can_close(self, child.as_ref(), &outputs, metadata));
            if allowed {
                outputs.extend(child.try_close(metadata)?);
            }
        }

        // a missing view-model fails the request before any callback is registered
        let steps = outputs
            .into_iter()
            .map(|output| -> Result<CloseStep> {
                Ok(match output {
                    CloseOutput::Closing(result) => CloseStep::Done(result),
                    CloseOutput::Child(result) => CloseStep::Register(resolve_view_model(metadata, &result)?, result),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let results: Vec<ClosingPresenterResult> = steps
            .into_iter()
            .map(|step| match step {
                CloseStep::Done(result) => result,
                CloseStep::Register(view_model, result) => {
                    let closing_callback =
                        self.callback_manager
                            .add_callback(&view_model, NavigationCallbackType::Closing, &result);
                    ClosingPresenterResult {
                        view_model,
                        result,
                        closing_callback,
                    }
                }
            })
            .collect();

        tracing::debug!("Close request produced {} results", results.len());
        for listener in &listeners {
            if let Some(listener) = listener.as_result_listener() {
                listener.on_closed(self, metadata, &results);
            }
        }
        Ok(results)
    }

    /// Reattach a view the host recreated on its own
    pub fn try_restore(&self, metadata: &MetadataContext) -> Result<RestorationPresenterResult> {
        let _suspended = self.callback_manager.begin_presenter_operation();
        let listeners = self.listeners();

        let mut restoration = RestorationPresenterResult::unrestored();
        for child in self.presenters() {
            let Some(restorable) = child.as_restorable() else {
                continue;
            };
            let allowed = listeners
                .iter()
                .filter_map(|l| l.as_condition_listener())
                .all(|l| l.can_restore(self, child.as_ref(), metadata));
            if !allowed {
                continue;
            }
            if let Some(result) = restorable.try_restore(metadata)? {
                tracing::debug!("'{}' restored the view", child.name());
                restoration = RestorationPresenterResult::restored(result);
                break;
            }
        }

        for listener in &listeners {
            if let Some(listener) = listener.as_result_listener() {
                listener.on_restored(self, metadata, &restoration);
            }
        }
        Ok(restoration)
    }
}

enum CloseStep {
    Done(ClosingPresenterResult),
    Register(ViewModelRef, ChildPresenterResult),
}

/// Request metadata takes precedence over the result's own
fn resolve_view_model(metadata: &MetadataContext, result: &ChildPresenterResult) -> Result<ViewModelRef> {
    metadata
        .get(&VIEW_MODEL)
        .or_else(|| result.metadata.get(&VIEW_MODEL))
        .ok_or_else(|| PresenterError::InvalidRequest {
            request: metadata.dump(),
            result: result.metadata.dump(),
        })
}
