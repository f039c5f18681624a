use mv_core::MetadataContext;
use std::sync::Arc;

use super::ViewModelPresenter;
use crate::child::ChildPresenter;
use crate::result::{CloseOutput, ClosingPresenterResult, RestorationPresenterResult, ViewModelPresenterResult};

/// A presenter listener; it opts into capabilities by returning `Some(self)`
pub trait PresenterListener: Send + Sync {
    fn as_child_presenter_listener(&self) -> Option<&dyn ChildPresenterChangedListener> {
        None
    }

    fn as_result_listener(&self) -> Option<&dyn PresenterResultListener> {
        None
    }

    fn as_condition_listener(&self) -> Option<&dyn ConditionPresenterListener> {
        None
    }
}

pub trait ChildPresenterChangedListener {
    fn on_child_presenter_added(&self, _presenter: &ViewModelPresenter, _child: &Arc<dyn ChildPresenter>) {}

    fn on_child_presenter_removed(&self, _presenter: &ViewModelPresenter, _child: &Arc<dyn ChildPresenter>) {}
}

pub trait PresenterResultListener {
    fn on_shown(&self, _presenter: &ViewModelPresenter, _metadata: &MetadataContext, _result: &ViewModelPresenterResult) {
    }

    fn on_closed(
        &self,
        _presenter: &ViewModelPresenter,
        _metadata: &MetadataContext,
        _results: &[ClosingPresenterResult],
    ) {
    }

    fn on_restored(
        &self,
        _presenter: &ViewModelPresenter,
        _metadata: &MetadataContext,
        _result: &RestorationPresenterResult,
    ) {
    }
}

/// Veto hooks; anything not overridden is allowed
pub trait ConditionPresenterListener {
    fn can_show(&self, _presenter: &ViewModelPresenter, _child: &dyn ChildPresenter, _metadata: &MetadataContext) -> bool {
        true
    }

    /// `current` holds what earlier child presenters already returned
    fn can_close(
        &self,
        _presenter: &ViewModelPresenter,
        _child: &dyn ChildPresenter,
        _current: &[CloseOutput],
        _metadata: &MetadataContext,
    ) -> bool {
        true
    }

    fn can_restore(
        &self,
        _presenter: &ViewModelPresenter,
        _child: &dyn ChildPresenter,
        _metadata: &MetadataContext,
    ) -> bool {
        true
    }
}
