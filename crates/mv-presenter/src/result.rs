//! Presenter results

use mv_core::{MetadataContext, NavigationCallback, NavigationProvider, NavigationType, ViewModelRef};
use std::sync::Arc;

/// Raw outcome of one child presenter's show/close/restore attempt
#[derive(Debug, Clone)]
pub struct ChildPresenterResult {
    pub navigation_provider: NavigationProvider,
    pub navigation_type: NavigationType,
    pub metadata: MetadataContext,
    /// Name of the child presenter that produced the result
    pub presenter: Option<String>,
}

impl ChildPresenterResult {
    pub fn new(navigation_provider: NavigationProvider, navigation_type: NavigationType, metadata: MetadataContext) -> Self {
        Self {
            navigation_provider,
            navigation_type,
            metadata,
            presenter: None,
        }
    }

    /// Record the producing presenter unless one is already recorded
    pub fn with_presenter(mut self, name: &str) -> Self {
        if self.presenter.is_none() {
            self.presenter = Some(name.to_string());
        }
        self
    }
}

/// Result of a successful show
#[derive(Debug, Clone)]
pub struct ViewModelPresenterResult {
    pub view_model: ViewModelRef,
    pub result: ChildPresenterResult,
    /// Completes when the show navigation finishes, fails or is canceled
    pub showing_callback: Arc<NavigationCallback>,
    /// Completes when the view-model is eventually closed
    pub close_callback: Arc<NavigationCallback>,
}

/// Result of a close attempt for one view-model
#[derive(Debug, Clone)]
pub struct ClosingPresenterResult {
    pub view_model: ViewModelRef,
    pub result: ChildPresenterResult,
    /// Completes with `true` once closed, `false` if the close was vetoed
    pub closing_callback: Arc<NavigationCallback>,
}

/// Result of a restore attempt
#[derive(Debug, Clone)]
pub struct RestorationPresenterResult {
    pub result: Option<ChildPresenterResult>,
    pub is_restored: bool,
}

impl RestorationPresenterResult {
    pub fn restored(result: ChildPresenterResult) -> Self {
        Self {
            result: Some(result),
            is_restored: true,
        }
    }

    /// Nothing was restored
    pub fn unrestored() -> Self {
        Self {
            result: None,
            is_restored: false,
        }
    }
}

/// What a child presenter hands back from `try_show`
#[derive(Debug, Clone)]
pub enum ShowOutput {
    /// Needs callbacks before it can be returned to the caller
    Child(ChildPresenterResult),
    /// Already carries its callbacks
    Presented(ViewModelPresenterResult),
}

impl ShowOutput {
    pub fn result(&self) -> &ChildPresenterResult {
        match self {
            ShowOutput::Child(result) => result,
            ShowOutput::Presented(presented) => &presented.result,
        }
    }
}

impl From<ChildPresenterResult> for ShowOutput {
    fn from(result: ChildPresenterResult) -> Self {
        ShowOutput::Child(result)
    }
}

/// What a child presenter hands back from `try_close`
#[derive(Debug, Clone)]
pub enum CloseOutput {
    Child(ChildPresenterResult),
    Closing(ClosingPresenterResult),
}

impl CloseOutput {
    pub fn result(&self) -> &ChildPresenterResult {
        match self {
            CloseOutput::Child(result) => result,
            CloseOutput::Closing(closing) => &closing.result,
        }
    }
}

impl From<ChildPresenterResult> for CloseOutput {
    fn from(result: ChildPresenterResult) -> Self {
        CloseOutput::Child(result)
    }
}
