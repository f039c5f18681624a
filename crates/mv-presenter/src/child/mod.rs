//! Child presenters
//!
//! Each child presenter knows how to show, close and optionally restore one
//! kind of navigation target. The [`ViewModelPresenter`] asks them in
//! priority order; returning `None` (or an empty list) means the request is
//! not theirs.
//!
//! [`ViewModelPresenter`]: crate::ViewModelPresenter

mod close_handler;
mod mediator;
mod window;

pub use close_handler::CloseHandlerPresenter;
pub use mediator::NavigationMediatorPresenter;
pub use window::{WindowMediatorFactory, WindowPresenter};

use mv_core::metadata::keys::VIEW_MODEL;
use mv_core::{MetadataContext, ViewModelRef};

use crate::error::Result;
use crate::result::{ChildPresenterResult, CloseOutput, ShowOutput};

pub trait ChildPresenter: Send + Sync {
    fn name(&self) -> &str;

    /// Higher priorities are asked first
    fn priority(&self) -> i32;

    fn try_show(&self, metadata: &MetadataContext) -> Result<Option<ShowOutput>>;

    fn try_close(&self, metadata: &MetadataContext) -> Result<Vec<CloseOutput>>;

    /// Restore capability, if this presenter has one
    fn as_restorable(&self) -> Option<&dyn RestorableChildPresenter> {
        None
    }
}

pub trait RestorableChildPresenter: Send + Sync {
    fn try_restore(&self, metadata: &MetadataContext) -> Result<Option<ChildPresenterResult>>;
}

fn request_view_model(metadata: &MetadataContext) -> Option<ViewModelRef> {
    metadata.get(&VIEW_MODEL)
}
