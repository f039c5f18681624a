use mv_core::MetadataContext;

use super::{request_view_model, ChildPresenter};
use crate::error::Result;
use crate::keys::CLOSE_HANDLER;
use crate::result::{CloseOutput, ShowOutput};
use crate::settings::CLOSE_HANDLER_PRESENTER_PRIORITY;

/// Closes view-models through the handler stored under [`CLOSE_HANDLER`]
///
/// Never shows anything.
pub struct CloseHandlerPresenter {
    priority: i32,
}

impl CloseHandlerPresenter {
    pub fn new(priority: i32) -> Self {
        Self { priority }
    }
}

impl Default for CloseHandlerPresenter {
    fn default() -> Self {
        Self::new(CLOSE_HANDLER_PRESENTER_PRIORITY)
    }
}

impl ChildPresenter for CloseHandlerPresenter {
    fn name(&self) -> &str {
        "close-handler"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn try_show(&self, _metadata: &MetadataContext) -> Result<Option<ShowOutput>> {
        Ok(None)
    }

    fn try_close(&self, metadata: &MetadataContext) -> Result<Vec<CloseOutput>> {
        let Some(view_model) = request_view_model(metadata) else {
            return Ok(Vec::new());
        };
        let Some(handler) = view_model.metadata().get(&CLOSE_HANDLER) else {
            return Ok(Vec::new());
        };

        tracing::debug!("Closing {:?} through its close handler", view_model);
        Ok(handler(&view_model, metadata)
            .map(|result| CloseOutput::from(result.with_presenter(self.name())))
            .into_iter()
            .collect())
    }
}
