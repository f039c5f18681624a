//! Presenter configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// Default priority of the mediator presenter
pub const MEDIATOR_PRESENTER_PRIORITY: i32 = 0;

/// Default priority of the window presenter; tried before plain mediators
pub const WINDOW_PRESENTER_PRIORITY: i32 = 10;

/// Default priority of the close-handler presenter; always consulted last
pub const CLOSE_HANDLER_PRESENTER_PRIORITY: i32 = i32::MIN;

/// Presenter settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenterSettings {
    /// Whether close callbacks of restorable navigations are marked serializable
    pub serializable_callbacks: bool,

    /// Priority of the navigation-mediator presenter
    pub mediator_presenter_priority: i32,

    /// Priority of the window presenter
    pub window_presenter_priority: i32,

    /// Priority of the close-handler presenter
    pub close_handler_presenter_priority: i32,
}

impl Default for PresenterSettings {
    fn default() -> Self {
        Self {
            serializable_callbacks: false,
            mediator_presenter_priority: MEDIATOR_PRESENTER_PRIORITY,
            window_presenter_priority: WINDOW_PRESENTER_PRIORITY,
            close_handler_presenter_priority: CLOSE_HANDLER_PRESENTER_PRIORITY,
        }
    }
}

impl PresenterSettings {
    /// Parse settings from JSON; missing fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!("Loading presenter settings from {:?}", path);
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}
