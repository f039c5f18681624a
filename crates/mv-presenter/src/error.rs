use mv_core::NavigationError;
use thiserror::Error;

/// Errors raised synchronously by presenter operations.
///
/// These are configuration or integration mistakes. Failures of the
/// navigation itself never surface here; they resolve the pending callbacks.
#[derive(Error, Debug)]
pub enum PresenterError {
    #[error("no presenter could show the request {metadata}")]
    CannotShowRequest { metadata: String },

    #[error("presenter result does not identify a view-model (request {request}, result {result})")]
    InvalidRequest { request: String, result: String },

    #[error("{value} is not a valid {name}")]
    EnumOutOfRange { name: &'static str, value: i64 },

    #[error("required metadata '{key}' is missing")]
    MissingMetadata { key: &'static str },

    #[error("Settings error: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<NavigationError> for PresenterError {
    fn from(error: NavigationError) -> Self {
        match error {
            NavigationError::EnumOutOfRange { name, value } => PresenterError::EnumOutOfRange { name, value },
        }
    }
}

pub type Result<T> = std::result::Result<T, PresenterError>;
