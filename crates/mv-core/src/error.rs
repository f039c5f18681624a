use thiserror::Error;

/// Errors raised by the navigation contracts themselves
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("{value} is not a valid {name}")]
    EnumOutOfRange { name: &'static str, value: i64 },
}
