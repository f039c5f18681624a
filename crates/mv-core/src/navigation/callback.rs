//! Awaitable navigation callbacks

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::watch;

use super::{NavigationContext, NavigationFault, NavigationType};
use crate::error::NavigationError;

/// Which phase of a view-model's navigation a callback tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NavigationCallbackType {
    /// Completes when the show navigation finishes
    Showing,
    /// Completes with `true` when a close goes through, `false` when it is vetoed
    Closing,
    /// Completes once the view-model is eventually closed
    Close,
}

impl NavigationCallbackType {
    pub const ALL: [NavigationCallbackType; 3] = [
        NavigationCallbackType::Showing,
        NavigationCallbackType::Closing,
        NavigationCallbackType::Close,
    ];

    /// Stable numeric code used by serialized journals
    pub fn code(self) -> u8 {
        match self {
            NavigationCallbackType::Showing => 0,
            NavigationCallbackType::Closing => 1,
            NavigationCallbackType::Close => 2,
        }
    }
}

impl TryFrom<u8> for NavigationCallbackType {
    type Error = NavigationError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(NavigationCallbackType::Showing),
            1 => Ok(NavigationCallbackType::Closing),
            2 => Ok(NavigationCallbackType::Close),
            other => Err(NavigationError::EnumOutOfRange {
                name: "NavigationCallbackType",
                value: i64::from(other),
            }),
        }
    }
}

/// Terminal state of a [`NavigationCallback`]
#[derive(Debug, Clone)]
pub enum CallbackOutcome {
    Completed(bool),
    Faulted(NavigationFault),
    Canceled,
}

impl CallbackOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, CallbackOutcome::Completed(_))
    }

    pub fn is_faulted(&self) -> bool {
        matches!(self, CallbackOutcome::Faulted(_))
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, CallbackOutcome::Canceled)
    }

    /// The completion value, if the callback completed
    pub fn value(&self) -> Option<bool> {
        match self {
            CallbackOutcome::Completed(value) => Some(*value),
            _ => None,
        }
    }
}

/// Single-shot result holder for one in-flight navigation
///
/// A callback moves from pending to exactly one terminal
/// [`CallbackOutcome`]. Any number of tasks may [`wait`](Self::wait) on it,
/// and an outcome set before anyone waits is kept.
pub struct NavigationCallback {
    callback_type: NavigationCallbackType,
    navigation_provider_id: String,
    navigation_type: NavigationType,
    is_serializable: bool,
    state: watch::Sender<Option<CallbackOutcome>>,
}

impl NavigationCallback {
    pub fn new(
        callback_type: NavigationCallbackType,
        navigation_provider_id: impl Into<String>,
        navigation_type: NavigationType,
        is_serializable: bool,
    ) -> Self {
        let (state, _) = watch::channel(None);
        Self {
            callback_type,
            navigation_provider_id: navigation_provider_id.into(),
            navigation_type,
            is_serializable,
            state,
        }
    }

    pub fn callback_type(&self) -> NavigationCallbackType {
        self.callback_type
    }

    pub fn navigation_provider_id(&self) -> &str {
        &self.navigation_provider_id
    }

    pub fn navigation_type(&self) -> &NavigationType {
        &self.navigation_type
    }

    pub fn is_serializable(&self) -> bool {
        self.is_serializable
    }

    /// Whether this callback belongs to the navigation described by `context`
    pub fn matches(&self, context: &NavigationContext) -> bool {
        self.navigation_provider_id == context.provider.id() && self.navigation_type == context.navigation_type
    }

    pub fn is_pending(&self) -> bool {
        self.state.borrow().is_none()
    }

    /// Current outcome without waiting
    pub fn outcome(&self) -> Option<CallbackOutcome> {
        self.state.borrow().clone()
    }

    /// Complete with a value; returns `false` if the callback was already terminal
    pub fn set_result(&self, value: bool, context: &NavigationContext) -> bool {
        self.complete(CallbackOutcome::Completed(value), context)
    }

    /// Fault with a navigation error; returns `false` if the callback was already terminal
    pub fn set_exception(&self, error: NavigationFault, context: &NavigationContext) -> bool {
        self.complete(CallbackOutcome::Faulted(error), context)
    }

    /// Cancel; returns `false` if the callback was already terminal
    pub fn set_canceled(&self, context: &NavigationContext) -> bool {
        self.complete(CallbackOutcome::Canceled, context)
    }

    /// Wait until the callback reaches a terminal state
    pub async fn wait(&self) -> CallbackOutcome {
        let mut receiver = self.state.subscribe();
        let outcome = match receiver.wait_for(Option::is_some).await {
            Ok(state) => (*state).clone(),
            // The sender lives in `self`, so the channel cannot close while we wait
            Err(_) => None,
        };
        outcome.unwrap_or(CallbackOutcome::Canceled)
    }

    fn complete(&self, outcome: CallbackOutcome, context: &NavigationContext) -> bool {
        let description = format!("{:?}", outcome);
        let applied = self.state.send_if_modified(move |state| {
            if state.is_some() {
                return false;
            }
            *state = Some(outcome);
            true
        });

        if applied {
            tracing::trace!(
                "{:?} callback for '{}' ({}) resolved as {} by navigation {}",
                self.callback_type,
                self.navigation_provider_id,
                self.navigation_type,
                description,
                context.navigation_id
            );
        } else {
            tracing::debug!(
                "{:?} callback for '{}' already resolved; ignoring {}",
                self.callback_type,
                self.navigation_provider_id,
                description
            );
        }
        applied
    }
}

impl fmt::Debug for NavigationCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationCallback")
            .field("callback_type", &self.callback_type)
            .field("navigation_provider_id", &self.navigation_provider_id)
            .field("navigation_type", &self.navigation_type)
            .field("is_serializable", &self.is_serializable)
            .field("outcome", &*self.state.borrow())
            .finish()
    }
}
