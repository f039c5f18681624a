//! Disposable action tokens

use parking_lot::Mutex;
use std::fmt;

type Action = Box<dyn FnOnce() + Send>;

/// A handle that runs its release action exactly once.
///
/// The action runs on the first call to [`ActionToken::dispose`] or when the
/// token is dropped, whichever comes first. Later calls are no-ops.
#[must_use = "dropping the token runs its release action immediately"]
pub struct ActionToken {
    action: Mutex<Option<Action>>,
}

impl ActionToken {
    /// Create a token that runs `action` on release
    pub fn new<F>(action: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            action: Mutex::new(Some(Box::new(action))),
        }
    }

    /// A token with nothing to release
    pub fn noop() -> Self {
        Self {
            action: Mutex::new(None),
        }
    }

    /// Whether the release action has not run yet
    pub fn is_active(&self) -> bool {
        self.action.lock().is_some()
    }

    /// Run the release action if it has not run yet
    pub fn dispose(&self) {
        // Take under the lock, run outside it so the action may touch the token's owner
        let action = self.action.lock().take();
        if let Some(action) = action {
            action();
        }
    }
}

impl Drop for ActionToken {
    fn drop(&mut self) {
        if let Some(action) = self.action.get_mut().take() {
            action();
        }
    }
}

impl fmt::Debug for ActionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionToken")
            .field("active", &self.is_active())
            .finish()
    }
}
