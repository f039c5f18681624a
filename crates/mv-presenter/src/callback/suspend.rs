use mv_core::{ActionToken, NavigationContext, NavigationDispatcherListener, NavigationFault};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use super::manager::CallbackRegistry;
use super::DispatcherEvent;

struct PendingEvent {
    context: NavigationContext,
    event: DispatcherEvent,
}

#[derive(Default)]
struct SuspendState {
    suspend_count: usize,
    /// Set while one thread drains the queue; other events queue behind it
    replaying: bool,
    pending: VecDeque<PendingEvent>,
}

/// Dispatcher listener that can hold events back and replay them in order
///
/// While at least one suspension token is alive, incoming events are queued.
/// Releasing the last token replays them first-in first-out.
pub struct SuspendableDispatcherListener {
    registry: Arc<CallbackRegistry>,
    state: Mutex<SuspendState>,
}

impl SuspendableDispatcherListener {
    pub(crate) fn new(registry: Arc<CallbackRegistry>) -> Self {
        Self {
            registry,
            state: Mutex::new(SuspendState::default()),
        }
    }

    /// Suspend event processing until the returned token is released
    pub fn suspend(self: &Arc<Self>) -> ActionToken {
        self.state.lock().suspend_count += 1;
        let listener = self.clone();
        ActionToken::new(move || listener.release())
    }

    pub fn is_suspended(&self) -> bool {
        self.state.lock().suspend_count > 0
    }

    /// Number of events waiting for replay
    pub fn pending_count(&self) -> usize {
        self.state.lock().pending.len()
    }

    fn release(&self) {
        {
            let mut state = self.state.lock();
            state.suspend_count = state.suspend_count.saturating_sub(1);
            if state.suspend_count > 0 || state.replaying {
                return;
            }
            if state.pending.is_empty() {
                return;
            }
            tracing::trace!("Replaying {} suspended navigation events", state.pending.len());
            state.replaying = true;
        }
        self.drain();
    }

    fn drain(&self) {
        let mut guard = ReplayGuard {
            state: &self.state,
            armed: true,
        };
        loop {
            let next = {
                let mut state = self.state.lock();
                let next = if state.suspend_count > 0 {
                    None
                } else {
                    state.pending.pop_front()
                };
                if next.is_none() {
                    state.replaying = false;
                    guard.armed = false;
                }
                next
            };

            match next {
                Some(pending) => self.registry.resolve(&pending.context, &pending.event),
                None => return,
            }
        }
    }

    fn handle(&self, context: &NavigationContext, event: DispatcherEvent) {
        {
            let mut state = self.state.lock();
            if state.suspend_count > 0 || state.replaying {
                tracing::trace!("Queueing {:?} for {:?}", event, context);
                state.pending.push_back(PendingEvent {
                    context: context.clone(),
                    event,
                });
                return;
            }
            if !state.pending.is_empty() {
                // events left behind by an interrupted replay go first
                tracing::debug!("Resuming replay of {} navigation events", state.pending.len());
                state.pending.push_back(PendingEvent {
                    context: context.clone(),
                    event,
                });
                state.replaying = true;
            } else {
                drop(state);
                self.registry.resolve(context, &event);
                return;
            }
        }
        self.drain();
    }
}

/// Hands the queue back if a resolution unwinds out of [`SuspendableDispatcherListener::drain`]
struct ReplayGuard<'a> {
    state: &'a Mutex<SuspendState>,
    armed: bool,
}

impl Drop for ReplayGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut state = self.state.lock();
            tracing::warn!("Navigation event replay interrupted with {} events left", state.pending.len());
            state.replaying = false;
        }
    }
}

impl NavigationDispatcherListener for SuspendableDispatcherListener {
    fn on_navigated(&self, context: &NavigationContext) {
        self.handle(context, DispatcherEvent::Navigated);
    }

    fn on_navigation_failed(&self, context: &NavigationContext, error: &NavigationFault) {
        self.handle(context, DispatcherEvent::NavigationFailed(error.clone()));
    }

    fn on_navigation_canceled(&self, context: &NavigationContext) {
        self.handle(context, DispatcherEvent::NavigationCanceled);
    }

    fn on_navigating_canceled(&self, context: &NavigationContext) {
        self.handle(context, DispatcherEvent::NavigatingCanceled);
    }
}
