//! Navigation dispatcher listener trait

use super::{NavigationContext, NavigationFault};

/// Trait for components that react to navigation lifecycle events.
///
/// Every method defaults to doing nothing.
pub trait NavigationDispatcherListener: Send + Sync {
    /// A navigation completed
    fn on_navigated(&self, _context: &NavigationContext) {}

    /// A navigation failed after it started
    fn on_navigation_failed(&self, _context: &NavigationContext, _error: &NavigationFault) {}

    /// A navigation was canceled after it started
    fn on_navigation_canceled(&self, _context: &NavigationContext) {}

    /// A pending close was vetoed before it started
    fn on_navigating_canceled(&self, _context: &NavigationContext) {}
}
