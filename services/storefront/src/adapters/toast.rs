//! services/storefront/src/adapters/toast.rs
//!
//! The adapter behind the `Notifier` port. Every toast is logged and fanned out
//! to whichever views are subscribed.

use markethub_core::domain::{Notification, NotificationKind};
use markethub_core::ports::Notifier;
use tokio::sync::broadcast;
use tracing::{info, warn};

const TOAST_CAPACITY: usize = 32;

#[derive(Clone)]
pub struct ToastNotifier {
    feed: broadcast::Sender<Notification>,
}

impl ToastNotifier {
    pub fn new() -> Self {
        let (feed, _) = broadcast::channel(TOAST_CAPACITY);
        Self { feed }
    }

    /// Toasts emitted after this call. Slow subscribers lose the oldest ones.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.feed.subscribe()
    }
}

impl Default for ToastNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for ToastNotifier {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Error => warn!(toast = %notification.message),
            NotificationKind::Success | NotificationKind::Info => {
                info!(toast = %notification.message)
            }
        }
        let _ = self.feed.send(notification);
    }
}
