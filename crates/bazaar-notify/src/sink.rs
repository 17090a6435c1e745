//! The two seams of the notification path.
//!
//! - [`NotificationSink`]: what the escrow engine calls. Infallible and
//!   non-blocking from the caller's point of view.
//! - [`Transport`]: what the chat layer implements to actually reach a
//!   recipient. Fallible; failures are logged by the [`Dispatcher`].
//!
//! [`Dispatcher`]: crate::Dispatcher

use std::fmt;

use bazaar_types::Notification;

use crate::NotifyError;

/// Receives notifications from the core.
///
/// Implementations must return promptly and must not report delivery
/// outcome to the caller.
pub trait NotificationSink: Send + Sync {
    /// Hand off one notification for one recipient.
    fn notify(&self, notification: Notification);
}

/// Renders and delivers a notification to its recipient.
pub trait Transport: Send + Sync + fmt::Debug {
    /// Deliver `notification` to `notification.recipient`.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::DeliveryFailed` if the recipient cannot be
    /// reached.
    fn deliver(&self, notification: &Notification) -> Result<(), NotifyError>;
}

// ---------------------------------------------------------------------------
// RecordingSink
// ---------------------------------------------------------------------------

/// Sink that keeps every notification in memory. **Test helper.**
#[cfg(any(test, feature = "test-helpers"))]
#[derive(Debug, Default)]
pub struct RecordingSink {
    seen: parking_lot::Mutex<Vec<Notification>>,
}

#[cfg(any(test, feature = "test-helpers"))]
impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain and return everything recorded so far.
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.seen.lock())
    }

    /// Kinds delivered to `recipient`, in arrival order.
    pub fn kinds_for(&self, recipient: bazaar_types::ActorId) -> Vec<bazaar_types::EventKind> {
        self.seen
            .lock()
            .iter()
            .filter(|n| n.recipient == recipient)
            .map(|n| n.kind)
            .collect()
    }

    /// Recipients of every notification of `kind`, in arrival order.
    pub fn recipients_of(&self, kind: bazaar_types::EventKind) -> Vec<bazaar_types::ActorId> {
        self.seen
            .lock()
            .iter()
            .filter(|n| n.kind == kind)
            .map(|n| n.recipient)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.lock().is_empty()
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl NotificationSink for RecordingSink {
    fn notify(&self, notification: Notification) {
        self.seen.lock().push(notification);
    }
}
