//! Delivery errors. These never reach the escrow engine's callers.

use thiserror::Error;

/// Why a single delivery failed.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The transport could not reach the recipient.
    #[error("delivery failed: {reason}")]
    DeliveryFailed { reason: String },

    /// The transport did not finish within the configured timeout.
    #[error("delivery timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The delivery task panicked or was aborted.
    #[error("delivery task aborted: {0}")]
    Aborted(String),

    /// The dispatcher has been shut down.
    #[error("dispatcher closed")]
    Closed,
}

impl NotifyError {
    /// Shorthand for building a [`NotifyError::DeliveryFailed`].
    pub fn delivery(reason: impl Into<String>) -> Self {
        Self::DeliveryFailed {
            reason: reason.into(),
        }
    }
}
