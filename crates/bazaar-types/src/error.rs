//! Error types for the Bazaar escrow marketplace.
//!
//! All errors use the `MK_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Actor directory errors
//! - 2xx: Listing / moderation errors
//! - 3xx: Escrow transaction errors
//! - 4xx: Review errors
//! - 9xx: General / storage / configuration errors

use thiserror::Error;

use crate::{ActorId, ListingId, TransactionId, TransactionStatus};

/// Central error enum for all Bazaar core operations.
///
/// Every variant describes a failure of a single operation; none of them
/// implies a partially mutated store.
#[derive(Debug, Error)]
pub enum MarketError {
    // =================================================================
    // Actor Errors (1xx)
    // =================================================================
    /// The referenced actor is not registered.
    #[error("MK_ERR_100: Actor not found: {0}")]
    ActorNotFound(ActorId),

    /// The caller lacks the role or ownership the operation requires.
    #[error("MK_ERR_101: Forbidden: {reason}")]
    Forbidden { reason: String },

    /// The requested role change is not allowed from the actor's current role.
    #[error("MK_ERR_102: Role change rejected: {reason}")]
    RoleChange { reason: String },

    // =================================================================
    // Listing Errors (2xx)
    // =================================================================
    /// The referenced listing does not exist.
    #[error("MK_ERR_200: Listing not found: {0}")]
    ListingNotFound(ListingId),

    /// Listing fields failed validation.
    #[error("MK_ERR_201: Invalid listing: {reason}")]
    InvalidListing { reason: String },

    /// The seller already has `quota` active listings.
    #[error("MK_ERR_202: Active listing quota exceeded: {active} of {quota}")]
    QuotaExceeded { quota: u32, active: u32 },

    /// The listing is not both approved and active.
    #[error("MK_ERR_203: Listing is not available for purchase: {0}")]
    NotPurchasable(ListingId),

    /// The buyer owns the listing they tried to purchase.
    #[error("MK_ERR_204: Self-purchase rejected: buyer owns the listing")]
    SelfPurchase,

    // =================================================================
    // Transaction Errors (3xx)
    // =================================================================
    /// The referenced transaction does not exist.
    #[error("MK_ERR_300: Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    /// The transaction is not in the state the operation requires.
    #[error("MK_ERR_301: Wrong transaction state: expected {expected}, got {actual}")]
    WrongState {
        expected: TransactionStatus,
        actual: TransactionStatus,
    },

    /// Another transaction already uses this reference code.
    #[error("MK_ERR_302: Transaction reference already in use: {0}")]
    DuplicateReference(String),

    // =================================================================
    // Review Errors (4xx)
    // =================================================================
    /// Review fields failed validation.
    #[error("MK_ERR_400: Invalid review: {reason}")]
    InvalidReview { reason: String },

    /// A review already exists for this transaction.
    #[error("MK_ERR_401: Transaction already reviewed: {0}")]
    DuplicateReview(TransactionId),

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("MK_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Configuration error (invalid values, unparsable document).
    #[error("MK_ERR_901: Configuration error: {0}")]
    Configuration(String),

    /// The backing store rejected or failed the operation.
    #[error("MK_ERR_902: Storage error: {0}")]
    Storage(String),
}

impl MarketError {
    /// `true` for the three "referenced entity absent" variants.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ActorNotFound(_) | Self::ListingNotFound(_) | Self::TransactionNotFound(_)
        )
    }

    /// `true` when retrying after the precondition is met may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::WrongState { .. })
    }

    /// Shorthand for building a [`MarketError::Forbidden`].
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, MarketError>;

impl From<serde_json::Error> for MarketError {
    fn from(err: serde_json::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}
