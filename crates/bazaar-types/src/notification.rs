//! State-change notifications emitted by the core.
//!
//! The core decides *who* hears about *what*; rendering the message and
//! delivering it belong to the transport.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ActorId, Listing, Review, Transaction};

/// What happened, from the recipient's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// To operators: a new listing awaits moderation.
    ListingSubmitted,
    /// To the owner: the listing is now in the catalog.
    ListingApproved,
    /// To the buyer: the attested payment is being reviewed.
    PaymentUnderReview,
    /// To the seller: a buyer attested payment for one of their listings.
    PurchasePending,
    /// To operators: verify the payment and approve the transaction.
    PaymentReviewRequested,
    /// To the buyer: payment approved, here is the seller's contact.
    SellerContactReleased,
    /// To the seller: payment approved, here is the buyer's contact.
    BuyerContactReleased,
    /// To the buyer: delivery recorded, please leave a review.
    ReviewRequested,
    /// To operators: delivery recorded, release the seller payout.
    PayoutRequested,
    /// To the seller: funds released.
    FundsReleased,
    /// To the buyer: the order was cancelled.
    TransactionCancelled,
    /// To the seller: a buyer reviewed a completed sale.
    ReviewReceived,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ListingSubmitted => "LISTING_SUBMITTED",
            Self::ListingApproved => "LISTING_APPROVED",
            Self::PaymentUnderReview => "PAYMENT_UNDER_REVIEW",
            Self::PurchasePending => "PURCHASE_PENDING",
            Self::PaymentReviewRequested => "PAYMENT_REVIEW_REQUESTED",
            Self::SellerContactReleased => "SELLER_CONTACT_RELEASED",
            Self::BuyerContactReleased => "BUYER_CONTACT_RELEASED",
            Self::ReviewRequested => "REVIEW_REQUESTED",
            Self::PayoutRequested => "PAYOUT_REQUESTED",
            Self::FundsReleased => "FUNDS_RELEASED",
            Self::TransactionCancelled => "TRANSACTION_CANCELLED",
            Self::ReviewReceived => "REVIEW_RECEIVED",
        };
        f.write_str(s)
    }
}

/// Snapshot of the entity a notification concerns, taken right after the
/// transition committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Subject {
    Listing(Listing),
    Transaction(Transaction),
    Review(Review),
}

/// A single message for a single recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub recipient: ActorId,
    pub kind: EventKind,
    pub subject: Subject,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    #[must_use]
    pub fn new(recipient: ActorId, kind: EventKind, subject: Subject) -> Self {
        Self {
            recipient,
            kind,
            subject,
            created_at: Utc::now(),
        }
    }

    /// The transaction snapshot, if this notification concerns one.
    #[must_use]
    pub fn transaction(&self) -> Option<&Transaction> {
        match &self.subject {
            Subject::Transaction(tx) => Some(tx),
            _ => None,
        }
    }

    /// The listing snapshot, if this notification concerns one.
    #[must_use]
    pub fn listing(&self) -> Option<&Listing> {
        match &self.subject {
            Subject::Listing(listing) => Some(listing),
            _ => None,
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Notification[{}] -> {}", self.kind, self.recipient)
    }
}
