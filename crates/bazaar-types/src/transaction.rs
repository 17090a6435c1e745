//! # Escrow transaction model
//!
//! ## State Machine
//!
//! ```text
//!   ┌─────────────────┐ attest  ┌───────────────────┐ attest   ┌────────────────┐ release ┌───────────┐
//!   │ PENDING_PAYMENT ├────────▶│ PAYMENT_CONFIRMED ├─────────▶│ ITEM_DELIVERED ├────────▶│ COMPLETED │
//!   └───────┬─────────┘ payment └───────────────────┘ delivery └────────────────┘  funds  └───────────┘
//!           │ cancel
//!           ▼
//!   ┌───────────┐
//!   │ CANCELLED │
//!   └───────────┘
//! ```
//!
//! Transitions are **monotonic**. Operator payment approval happens inside
//! `PAYMENT_CONFIRMED` and only releases the contact fields.
//!
//! ## Fee split
//!
//! `fee_amount + seller_payout == amount` exactly. The split is computed
//! once at creation from the fee rate in force at that moment and never
//! recomputed.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::{ActorId, Listing, ListingId, TransactionId, constants};

/// The lifecycle state of an escrow transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Created; buyer has not yet attested payment. Cancellable.
    PendingPayment,
    /// Buyer attested payment; awaiting operator review and delivery.
    PaymentConfirmed,
    /// Buyer attested receipt of the item; awaiting fund release.
    ItemDelivered,
    /// Operator released funds to the seller. Terminal.
    Completed,
    /// Cancelled before payment. Terminal.
    Cancelled,
}

impl TransactionStatus {
    /// Can a transaction move from this status to `target`?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::PendingPayment, Self::PaymentConfirmed | Self::Cancelled)
                | (Self::PaymentConfirmed, Self::ItemDelivered)
                | (Self::ItemDelivered, Self::Completed)
        )
    }

    /// The single status a transition into `self` must start from.
    #[must_use]
    pub fn required_prior(self) -> Option<Self> {
        match self {
            Self::PendingPayment => None,
            Self::PaymentConfirmed | Self::Cancelled => Some(Self::PendingPayment),
            Self::ItemDelivered => Some(Self::PaymentConfirmed),
            Self::Completed => Some(Self::ItemDelivered),
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PendingPayment => write!(f, "PENDING_PAYMENT"),
            Self::PaymentConfirmed => write!(f, "PAYMENT_CONFIRMED"),
            Self::ItemDelivered => write!(f, "ITEM_DELIVERED"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Operator fee and seller payout for a given amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    pub fee: Decimal,
    pub payout: Decimal,
}

impl FeeSplit {
    /// Split `amount` at `fee_percent` (e.g. `5.5` for 5.5%).
    ///
    /// The fee is rounded half away from zero to cents; the payout is the
    /// exact remainder, so the two always sum back to `amount`.
    #[must_use]
    pub fn compute(amount: Decimal, fee_percent: Decimal) -> Self {
        let mut fee = (amount * fee_percent / Decimal::ONE_HUNDRED).round_dp_with_strategy(
            constants::MONEY_SCALE,
            RoundingStrategy::MidpointAwayFromZero,
        );
        fee.rescale(constants::MONEY_SCALE);
        let mut payout = amount - fee;
        payout.rescale(constants::MONEY_SCALE);
        Self { fee, payout }
    }
}

/// An escrow order between one buyer and one seller for one listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub buyer_id: ActorId,
    pub seller_id: ActorId,
    pub listing_id: ListingId,
    /// Listing title at purchase time, for notifications and history.
    pub listing_title: String,
    /// Copied from the listing price at creation; immutable.
    pub amount: Decimal,
    /// Operator fee, frozen at creation.
    pub fee_amount: Decimal,
    /// Seller payout, frozen at creation.
    pub seller_payout: Decimal,
    pub status: TransactionStatus,
    /// Populated only once an operator approves the payment.
    pub buyer_contact: Option<String>,
    /// Populated only once an operator approves the payment.
    pub seller_contact: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub payment_attested_at: Option<DateTime<Utc>>,
    pub payment_approved_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Open a new transaction for `listing` in `PendingPayment`, freezing
    /// the fee split at `fee_percent`.
    #[must_use]
    pub fn open(listing: &Listing, buyer_id: ActorId, fee_percent: Decimal) -> Self {
        let split = FeeSplit::compute(listing.price, fee_percent);
        let now = Utc::now();
        Self {
            id: TransactionId::new(),
            buyer_id,
            seller_id: listing.seller_id,
            listing_id: listing.id,
            listing_title: listing.title.clone(),
            amount: listing.price,
            fee_amount: split.fee,
            seller_payout: split.payout,
            status: TransactionStatus::PendingPayment,
            buyer_contact: None,
            seller_contact: None,
            created_at: now,
            updated_at: now,
            payment_attested_at: None,
            payment_approved_at: None,
            delivered_at: None,
            completed_at: None,
            cancelled_at: None,
        }
    }

    /// Short shareable code, see [`TransactionId::reference`].
    #[must_use]
    pub fn reference(&self) -> String {
        self.id.reference()
    }

    /// Move to `target`, stamping the matching timestamp.
    ///
    /// # Errors
    /// Returns `WrongState` if the transition is not part of the lifecycle.
    pub fn advance(&mut self, target: TransactionStatus) -> crate::Result<()> {
        if !self.status.can_transition_to(target) {
            return Err(crate::MarketError::WrongState {
                expected: target.required_prior().unwrap_or(self.status),
                actual: self.status,
            });
        }
        let now = Utc::now();
        match target {
            TransactionStatus::PaymentConfirmed => self.payment_attested_at = Some(now),
            TransactionStatus::ItemDelivered => self.delivered_at = Some(now),
            TransactionStatus::Completed => self.completed_at = Some(now),
            TransactionStatus::Cancelled => self.cancelled_at = Some(now),
            TransactionStatus::PendingPayment => {}
        }
        self.status = target;
        self.updated_at = now;
        Ok(())
    }

    /// `true` once both contact fields have been released.
    #[must_use]
    pub fn contacts_released(&self) -> bool {
        self.buyer_contact.is_some() && self.seller_contact.is_some()
    }
}
