//! Escrow Transaction State Machine.
//!
//! | Operation          | Caller         | Required status                | Result status       |
//! |--------------------|----------------|--------------------------------|---------------------|
//! | `create`           | any actor      | listing purchasable            | `PENDING_PAYMENT`   |
//! | `attest_payment`   | buyer          | `PENDING_PAYMENT`              | `PAYMENT_CONFIRMED` |
//! | `approve_payment`  | operator       | `PAYMENT_CONFIRMED`            | unchanged           |
//! | `attest_delivery`  | buyer          | `PAYMENT_CONFIRMED`, approved  | `ITEM_DELIVERED`    |
//! | `release_funds`    | operator       | `ITEM_DELIVERED`               | `COMPLETED`         |
//! | `cancel`           | buyer/operator | `PENDING_PAYMENT`              | `CANCELLED`         |
//!
//! Every guarded mutation is one compare-and-set on the stored status.
//! The caller check happens first, against the immutable buyer id or the
//! directory role, so a forbidden call never reaches the store. A status
//! mismatch yields `WrongState` and writes nothing. Notifications are sent
//! only after the write has committed.

use bazaar_store::MarketStore;
use bazaar_types::{
    ActorId, EventKind, ListingId, MarketError, Result, Subject, Transaction, TransactionId,
    TransactionStatus, constants,
};
use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::Marketplace;

impl<S: MarketStore> Marketplace<S> {
    /// Open an escrow order for `listing_id` on behalf of `buyer_id`.
    ///
    /// The amount is the listing price at this moment and the fee split is
    /// frozen at the configured rate; neither changes afterwards.
    ///
    /// # Errors
    /// - `ListingNotFound` / `ActorNotFound`
    /// - `NotPurchasable` unless the listing is approved and active
    /// - `SelfPurchase` if the buyer owns the listing
    /// - `DuplicateReference` if every fresh id collided with an existing
    ///   reference code
    pub fn create_transaction(&self, listing_id: ListingId, buyer_id: ActorId) -> Result<Transaction> {
        let listing = self.require_listing(listing_id)?;
        self.require_actor(buyer_id)?;
        if !listing.is_purchasable() {
            debug!(listing = %listing_id, approved = listing.approved, active = listing.active, "Listing not purchasable");
            return Err(MarketError::NotPurchasable(listing_id));
        }
        if listing.seller_id == buyer_id {
            debug!(listing = %listing_id, buyer = %buyer_id, "Self-purchase rejected");
            return Err(MarketError::SelfPurchase);
        }

        let mut tx = Transaction::open(&listing, buyer_id, self.config.fee_percent);
        let mut attempt = 1;
        let tx = loop {
            match self.store.insert_transaction(tx.clone()) {
                Err(MarketError::DuplicateReference(code))
                    if attempt < constants::REFERENCE_ATTEMPTS =>
                {
                    warn!(reference = %code, attempt, "Reference code collision, regenerating id");
                    tx.id = TransactionId::new();
                    attempt += 1;
                }
                inserted => break inserted?,
            }
        };
        info!(
            tx = %tx.id,
            reference = %tx.reference(),
            listing = %listing_id,
            buyer = %buyer_id,
            seller = %tx.seller_id,
            amount = %tx.amount,
            fee = %tx.fee_amount,
            payout = %tx.seller_payout,
            "Transaction created"
        );
        Ok(tx)
    }

    /// Buyer attests that payment was sent.
    ///
    /// Notifies the buyer (payment under review), the seller (purchase
    /// pending) and every operator (review requested).
    pub fn attest_payment(&self, tx_id: TransactionId, caller: ActorId) -> Result<Transaction> {
        let tx = self.require_transaction(tx_id)?;
        require_buyer(&tx, caller, "attest_payment")?;

        let tx = self.transition(
            tx_id,
            TransactionStatus::PendingPayment,
            &mut |t| t.advance(TransactionStatus::PaymentConfirmed),
        )?;
        info!(tx = %tx_id, buyer = %caller, "Payment attested");

        let subject = Subject::Transaction(tx.clone());
        self.notify(tx.buyer_id, EventKind::PaymentUnderReview, subject.clone());
        self.notify(tx.seller_id, EventKind::PurchasePending, subject.clone());
        self.notify_operators(EventKind::PaymentReviewRequested, &subject);
        Ok(tx)
    }

    /// Operator confirms the payment arrived and releases each party's
    /// contact to the other. The status stays `PAYMENT_CONFIRMED`.
    ///
    /// May be repeated while the status holds; every call re-reads both
    /// contacts from the directory and re-sends them.
    pub fn approve_payment(&self, tx_id: TransactionId, caller: ActorId) -> Result<Transaction> {
        let tx = self.require_transaction(tx_id)?;
        self.require_operator(caller, "approve_payment")?;
        let buyer_contact = self.require_actor(tx.buyer_id)?.contact();
        let seller_contact = self.require_actor(tx.seller_id)?.contact();

        let tx = self.transition(tx_id, TransactionStatus::PaymentConfirmed, &mut |t| {
            let now = Utc::now();
            t.buyer_contact = Some(buyer_contact.clone());
            t.seller_contact = Some(seller_contact.clone());
            t.payment_approved_at = Some(now);
            t.updated_at = now;
            Ok(())
        })?;
        info!(tx = %tx_id, operator = %caller, "Payment approved, contacts released");

        let subject = Subject::Transaction(tx.clone());
        self.notify(tx.buyer_id, EventKind::SellerContactReleased, subject.clone());
        self.notify(tx.seller_id, EventKind::BuyerContactReleased, subject);
        Ok(tx)
    }

    /// Buyer confirms the item arrived.
    ///
    /// Only possible once an operator has approved the payment, so contacts
    /// are always released before delivery. Notifies the buyer (leave a
    /// review) and every operator (release the payout).
    ///
    /// # Errors
    /// `WrongState` unless the status is `PAYMENT_CONFIRMED` and the payment
    /// has been approved.
    pub fn attest_delivery(&self, tx_id: TransactionId, caller: ActorId) -> Result<Transaction> {
        let tx = self.require_transaction(tx_id)?;
        require_buyer(&tx, caller, "attest_delivery")?;

        let tx = self.transition(tx_id, TransactionStatus::PaymentConfirmed, &mut |t| {
            if t.payment_approved_at.is_none() {
                return Err(MarketError::WrongState {
                    expected: TransactionStatus::PaymentConfirmed,
                    actual: t.status,
                });
            }
            t.advance(TransactionStatus::ItemDelivered)
        })?;
        info!(tx = %tx_id, buyer = %caller, "Delivery attested");

        let subject = Subject::Transaction(tx.clone());
        self.notify(tx.buyer_id, EventKind::ReviewRequested, subject.clone());
        self.notify_operators(EventKind::PayoutRequested, &subject);
        Ok(tx)
    }

    /// Operator releases the seller payout, completing the transaction.
    ///
    /// The seller's reputation is credited once, after the
    /// `ITEM_DELIVERED -> COMPLETED` write. A second call sees `COMPLETED`
    /// and fails with `WrongState` before anything is credited.
    pub fn release_funds(&self, tx_id: TransactionId, caller: ActorId) -> Result<Transaction> {
        self.require_transaction(tx_id)?;
        self.require_operator(caller, "release_funds")?;

        let tx = self.transition(
            tx_id,
            TransactionStatus::ItemDelivered,
            &mut |t| t.advance(TransactionStatus::Completed),
        )?;
        info!(
            tx = %tx_id,
            operator = %caller,
            seller = %tx.seller_id,
            payout = %tx.seller_payout,
            fee = %tx.fee_amount,
            "Funds released"
        );

        // The transition has committed; a failed credit is logged, not returned.
        if let Err(e) = self.credit_seller(tx.seller_id, tx.amount) {
            error!(tx = %tx_id, seller = %tx.seller_id, error = %e, "Seller reputation update failed");
        }

        self.notify(tx.seller_id, EventKind::FundsReleased, Subject::Transaction(tx.clone()));
        Ok(tx)
    }

    /// Cancel an order before payment. Buyer or operator only.
    ///
    /// Nothing is compensated: the listing stays as it is.
    pub fn cancel(&self, tx_id: TransactionId, caller: ActorId) -> Result<Transaction> {
        let tx = self.require_transaction(tx_id)?;
        if tx.buyer_id != caller {
            self.require_operator(caller, "cancel")?;
        }

        let tx = self.transition(
            tx_id,
            TransactionStatus::PendingPayment,
            &mut |t| t.advance(TransactionStatus::Cancelled),
        )?;
        info!(tx = %tx_id, caller = %caller, "Transaction cancelled");

        self.notify(tx.buyer_id, EventKind::TransactionCancelled, Subject::Transaction(tx.clone()));
        Ok(tx)
    }

    /// Look up a transaction.
    pub fn transaction(&self, id: TransactionId) -> Result<Transaction> {
        self.require_transaction(id)
    }

    fn transition(
        &self,
        tx_id: TransactionId,
        expected: TransactionStatus,
        mutate: &mut dyn FnMut(&mut Transaction) -> Result<()>,
    ) -> Result<Transaction> {
        self.store
            .compare_and_update_transaction(tx_id, expected, mutate)
            .inspect_err(|e| debug!(tx = %tx_id, expected = %expected, error = %e, "Transition rejected"))
    }
}

fn require_buyer(tx: &Transaction, caller: ActorId, action: &str) -> Result<()> {
    if tx.buyer_id == caller {
        Ok(())
    } else {
        debug!(tx = %tx.id, caller = %caller, action, "Buyer-only action rejected");
        Err(MarketError::forbidden(format!(
            "{action} may only be called by the buyer"
        )))
    }
}
