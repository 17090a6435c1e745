//! In-memory [`MarketStore`] with one lock per row.

use std::{collections::HashMap, sync::Arc};

use bazaar_types::{
    Actor, ActorId, Listing, ListingId, MarketError, Result, Review, Transaction, TransactionId,
    TransactionStatus,
};
use parking_lot::Mutex;

use crate::{
    store::{MarketStore, Mutation},
    table::Table,
};

/// Thread-safe in-memory store.
///
/// - Transactions: compare-and-set happens under the row's own mutex, so
///   racing transitions on one transaction serialize while transitions on
///   different transactions proceed in parallel.
/// - Listings: creation counts the seller's active listings and inserts
///   while holding a per-seller mutex, so a burst of creates cannot
///   overshoot the quota.
/// - Reference codes: indexed under one mutex held across the insert, so
///   two transactions can never share a code.
pub struct MemoryStore {
    actors: Table<ActorId, Actor>,
    listings: Table<ListingId, Listing>,
    transactions: Table<TransactionId, Transaction>,
    references: Mutex<HashMap<String, TransactionId>>,
    reviews: Mutex<HashMap<TransactionId, Review>>,
    /// Per-seller critical sections for quota-checked inserts.
    seller_gates: Mutex<HashMap<ActorId, Arc<Mutex<()>>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            actors: Table::new(),
            listings: Table::new(),
            transactions: Table::new(),
            references: Mutex::new(HashMap::new()),
            reviews: Mutex::new(HashMap::new()),
            seller_gates: Mutex::new(HashMap::new()),
        }
    }

    fn seller_gate(&self, seller: ActorId) -> Arc<Mutex<()>> {
        Arc::clone(self.seller_gates.lock().entry(seller).or_default())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketStore for MemoryStore {
    fn actor(&self, id: ActorId) -> Option<Actor> {
        self.actors.get(&id)
    }

    fn get_or_insert_actor(&self, actor: Actor) -> (Actor, bool) {
        self.actors.get_or_insert(actor.id, actor)
    }

    fn update_actor(&self, id: ActorId, mutate: Mutation<'_, Actor>) -> Result<Actor> {
        self.actors
            .update_if(&id, || MarketError::ActorNotFound(id), |_| Ok(()), mutate)
    }

    fn actors(&self) -> Vec<Actor> {
        self.actors.snapshot()
    }

    fn listing(&self, id: ListingId) -> Option<Listing> {
        self.listings.get(&id)
    }

    fn insert_listing_within_quota(&self, listing: Listing, quota: u32) -> Result<Listing> {
        let gate = self.seller_gate(listing.seller_id);
        let _held = gate.lock();

        let seller = listing.seller_id;
        let active = self
            .listings
            .filter(|l| l.seller_id == seller && l.active)
            .len();
        let active = u32::try_from(active).unwrap_or(u32::MAX);
        if active >= quota {
            tracing::debug!(seller = %seller, active, quota, "Listing quota reached");
            return Err(MarketError::QuotaExceeded { quota, active });
        }

        let (stored, inserted) = self.listings.get_or_insert(listing.id, listing);
        if !inserted {
            return Err(MarketError::Storage(format!(
                "duplicate listing id {}",
                stored.id
            )));
        }
        Ok(stored)
    }

    fn update_listing(&self, id: ListingId, mutate: Mutation<'_, Listing>) -> Result<Listing> {
        self.listings
            .update_if(&id, || MarketError::ListingNotFound(id), |_| Ok(()), mutate)
    }

    fn listings(&self) -> Vec<Listing> {
        self.listings.snapshot()
    }

    fn transaction(&self, id: TransactionId) -> Option<Transaction> {
        self.transactions.get(&id)
    }

    fn insert_transaction(&self, tx: Transaction) -> Result<Transaction> {
        let mut references = self.references.lock();
        let reference = tx.reference();
        if references.contains_key(&reference) {
            return Err(MarketError::DuplicateReference(reference));
        }

        let (stored, inserted) = self.transactions.get_or_insert(tx.id, tx);
        if !inserted {
            return Err(MarketError::Storage(format!(
                "duplicate transaction id {}",
                stored.id
            )));
        }
        references.insert(reference, stored.id);
        Ok(stored)
    }

    fn transaction_by_reference(&self, reference: &str) -> Option<Transaction> {
        let id = *self.references.lock().get(reference)?;
        self.transactions.get(&id)
    }

    fn compare_and_update_transaction(
        &self,
        id: TransactionId,
        expected: TransactionStatus,
        mutate: Mutation<'_, Transaction>,
    ) -> Result<Transaction> {
        self.transactions.update_if(
            &id,
            || MarketError::TransactionNotFound(id),
            |current| {
                if current.status == expected {
                    Ok(())
                } else {
                    Err(MarketError::WrongState {
                        expected,
                        actual: current.status,
                    })
                }
            },
            mutate,
        )
    }

    fn transactions(&self) -> Vec<Transaction> {
        self.transactions.snapshot()
    }

    fn insert_review(&self, review: Review) -> Result<Review> {
        let mut reviews = self.reviews.lock();
        if reviews.contains_key(&review.transaction_id) {
            return Err(MarketError::DuplicateReview(review.transaction_id));
        }
        reviews.insert(review.transaction_id, review.clone());
        Ok(review)
    }

    fn review(&self, tx: TransactionId) -> Option<Review> {
        self.reviews.lock().get(&tx).cloned()
    }

    fn reviews_for_seller(&self, seller: ActorId) -> Vec<Review> {
        self.reviews
            .lock()
            .values()
            .filter(|r| r.seller_id == seller)
            .cloned()
            .collect()
    }
}
