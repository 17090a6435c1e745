//! The storage contract the core consumes.

use bazaar_types::{
    Actor, ActorId, Listing, ListingId, Result, Review, Transaction, TransactionId,
    TransactionStatus,
};

/// Row mutation applied inside a store's critical section.
///
/// The closure works on a copy; the copy is written back only if the
/// closure returns `Ok`, so a failed mutation never leaves a partial row.
pub type Mutation<'a, T> = &'a mut dyn FnMut(&mut T) -> Result<()>;

/// Durable per-entity storage for actors, listings, transactions and
/// reviews.
///
/// Every method is atomic with respect to the row(s) it touches.
pub trait MarketStore: Send + Sync {
    // ----- actors -----------------------------------------------------------

    /// Look up an actor.
    fn actor(&self, id: ActorId) -> Option<Actor>;

    /// Insert `actor` unless its id is already registered. Returns the
    /// stored row and whether it was created by this call.
    fn get_or_insert_actor(&self, actor: Actor) -> (Actor, bool);

    /// Atomically mutate an actor row.
    ///
    /// # Errors
    /// `ActorNotFound` if absent, or whatever `mutate` returns.
    fn update_actor(&self, id: ActorId, mutate: Mutation<'_, Actor>) -> Result<Actor>;

    /// Snapshot of every actor.
    fn actors(&self) -> Vec<Actor>;

    // ----- listings ---------------------------------------------------------

    /// Look up a listing.
    fn listing(&self, id: ListingId) -> Option<Listing>;

    /// Insert `listing` if its seller has fewer than `quota` active
    /// listings. The count and the insert happen in one critical section
    /// per seller.
    ///
    /// # Errors
    /// `QuotaExceeded` when the seller is at quota.
    fn insert_listing_within_quota(&self, listing: Listing, quota: u32) -> Result<Listing>;

    /// Atomically mutate a listing row.
    ///
    /// # Errors
    /// `ListingNotFound` if absent, or whatever `mutate` returns.
    fn update_listing(&self, id: ListingId, mutate: Mutation<'_, Listing>) -> Result<Listing>;

    /// Snapshot of every listing.
    fn listings(&self) -> Vec<Listing>;

    // ----- transactions -----------------------------------------------------

    /// Look up a transaction.
    fn transaction(&self, id: TransactionId) -> Option<Transaction>;

    /// Insert a new transaction. Reference codes are unique.
    ///
    /// # Errors
    /// - `DuplicateReference` if another transaction has the same code
    /// - `Storage` if the id is already taken
    fn insert_transaction(&self, tx: Transaction) -> Result<Transaction>;

    /// Look up a transaction by its uppercase reference code.
    fn transaction_by_reference(&self, reference: &str) -> Option<Transaction>;

    /// Apply `mutate` iff the stored status equals `expected`.
    ///
    /// # Errors
    /// - `TransactionNotFound` if absent
    /// - `WrongState` if the stored status differs from `expected`
    /// - whatever `mutate` returns (row left unchanged)
    fn compare_and_update_transaction(
        &self,
        id: TransactionId,
        expected: TransactionStatus,
        mutate: Mutation<'_, Transaction>,
    ) -> Result<Transaction>;

    /// Snapshot of every transaction.
    fn transactions(&self) -> Vec<Transaction>;

    // ----- reviews ----------------------------------------------------------

    /// Insert a review; at most one per transaction.
    ///
    /// # Errors
    /// `DuplicateReview` if the transaction already has one.
    fn insert_review(&self, review: Review) -> Result<Review>;

    /// The review left on a transaction, if any.
    fn review(&self, tx: TransactionId) -> Option<Review>;

    /// Every review of a seller.
    fn reviews_for_seller(&self, seller: ActorId) -> Vec<Review>;
}
