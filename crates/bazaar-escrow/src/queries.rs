//! Read-only views over the store.
//!
//! Every query works on a snapshot; results may be stale by the time the
//! caller reads them, and nothing here takes part in a transition.

use bazaar_store::MarketStore;
use bazaar_types::{
    Actor, ActorId, Listing, Role, Transaction, TransactionStatus, constants,
};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::Marketplace;

/// Registered actors by role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActorCounts {
    pub total: usize,
    pub buyers: usize,
    pub sellers: usize,
    pub operators: usize,
}

/// Platform-wide totals. Revenue and fees cover `COMPLETED` transactions
/// only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformStats {
    /// Listings with `active == true`.
    pub active_listings: usize,
    /// Approved and active: what the catalog shows.
    pub catalog_listings: usize,
    /// Active and awaiting approval.
    pub pending_listings: usize,
    pub total_transactions: usize,
    pub completed_transactions: usize,
    /// Sum of `amount`.
    pub revenue: Decimal,
    /// Sum of `fee_amount`.
    pub fees: Decimal,
}

fn newest_first_listings(listings: &mut [Listing]) {
    listings.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
}

fn newest_first(txs: &mut [Transaction]) {
    txs.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
}

fn money(mut amount: Decimal) -> Decimal {
    amount.rescale(constants::MONEY_SCALE);
    amount
}

impl<S: MarketStore> Marketplace<S> {
    // ----- listings ---------------------------------------------------------

    /// Purchasable listings, newest first.
    pub fn catalog(&self, offset: usize, limit: usize) -> Vec<Listing> {
        let mut listings: Vec<Listing> = self
            .store
            .listings()
            .into_iter()
            .filter(Listing::is_purchasable)
            .collect();
        newest_first_listings(&mut listings);
        listings.into_iter().skip(offset).take(limit).collect()
    }

    /// Every listing a seller owns, newest first.
    pub fn listings_by_seller(&self, seller: ActorId) -> Vec<Listing> {
        let mut listings: Vec<Listing> = self
            .store
            .listings()
            .into_iter()
            .filter(|l| l.seller_id == seller)
            .collect();
        newest_first_listings(&mut listings);
        listings
    }

    /// The moderation queue: active, unapproved listings, oldest first.
    pub fn pending_listings(&self) -> Vec<Listing> {
        let mut listings: Vec<Listing> = self
            .store
            .listings()
            .into_iter()
            .filter(Listing::is_pending)
            .collect();
        listings.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        listings.truncate(self.config.pending_listings_limit);
        listings
    }

    // ----- transactions -----------------------------------------------------

    /// A buyer's purchases, newest first.
    pub fn transactions_by_buyer(&self, buyer: ActorId) -> Vec<Transaction> {
        self.history(|tx| tx.buyer_id == buyer)
    }

    /// A seller's sales, newest first.
    pub fn transactions_by_seller(&self, seller: ActorId) -> Vec<Transaction> {
        self.history(|tx| tx.seller_id == seller)
    }

    fn history(&self, keep: impl Fn(&Transaction) -> bool) -> Vec<Transaction> {
        let mut txs: Vec<Transaction> = self
            .store
            .transactions()
            .into_iter()
            .filter(|tx| keep(tx))
            .collect();
        newest_first(&mut txs);
        txs.truncate(self.config.history_limit);
        txs
    }

    /// Find a transaction by its 8-character reference code. Case and
    /// surrounding whitespace are ignored.
    pub fn transaction_by_reference(&self, code: &str) -> Option<Transaction> {
        self.store
            .transaction_by_reference(&code.trim().to_ascii_uppercase())
    }

    /// Latest transactions across all parties.
    pub fn recent_transactions(&self, limit: usize) -> Vec<Transaction> {
        let mut txs = self.store.transactions();
        newest_first(&mut txs);
        txs.truncate(limit);
        txs
    }

    // ----- actors -----------------------------------------------------------

    /// Sellers ranked by total sales, then rating.
    pub fn top_sellers(&self) -> Vec<Actor> {
        let mut sellers: Vec<Actor> = self
            .store
            .actors()
            .into_iter()
            .filter(Actor::is_seller)
            .collect();
        sellers.sort_by(|a, b| {
            let key = |actor: &Actor| {
                actor
                    .seller
                    .as_ref()
                    .map(|p| (p.total_sales, p.rating))
                    .unwrap_or_default()
            };
            key(b).cmp(&key(a)).then(a.id.cmp(&b.id))
        });
        sellers.truncate(self.config.leaderboard_limit);
        sellers
    }

    pub fn actor_counts(&self) -> ActorCounts {
        self.store
            .actors()
            .iter()
            .fold(ActorCounts::default(), |mut counts, actor| {
                counts.total += 1;
                match actor.role {
                    Role::Buyer => counts.buyers += 1,
                    Role::Seller => counts.sellers += 1,
                    Role::Operator => counts.operators += 1,
                }
                counts
            })
    }

    pub fn platform_stats(&self) -> PlatformStats {
        let listings = self.store.listings();
        let txs = self.store.transactions();
        let completed: Vec<&Transaction> = txs
            .iter()
            .filter(|tx| tx.status == TransactionStatus::Completed)
            .collect();

        PlatformStats {
            active_listings: listings.iter().filter(|l| l.active).count(),
            catalog_listings: listings.iter().filter(|l| l.is_purchasable()).count(),
            pending_listings: listings.iter().filter(|l| l.is_pending()).count(),
            total_transactions: txs.len(),
            completed_transactions: completed.len(),
            revenue: money(completed.iter().map(|tx| tx.amount).sum()),
            fees: money(completed.iter().map(|tx| tx.fee_amount).sum()),
        }
    }
}
