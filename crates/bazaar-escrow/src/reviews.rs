//! Buyer reviews of completed transactions.

use bazaar_store::MarketStore;
use bazaar_types::{
    ActorId, EventKind, MarketError, Result, Review, Subject, TransactionId, TransactionStatus,
    constants, mean_rating,
};
use chrono::Utc;
use tracing::{debug, info};

use crate::Marketplace;

impl<S: MarketStore> Marketplace<S> {
    /// Leave the single review a completed transaction allows.
    ///
    /// The seller's rating becomes the mean of all their review ratings and
    /// the seller is notified.
    ///
    /// # Errors
    /// - `TransactionNotFound`
    /// - `Forbidden` unless the caller is the buyer
    /// - `WrongState` unless the transaction is `COMPLETED`
    /// - `InvalidReview` for a rating outside 1..=5
    /// - `DuplicateReview` if one already exists
    pub fn leave_review(
        &self,
        tx_id: TransactionId,
        caller: ActorId,
        rating: u8,
        comment: Option<String>,
    ) -> Result<Review> {
        let tx = self.require_transaction(tx_id)?;
        if tx.buyer_id != caller {
            debug!(tx = %tx_id, caller = %caller, "Review rejected: not the buyer");
            return Err(MarketError::forbidden("only the buyer may review a transaction"));
        }
        if tx.status != TransactionStatus::Completed {
            return Err(MarketError::WrongState {
                expected: TransactionStatus::Completed,
                actual: tx.status,
            });
        }
        if !(constants::MIN_RATING..=constants::MAX_RATING).contains(&rating) {
            return Err(MarketError::InvalidReview {
                reason: format!(
                    "rating must be between {} and {}, got {rating}",
                    constants::MIN_RATING,
                    constants::MAX_RATING
                ),
            });
        }

        let review = self.store.insert_review(Review {
            transaction_id: tx_id,
            seller_id: tx.seller_id,
            buyer_id: tx.buyer_id,
            rating,
            comment: comment
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            created_at: Utc::now(),
        })?;

        // Ratings are read inside the seller's row lock.
        let seller = self.store.update_actor(tx.seller_id, &mut |actor| {
            let ratings: Vec<u8> = self
                .store
                .reviews_for_seller(actor.id)
                .iter()
                .map(|r| r.rating)
                .collect();
            if let Some(profile) = actor.seller.as_mut() {
                profile.rating = mean_rating(&ratings);
                actor.updated_at = Utc::now();
            }
            Ok(())
        })?;
        info!(
            tx = %tx_id,
            seller = %tx.seller_id,
            rating,
            seller_rating = %seller.seller.as_ref().map(|p| p.rating).unwrap_or_default(),
            "Review recorded"
        );

        self.notify(tx.seller_id, EventKind::ReviewReceived, Subject::Review(review.clone()));
        Ok(review)
    }

    /// The review left on a transaction, if any.
    pub fn review(&self, tx_id: TransactionId) -> Option<Review> {
        self.store.review(tx_id)
    }

    /// A seller's reviews, newest first.
    pub fn reviews_for_seller(&self, seller: ActorId) -> Vec<Review> {
        let mut reviews = self.store.reviews_for_seller(seller);
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        reviews
    }
}
