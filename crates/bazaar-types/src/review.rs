//! Buyer reviews of completed transactions.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::{ActorId, TransactionId, constants};

/// One-to-one with a completed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub transaction_id: TransactionId,
    pub seller_id: ActorId,
    pub buyer_id: ActorId,
    /// 1..=5.
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Mean of `ratings` rounded half away from zero to 2 decimals, clamped to
/// `[0.00, 5.00]`. Zero when there are no ratings.
#[must_use]
pub fn mean_rating(ratings: &[u8]) -> Decimal {
    if ratings.is_empty() {
        return Decimal::new(0, constants::MONEY_SCALE);
    }
    let sum: u64 = ratings.iter().map(|&r| u64::from(r)).sum();
    let mut mean = (Decimal::from(sum) / Decimal::from(ratings.len()))
        .round_dp_with_strategy(constants::MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
        .clamp(Decimal::ZERO, Decimal::from(constants::MAX_RATING));
    mean.rescale(constants::MONEY_SCALE);
    mean
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_zero() {
        assert_eq!(mean_rating(&[]), Decimal::ZERO);
        assert_eq!(mean_rating(&[]).to_string(), "0.00");
    }

    #[test]
    fn mean_rounds_to_cents() {
        // 14 / 3 = 4.666.. -> 4.67
        assert_eq!(mean_rating(&[5, 5, 4]), Decimal::new(467, 2));
        assert_eq!(mean_rating(&[5]).to_string(), "5.00");
        assert_eq!(mean_rating(&[1, 2]), Decimal::new(150, 2));
    }
}
