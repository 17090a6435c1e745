//! Reputation & Leveling Engine.
//!
//! A pure update of a [`SellerProfile`] for one completed sale. The escrow
//! engine calls it exactly once per transaction, right after the
//! `ITEM_DELIVERED -> COMPLETED` compare-and-set succeeds; that transition
//! can only fire once, so no separate idempotency record is kept.

use bazaar_store::MarketStore;
use bazaar_types::{
    ActorId, MarketConfig, MarketError, Result, SellerProfile, Tier, TierThresholds, constants,
};
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;

use crate::Marketplace;

/// What one completed sale did to a seller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleCredit {
    pub previous_tier: Tier,
    pub tier: Tier,
    pub experience: u64,
    pub total_transactions: u64,
}

impl SaleCredit {
    #[must_use]
    pub fn promoted(&self) -> bool {
        self.tier > self.previous_tier
    }
}

/// Credit `amount` to `profile`: add it to total sales, count the deal,
/// award the flat `experience_per_deal`, and recompute the tier.
pub fn credit_sale(
    profile: &mut SellerProfile,
    amount: Decimal,
    experience_per_deal: u64,
    tiers: &TierThresholds,
) -> SaleCredit {
    let previous_tier = profile.tier;
    let mut total = profile.total_sales + amount;
    total.rescale(constants::MONEY_SCALE);
    profile.total_sales = total;
    profile.total_transactions = profile.total_transactions.saturating_add(1);
    profile.experience = profile.experience.saturating_add(experience_per_deal);
    profile.tier = tiers.tier_for(profile.experience);
    SaleCredit {
        previous_tier,
        tier: profile.tier,
        experience: profile.experience,
        total_transactions: profile.total_transactions,
    }
}

impl<S: MarketStore> Marketplace<S> {
    /// Apply [`credit_sale`] to the stored seller.
    pub(crate) fn credit_seller(&self, seller: ActorId, amount: Decimal) -> Result<SaleCredit> {
        let MarketConfig {
            experience_per_deal,
            tiers,
            ..
        } = &self.config;
        let mut credit = None;
        self.store.update_actor(seller, &mut |actor| {
            let Some(profile) = actor.seller.as_mut() else {
                return Err(MarketError::Internal(format!(
                    "actor {} has no seller profile",
                    actor.id
                )));
            };
            credit = Some(credit_sale(profile, amount, *experience_per_deal, tiers));
            actor.updated_at = Utc::now();
            Ok(())
        })?;
        let credit = credit.ok_or_else(|| MarketError::Internal("sale credit not applied".into()))?;

        if credit.promoted() {
            info!(
                seller = %seller,
                from = %credit.previous_tier,
                to = %credit.tier,
                experience = credit.experience,
                "Seller promoted"
            );
        }
        Ok(credit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn profile_with(experience: u64) -> SellerProfile {
        let tiers = TierThresholds::default();
        let mut p = SellerProfile::new(5);
        p.experience = experience;
        p.tier = tiers.tier_for(experience);
        p
    }

    #[test]
    fn silver_to_gold_at_threshold() {
        let mut p = profile_with(4_999);
        assert_eq!(p.tier, Tier::Silver);

        let credit = credit_sale(&mut p, Decimal::new(1000, 0), 100, &TierThresholds::default());
        assert_eq!(p.experience, 5_099);
        assert_eq!(p.tier, Tier::Gold);
        assert!(credit.promoted());
        assert_eq!(credit.previous_tier, Tier::Silver);
    }

    #[test]
    fn experience_is_flat_per_deal() {
        let tiers = TierThresholds::default();
        let mut small = SellerProfile::new(5);
        let mut large = SellerProfile::new(5);
        credit_sale(&mut small, Decimal::new(1, 2), 100, &tiers);
        credit_sale(&mut large, Decimal::new(1_000_000, 0), 100, &tiers);
        assert_eq!(small.experience, large.experience);
        assert_eq!(large.total_sales.to_string(), "1000000.00");
    }

    #[test]
    fn no_promotion_inside_bracket() {
        let mut p = SellerProfile::new(5);
        let credit = credit_sale(&mut p, Decimal::ONE, 100, &TierThresholds::default());
        assert!(!credit.promoted());
        assert_eq!(p.tier, Tier::Bronze);
        assert_eq!(p.total_transactions, 1);
    }

    proptest! {
        #[test]
        fn prop_tier_never_decreases(deals in 1usize..200, per_deal in 0u64..500) {
            let tiers = TierThresholds::default();
            let mut p = SellerProfile::new(5);
            let mut last = p.tier;
            for _ in 0..deals {
                credit_sale(&mut p, Decimal::ONE, per_deal, &tiers);
                prop_assert!(p.tier >= last);
                prop_assert_eq!(p.tier, tiers.tier_for(p.experience));
                last = p.tier;
            }
            prop_assert_eq!(p.total_transactions, deals as u64);
        }
    }
}
