//! Configuration for a Bazaar marketplace instance.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ActorId, MarketError, Result, Tier, constants};

/// Experience thresholds for each seller tier. Bronze starts at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierThresholds {
    pub silver: u64,
    pub gold: u64,
    pub platinum: u64,
}

impl TierThresholds {
    /// Tier for a cumulative experience total.
    #[must_use]
    pub fn tier_for(&self, experience: u64) -> Tier {
        if experience >= self.platinum {
            Tier::Platinum
        } else if experience >= self.gold {
            Tier::Gold
        } else if experience >= self.silver {
            Tier::Silver
        } else {
            Tier::Bronze
        }
    }
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            silver: constants::DEFAULT_SILVER_THRESHOLD,
            gold: constants::DEFAULT_GOLD_THRESHOLD,
            platinum: constants::DEFAULT_PLATINUM_THRESHOLD,
        }
    }
}

/// Notification dispatcher settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// How long a single delivery may take before it is abandoned.
    pub delivery_timeout_ms: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            delivery_timeout_ms: constants::DEFAULT_DELIVERY_TIMEOUT_MS,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

/// Marketplace-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Operator fee in percent of the transaction amount (5.5 = 5.5%).
    pub fee_percent: Decimal,
    /// Active-listing quota granted to new sellers.
    pub default_listing_quota: u32,
    /// Experience awarded per completed sale.
    pub experience_per_deal: u64,
    /// Tier thresholds.
    pub tiers: TierThresholds,
    /// Largest accepted listing price.
    pub max_listing_price: Decimal,
    /// Cap on the pending-listings moderation queue.
    pub pending_listings_limit: usize,
    /// Sellers returned by the leaderboard.
    pub leaderboard_limit: usize,
    /// Transactions returned by buyer/seller history queries.
    pub history_limit: usize,
    /// Actors that receive the Operator role on first contact.
    pub bootstrap_operators: Vec<ActorId>,
    pub notify: NotifyConfig,
    pub log: LogConfig,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            fee_percent: Decimal::new(constants::DEFAULT_FEE_PERMILLE, 1),
            default_listing_quota: constants::DEFAULT_LISTING_QUOTA,
            experience_per_deal: constants::DEFAULT_EXPERIENCE_PER_DEAL,
            tiers: TierThresholds::default(),
            max_listing_price: Decimal::new(
                constants::DEFAULT_MAX_LISTING_PRICE_CENTS,
                constants::MONEY_SCALE,
            ),
            pending_listings_limit: constants::DEFAULT_PENDING_LISTINGS_LIMIT,
            leaderboard_limit: constants::DEFAULT_LEADERBOARD_LIMIT,
            history_limit: constants::DEFAULT_HISTORY_LIMIT,
            bootstrap_operators: Vec::new(),
            notify: NotifyConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl MarketConfig {
    /// Parse a JSON document (missing fields take their defaults) and
    /// validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings the engine cannot operate with.
    pub fn validate(&self) -> Result<()> {
        if self.fee_percent.is_sign_negative() || self.fee_percent >= Decimal::ONE_HUNDRED {
            return Err(MarketError::Configuration(format!(
                "fee_percent must be in [0, 100), got {}",
                self.fee_percent
            )));
        }
        if self.default_listing_quota == 0 {
            return Err(MarketError::Configuration(
                "default_listing_quota must be positive".to_string(),
            ));
        }
        let t = &self.tiers;
        if !(0 < t.silver && t.silver < t.gold && t.gold < t.platinum) {
            return Err(MarketError::Configuration(format!(
                "tier thresholds must be strictly increasing, got {}/{}/{}",
                t.silver, t.gold, t.platinum
            )));
        }
        if self.max_listing_price <= Decimal::ZERO {
            return Err(MarketError::Configuration(
                "max_listing_price must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = MarketConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.fee_percent, Decimal::new(55, 1));
        assert_eq!(cfg.default_listing_quota, 5);
        assert_eq!(cfg.max_listing_price.to_string(), "99999999.99");
    }

    #[test]
    fn tier_boundaries() {
        let t = TierThresholds::default();
        assert_eq!(t.tier_for(0), Tier::Bronze);
        assert_eq!(t.tier_for(1_999), Tier::Bronze);
        assert_eq!(t.tier_for(2_000), Tier::Silver);
        assert_eq!(t.tier_for(4_999), Tier::Silver);
        assert_eq!(t.tier_for(5_000), Tier::Gold);
        assert_eq!(t.tier_for(9_999), Tier::Gold);
        assert_eq!(t.tier_for(10_000), Tier::Platinum);
        assert_eq!(t.tier_for(u64::MAX), Tier::Platinum);
    }

    #[test]
    fn from_json_partial_document() {
        let cfg = MarketConfig::from_json(r#"{"fee_percent": "3.0", "bootstrap_operators": [7]}"#)
            .unwrap();
        assert_eq!(cfg.fee_percent, Decimal::new(3, 0));
        assert_eq!(cfg.bootstrap_operators, vec![ActorId(7)]);
        assert_eq!(cfg.default_listing_quota, 5);
    }

    #[test]
    fn rejects_bad_fee() {
        let err = MarketConfig::from_json(r#"{"fee_percent": "100"}"#).unwrap_err();
        assert!(matches!(err, MarketError::Configuration(_)));
    }

    #[test]
    fn rejects_unordered_tiers() {
        let cfg = MarketConfig {
            tiers: TierThresholds {
                silver: 5_000,
                gold: 2_000,
                platinum: 10_000,
            },
            ..MarketConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_zero_quota() {
        let cfg = MarketConfig {
            default_listing_quota: 0,
            ..MarketConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_garbage_json() {
        assert!(MarketConfig::from_json("{not json").is_err());
    }
}
