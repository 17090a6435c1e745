//! Marketplace participants.
//!
//! An [`Actor`] is created on first contact and never deleted. Its role may
//! change once from Buyer to Seller; seller-only reputation fields live in
//! [`SellerProfile`] and exist only while the actor is a seller.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ActorId;

/// The capability an actor holds in the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Default role; may purchase listings.
    Buyer,
    /// May publish listings (and still purchase from others).
    Seller,
    /// Trusted intermediary: moderates listings, verifies payments, releases funds.
    Operator,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buyer => write!(f, "BUYER"),
            Self::Seller => write!(f, "SELLER"),
            Self::Operator => write!(f, "OPERATOR"),
        }
    }
}

/// Seller reputation bracket, derived from cumulative experience points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bronze => write!(f, "BRONZE"),
            Self::Silver => write!(f, "SILVER"),
            Self::Gold => write!(f, "GOLD"),
            Self::Platinum => write!(f, "PLATINUM"),
        }
    }
}

/// Seller-only reputation and capacity fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerProfile {
    /// Current reputation bracket.
    pub tier: Tier,
    /// Sum of `amount` over every completed sale.
    pub total_sales: Decimal,
    /// Number of completed sales.
    pub total_transactions: u64,
    /// Mean review rating, 0.00–5.00. Zero until the first review.
    pub rating: Decimal,
    /// Flat per-deal experience points.
    pub experience: u64,
    /// Maximum number of simultaneously active listings.
    pub listing_quota: u32,
}

impl SellerProfile {
    /// A fresh Bronze profile with the given listing quota.
    #[must_use]
    pub fn new(listing_quota: u32) -> Self {
        Self {
            tier: Tier::Bronze,
            total_sales: Decimal::ZERO,
            total_transactions: 0,
            rating: Decimal::ZERO,
            experience: 0,
            listing_quota,
        }
    }
}

/// A registered marketplace participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    /// Transport handle (without the leading `@`), if the user has one.
    pub username: Option<String>,
    pub display_name: String,
    pub role: Role,
    /// Present iff `role == Role::Seller`.
    pub seller: Option<SellerProfile>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Actor {
    /// Create a new actor with the given role. Sellers get a Bronze profile
    /// with `listing_quota`.
    #[must_use]
    pub fn new(
        id: ActorId,
        username: Option<String>,
        display_name: impl Into<String>,
        role: Role,
        listing_quota: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            username,
            display_name: display_name.into(),
            role,
            seller: (role == Role::Seller).then(|| SellerProfile::new(listing_quota)),
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn is_operator(&self) -> bool {
        self.role == Role::Operator
    }

    #[must_use]
    pub fn is_seller(&self) -> bool {
        self.role == Role::Seller
    }

    /// Contact string handed to the counterparty once a payment is approved:
    /// `@username` when a handle exists, `ID: <id>` otherwise.
    #[must_use]
    pub fn contact(&self) -> String {
        match self.username.as_deref().filter(|u| !u.is_empty()) {
            Some(username) => format!("@{username}"),
            None => format!("ID: {}", self.id),
        }
    }
}
