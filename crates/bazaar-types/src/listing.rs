//! Item listings and the moderation flags that gate them.
//!
//! A listing is purchasable iff it is both `approved` (operator-set, one
//! way) and `active` (owner/operator toggle). The two flags are
//! independent: approving never touches `active` and deactivating never
//! touches `approved`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ActorId, ListingId};

/// Seller-supplied listing fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    /// Positive, at most two decimal places.
    pub price: Decimal,
    pub category: String,
}

/// An item offered by a seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    /// Exclusive owner.
    pub seller_id: ActorId,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    /// Set by an operator; flips false → true exactly once.
    pub approved: bool,
    /// Visible in the catalog when `approved` is also set.
    pub active: bool,
    pub views: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    /// Build an unapproved, active listing from seller-supplied fields.
    #[must_use]
    pub fn new(seller_id: ActorId, fields: NewListing) -> Self {
        let now = Utc::now();
        Self {
            id: ListingId::new(),
            seller_id,
            title: fields.title,
            description: fields.description,
            price: fields.price,
            category: fields.category,
            approved: false,
            active: true,
            views: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn is_purchasable(&self) -> bool {
        self.approved && self.active
    }

    /// Awaiting operator moderation.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.approved && self.active
    }
}

/// Dummy listing fields for testing. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl NewListing {
    pub fn dummy(price: Decimal) -> Self {
        Self {
            title: "Diamond sword".to_string(),
            description: "Sharpness V, unbreaking III".to_string(),
            price,
            category: "Weapons".to_string(),
        }
    }
}
