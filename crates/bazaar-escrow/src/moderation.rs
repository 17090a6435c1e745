//! Listing Moderation Gate.
//!
//! A listing is purchasable iff `approved && active`:
//! - `approved` is set once by an operator and never cleared
//! - `active` is toggled by the owner or an operator
//!
//! A seller may hold at most `listing_quota` active listings. The quota is
//! checked at creation only, atomically per seller.

use bazaar_store::MarketStore;
use bazaar_types::{
    ActorId, EventKind, Listing, ListingId, MarketError, NewListing, Result, Subject, constants,
};
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::Marketplace;

impl<S: MarketStore> Marketplace<S> {
    /// Publish a new listing, pending moderation.
    ///
    /// # Errors
    /// - `ActorNotFound` if the seller is not registered
    /// - `Forbidden` if the caller is not a Seller
    /// - `InvalidListing` if a field fails validation
    /// - `QuotaExceeded` if the seller already has `listing_quota` active listings
    pub fn create_listing(&self, seller_id: ActorId, fields: NewListing) -> Result<Listing> {
        let seller = self.require_actor(seller_id)?;
        let Some(profile) = seller.seller.as_ref() else {
            debug!(actor = %seller_id, role = %seller.role, "Listing rejected: not a seller");
            return Err(MarketError::forbidden("only sellers may create listings"));
        };
        let fields = validate_listing(fields, self.config.max_listing_price)?;

        let listing = self
            .store
            .insert_listing_within_quota(Listing::new(seller_id, fields), profile.listing_quota)?;
        info!(
            listing = %listing.id,
            seller = %seller_id,
            price = %listing.price,
            "Listing submitted for moderation"
        );

        self.notify_operators(EventKind::ListingSubmitted, &Subject::Listing(listing.clone()));
        Ok(listing)
    }

    /// Operator approval. Approving an approved listing is a no-op and does
    /// not notify the owner again. Never touches `active`.
    pub fn approve_listing(&self, listing_id: ListingId, caller: ActorId) -> Result<Listing> {
        self.require_listing(listing_id)?;
        self.require_operator(caller, "approve_listing")?;

        let mut newly_approved = false;
        let listing = self.store.update_listing(listing_id, &mut |listing| {
            newly_approved = !listing.approved;
            if newly_approved {
                listing.approved = true;
                listing.updated_at = Utc::now();
            }
            Ok(())
        })?;

        if newly_approved {
            info!(listing = %listing_id, operator = %caller, "Listing approved");
            self.notify(
                listing.seller_id,
                EventKind::ListingApproved,
                Subject::Listing(listing.clone()),
            );
        }
        Ok(listing)
    }

    /// Show or hide a listing. Owner or operator only; never touches
    /// `approved`.
    pub fn set_listing_active(
        &self,
        listing_id: ListingId,
        caller: ActorId,
        active: bool,
    ) -> Result<Listing> {
        let listing = self.require_listing(listing_id)?;
        let is_operator = self.store.actor(caller).is_some_and(|a| a.is_operator());
        if listing.seller_id != caller && !is_operator {
            debug!(listing = %listing_id, caller = %caller, "Listing toggle rejected");
            return Err(MarketError::forbidden(
                "only the owner or an operator may change listing visibility",
            ));
        }

        let listing = self.store.update_listing(listing_id, &mut |listing| {
            listing.active = active;
            listing.updated_at = Utc::now();
            Ok(())
        })?;
        info!(listing = %listing_id, caller = %caller, active, "Listing visibility changed");
        Ok(listing)
    }

    /// Count one catalog view.
    pub fn record_view(&self, listing_id: ListingId) -> Result<Listing> {
        self.store.update_listing(listing_id, &mut |listing| {
            listing.views = listing.views.saturating_add(1);
            Ok(())
        })
    }

    /// Look up a listing.
    pub fn listing(&self, id: ListingId) -> Result<Listing> {
        self.require_listing(id)
    }
}

/// Trim text fields and check every constraint a stored listing must meet.
/// The returned price carries exactly two decimal places.
pub fn validate_listing(fields: NewListing, max_price: Decimal) -> Result<NewListing> {
    let invalid = |reason: String| MarketError::InvalidListing { reason };

    let title = fields.title.trim().to_string();
    if title.is_empty() {
        return Err(invalid("title must not be empty".to_string()));
    }
    if title.chars().count() > constants::MAX_TITLE_LEN {
        return Err(invalid(format!(
            "title exceeds {} characters",
            constants::MAX_TITLE_LEN
        )));
    }

    let category = fields.category.trim().to_string();
    if category.is_empty() {
        return Err(invalid("category must not be empty".to_string()));
    }
    if category.chars().count() > constants::MAX_CATEGORY_LEN {
        return Err(invalid(format!(
            "category exceeds {} characters",
            constants::MAX_CATEGORY_LEN
        )));
    }

    if fields.price <= Decimal::ZERO {
        return Err(invalid(format!("price must be positive, got {}", fields.price)));
    }
    if fields.price.normalize().scale() > constants::MONEY_SCALE {
        return Err(invalid(format!(
            "price has more than {} decimal places: {}",
            constants::MONEY_SCALE,
            fields.price
        )));
    }
    if fields.price > max_price {
        return Err(invalid(format!("price exceeds {max_price}")));
    }
    let mut price = fields.price;
    price.rescale(constants::MONEY_SCALE);

    Ok(NewListing {
        title,
        description: fields.description.trim().to_string(),
        price,
        category,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::testkit::*;

    fn fields(price: Decimal) -> NewListing {
        NewListing::dummy(price)
    }

    #[test]
    fn create_listing_is_pending_and_notifies_operators() {
        let (market, sink) = market();
        let listing = market.create_listing(SELLER, fields(Decimal::new(1999, 2))).unwrap();
        assert!(!listing.approved);
        assert!(listing.active);
        assert!(market.pending_listings().iter().any(|l| l.id == listing.id));
        assert_eq!(sink.recipients_of(EventKind::ListingSubmitted), vec![OPERATOR]);
    }

    #[test]
    fn buyers_cannot_create_listings() {
        let (market, _) = market();
        let err = market.create_listing(BUYER, fields(Decimal::ONE)).unwrap_err();
        assert!(matches!(err, MarketError::Forbidden { .. }));
    }

    #[test]
    fn quota_exceeded_at_limit() {
        let (market, _) = market();
        for _ in 0..5 {
            market.create_listing(SELLER, fields(Decimal::ONE)).unwrap();
        }
        let err = market.create_listing(SELLER, fields(Decimal::ONE)).unwrap_err();
        assert!(matches!(err, MarketError::QuotaExceeded { quota: 5, active: 5 }));
    }

    #[test]
    fn raised_quota_allows_more() {
        let (market, _) = market();
        market.set_listing_quota(SELLER, 1, OPERATOR).unwrap();
        market.create_listing(SELLER, fields(Decimal::ONE)).unwrap();
        assert!(market.create_listing(SELLER, fields(Decimal::ONE)).is_err());

        market.set_listing_quota(SELLER, 2, OPERATOR).unwrap();
        assert!(market.create_listing(SELLER, fields(Decimal::ONE)).is_ok());
    }

    #[test]
    fn approve_is_operator_only_and_idempotent() {
        let (market, sink) = market();
        let listing = market.create_listing(SELLER, fields(Decimal::TEN)).unwrap();

        let err = market.approve_listing(listing.id, SELLER).unwrap_err();
        assert!(matches!(err, MarketError::Forbidden { .. }));

        market.approve_listing(listing.id, OPERATOR).unwrap();
        let again = market.approve_listing(listing.id, OPERATOR).unwrap();
        assert!(again.approved);
        assert_eq!(sink.kinds_for(SELLER), vec![EventKind::ListingApproved]);
    }

    #[test]
    fn approve_unknown_listing_is_not_found() {
        let (market, _) = market();
        let err = market.approve_listing(ListingId::new(), OPERATOR).unwrap_err();
        assert!(matches!(err, MarketError::ListingNotFound(_)));
    }

    #[test]
    fn approval_and_visibility_are_independent() {
        let (market, _) = market();
        let listing = market.create_listing(SELLER, fields(Decimal::TEN)).unwrap();

        let hidden = market.set_listing_active(listing.id, SELLER, false).unwrap();
        assert!(!hidden.active);
        assert!(!hidden.approved);

        let approved = market.approve_listing(listing.id, OPERATOR).unwrap();
        assert!(approved.approved);
        assert!(!approved.active);

        let shown = market.set_listing_active(listing.id, OPERATOR, true).unwrap();
        assert!(shown.approved && shown.active);
    }

    #[test]
    fn strangers_cannot_toggle_visibility() {
        let (market, _) = market();
        let listing = market.create_listing(SELLER, fields(Decimal::TEN)).unwrap();
        for caller in [BUYER, ActorId(999)] {
            let err = market.set_listing_active(listing.id, caller, false).unwrap_err();
            assert!(matches!(err, MarketError::Forbidden { .. }), "{caller}: {err}");
        }
        assert!(market.listing(listing.id).unwrap().active);
    }

    #[test]
    fn unregistered_caller_cannot_approve() {
        let (market, sink) = market();
        let listing = market.create_listing(SELLER, fields(Decimal::TEN)).unwrap();
        let err = market.approve_listing(listing.id, ActorId(999)).unwrap_err();
        assert!(matches!(err, MarketError::Forbidden { .. }), "{err}");
        assert!(!market.listing(listing.id).unwrap().approved);
        assert!(sink.kinds_for(SELLER).is_empty());
    }

    #[test]
    fn views_are_counted() {
        let (market, _) = market();
        let listing = market.create_listing(SELLER, fields(Decimal::TEN)).unwrap();
        market.record_view(listing.id).unwrap();
        assert_eq!(market.record_view(listing.id).unwrap().views, 2);
    }

    #[test]
    fn validation_rules() {
        let max = Decimal::new(9_999_999_999, 2);
        let ok = validate_listing(fields(Decimal::new(5, 0)), max).unwrap();
        assert_eq!(ok.price.to_string(), "5.00");

        assert!(validate_listing(fields(Decimal::ZERO), max).is_err());
        assert!(validate_listing(fields(Decimal::new(-1, 0)), max).is_err());
        assert!(validate_listing(fields(Decimal::new(1001, 3)), max).is_err());
        assert!(validate_listing(fields(Decimal::new(10_000_000_000, 2)), max).is_err());
        // Trailing zeros beyond two places are fine.
        assert!(validate_listing(fields(Decimal::new(1500, 3)), max).is_ok());

        let mut blank = fields(Decimal::ONE);
        blank.title = "   ".to_string();
        assert!(validate_listing(blank, max).is_err());

        let mut no_category = fields(Decimal::ONE);
        no_category.category = String::new();
        assert!(validate_listing(no_category, max).is_err());

        let mut long = fields(Decimal::ONE);
        long.title = "x".repeat(constants::MAX_TITLE_LEN + 1);
        assert!(validate_listing(long, max).is_err());
    }
}
