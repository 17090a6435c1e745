//! Actor Directory: registration, role changes and contact strings.

use bazaar_store::MarketStore;
use bazaar_types::{Actor, ActorId, MarketError, Result, Role, SellerProfile};
use chrono::Utc;
use tracing::info;

use crate::Marketplace;

impl<S: MarketStore> Marketplace<S> {
    /// Get-or-create an actor on contact.
    ///
    /// First contact creates a Buyer, or an Operator when `id` is listed in
    /// `bootstrap_operators`. Later contacts refresh the username and
    /// display name only; role and seller stats are never touched here.
    pub fn register(
        &self,
        id: ActorId,
        username: Option<String>,
        display_name: &str,
    ) -> Result<Actor> {
        let role = if self.config.bootstrap_operators.contains(&id) {
            Role::Operator
        } else {
            Role::Buyer
        };
        let candidate = Actor::new(
            id,
            username.clone(),
            display_name,
            role,
            self.config.default_listing_quota,
        );
        let (stored, created) = self.store.get_or_insert_actor(candidate);
        if created {
            info!(actor = %id, role = %role, "Actor registered");
            return Ok(stored);
        }
        if stored.username == username && stored.display_name == display_name {
            return Ok(stored);
        }
        self.store.update_actor(id, &mut |actor| {
            actor.username.clone_from(&username);
            display_name.clone_into(&mut actor.display_name);
            actor.updated_at = Utc::now();
            Ok(())
        })
    }

    /// Promote a Buyer to Seller with a fresh Bronze profile.
    ///
    /// # Errors
    /// - `ActorNotFound` if `id` is not registered
    /// - `RoleChange` if the actor is already a Seller or is an Operator
    pub fn become_seller(&self, id: ActorId) -> Result<Actor> {
        let quota = self.config.default_listing_quota;
        let actor = self.store.update_actor(id, &mut |actor| match actor.role {
            Role::Buyer => {
                actor.role = Role::Seller;
                actor.seller = Some(SellerProfile::new(quota));
                actor.updated_at = Utc::now();
                Ok(())
            }
            Role::Seller => Err(MarketError::RoleChange {
                reason: "already a seller".to_string(),
            }),
            Role::Operator => Err(MarketError::RoleChange {
                reason: "operators cannot become sellers".to_string(),
            }),
        })?;
        info!(actor = %id, quota, "Actor became a seller");
        Ok(actor)
    }

    /// Operator-only adjustment of a seller's active-listing quota.
    ///
    /// Lowering the quota below the current active count does not
    /// deactivate anything; it only blocks new listings.
    pub fn set_listing_quota(&self, seller: ActorId, quota: u32, caller: ActorId) -> Result<Actor> {
        self.require_actor(seller)?;
        self.require_operator(caller, "set_listing_quota")?;
        if quota == 0 {
            return Err(MarketError::InvalidListing {
                reason: "listing quota must be positive".to_string(),
            });
        }
        let actor = self.store.update_actor(seller, &mut |actor| {
            let Some(profile) = actor.seller.as_mut() else {
                return Err(MarketError::RoleChange {
                    reason: format!("actor {} is not a seller", actor.id),
                });
            };
            profile.listing_quota = quota;
            actor.updated_at = Utc::now();
            Ok(())
        })?;
        info!(seller = %seller, quota, operator = %caller, "Listing quota changed");
        Ok(actor)
    }

    /// Look up an actor.
    pub fn actor(&self, id: ActorId) -> Result<Actor> {
        self.require_actor(id)
    }

    /// `@username`, or `ID: <id>` for actors without a handle.
    pub fn contact(&self, id: ActorId) -> Result<String> {
        Ok(self.require_actor(id)?.contact())
    }

    /// Every Operator, ordered by id.
    pub fn operators(&self) -> Vec<Actor> {
        let mut operators: Vec<Actor> = self
            .store
            .actors()
            .into_iter()
            .filter(Actor::is_operator)
            .collect();
        operators.sort_by_key(|a| a.id);
        operators
    }
}
