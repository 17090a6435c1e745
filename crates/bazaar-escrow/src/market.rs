//! The [`Marketplace`] handle and the helpers every operation shares.

use std::sync::Arc;

use bazaar_notify::NotificationSink;
use bazaar_store::MarketStore;
use bazaar_types::{
    Actor, ActorId, EventKind, Listing, ListingId, MarketConfig, MarketError, Notification,
    Result, Subject, Transaction, TransactionId,
};
use tracing::debug;

/// Entry point for every marketplace operation.
///
/// Operations take `&self`; share one instance across threads behind an
/// `Arc`. All consistency comes from the store's atomic primitives, so the
/// handle itself holds no locks.
pub struct Marketplace<S> {
    pub(crate) store: S,
    pub(crate) sink: Arc<dyn NotificationSink>,
    pub(crate) config: MarketConfig,
}

impl<S: MarketStore> Marketplace<S> {
    /// Build a marketplace over `store`, emitting notifications to `sink`.
    ///
    /// # Errors
    /// `Configuration` if `config` fails validation.
    pub fn new(store: S, sink: Arc<dyn NotificationSink>, config: MarketConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            sink,
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    // ----- lookups ----------------------------------------------------------

    pub(crate) fn require_actor(&self, id: ActorId) -> Result<Actor> {
        self.store.actor(id).ok_or(MarketError::ActorNotFound(id))
    }

    pub(crate) fn require_listing(&self, id: ListingId) -> Result<Listing> {
        self.store.listing(id).ok_or(MarketError::ListingNotFound(id))
    }

    pub(crate) fn require_transaction(&self, id: TransactionId) -> Result<Transaction> {
        self.store
            .transaction(id)
            .ok_or(MarketError::TransactionNotFound(id))
    }

    /// The caller, provided it is registered with the Operator role.
    ///
    /// An unregistered caller holds no role, so it is `Forbidden` as well.
    pub(crate) fn require_operator(&self, caller: ActorId, action: &str) -> Result<Actor> {
        match self.store.actor(caller) {
            Some(actor) if actor.is_operator() => Ok(actor),
            Some(actor) => {
                debug!(caller = %caller, role = %actor.role, action, "Operator-only action rejected");
                Err(MarketError::forbidden(format!("{action} requires the operator role")))
            }
            None => {
                debug!(caller = %caller, action, "Operator-only action from unregistered caller");
                Err(MarketError::forbidden(format!("{action} requires the operator role")))
            }
        }
    }

    // ----- notifications ----------------------------------------------------

    pub(crate) fn notify(&self, recipient: ActorId, kind: EventKind, subject: Subject) {
        self.sink.notify(Notification::new(recipient, kind, subject));
    }

    /// One notification per operator; each is handed off independently.
    pub(crate) fn notify_operators(&self, kind: EventKind, subject: &Subject) {
        for operator in self.store.actors().iter().filter(|a| a.is_operator()) {
            self.notify(operator.id, kind, subject.clone());
        }
    }
}

#[cfg(test)]
pub(crate) mod testkit {
    use super::*;
    use bazaar_notify::RecordingSink;
    use bazaar_store::MemoryStore;
    use bazaar_types::NewListing;
    use rust_decimal::Decimal;

    pub const OPERATOR: ActorId = ActorId(1);
    pub const SELLER: ActorId = ActorId(10);
    pub const BUYER: ActorId = ActorId(20);

    /// Operator 1, seller 10 (`@seller`), buyer 20 (`@buyer`).
    pub fn market() -> (Marketplace<MemoryStore>, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        let config = MarketConfig {
            bootstrap_operators: vec![OPERATOR],
            ..MarketConfig::default()
        };
        let market = Marketplace::new(MemoryStore::new(), sink.clone(), config).unwrap();
        market.register(OPERATOR, Some("ops".into()), "Ops").unwrap();
        market.register(SELLER, Some("seller".into()), "Seller").unwrap();
        market.become_seller(SELLER).unwrap();
        market.register(BUYER, Some("buyer".into()), "Buyer").unwrap();
        sink.take();
        (market, sink)
    }

    /// An approved, active listing owned by [`SELLER`].
    pub fn approved_listing(market: &Marketplace<MemoryStore>, price: Decimal) -> Listing {
        let listing = market.create_listing(SELLER, NewListing::dummy(price)).unwrap();
        market.approve_listing(listing.id, OPERATOR).unwrap()
    }
}
