//! # bazaar-store
//!
//! **Persistence seam** for the Bazaar core.
//!
//! The escrow engine never reads-then-writes a transaction. Every guarded
//! mutation goes through [`MarketStore::compare_and_update_transaction`],
//! the storage equivalent of
//!
//! ```text
//! UPDATE transactions SET ... WHERE id = $1 AND status = $expected
//! ```
//!
//! returning `WrongState` when zero rows would be affected. Listing
//! creation goes through [`MarketStore::insert_listing_within_quota`],
//! which counts and inserts under a per-seller critical section.
//!
//! ## Implementations
//!
//! - [`MemoryStore`]: one lock per entity row. Transitions on different
//!   transactions never contend on the same mutex.

pub mod memory;
pub mod store;
mod table;

pub use memory::MemoryStore;
pub use store::MarketStore;
