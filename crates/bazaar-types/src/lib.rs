//! # bazaar-types
//!
//! Shared types, errors, and configuration for the **Bazaar** escrow
//! marketplace.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`ActorId`], [`ListingId`], [`TransactionId`]
//! - **Actor model**: [`Actor`], [`Role`], [`Tier`], [`SellerProfile`]
//! - **Listing model**: [`Listing`], [`NewListing`]
//! - **Transaction model**: [`Transaction`], [`TransactionStatus`], [`FeeSplit`]
//! - **Review model**: [`Review`], [`mean_rating`]
//! - **Notifications**: [`Notification`], [`EventKind`], [`Subject`]
//! - **Configuration**: [`MarketConfig`], [`TierThresholds`], [`NotifyConfig`], [`LogConfig`]
//! - **Errors**: [`MarketError`] with `MK_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod actor;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod listing;
pub mod notification;
pub mod review;
pub mod transaction;

pub use actor::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use listing::*;
pub use notification::*;
pub use review::*;
pub use transaction::*;

// Constants are accessed via `bazaar_types::constants::FOO`
// (not re-exported to avoid name collisions).
