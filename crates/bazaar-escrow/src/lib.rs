//! # bazaar-escrow
//!
//! **The marketplace core**: an operator-mediated escrow between one buyer
//! and one seller, gated by listing moderation and feeding seller
//! reputation.
//!
//! ## Architecture
//!
//! A caller action enters [`Marketplace`] with the caller's identity. Each
//! operation:
//! 1. Resolves the referenced entity (`*NotFound`)
//! 2. Checks the caller's role or ownership (`Forbidden`)
//! 3. Commits the transition as one compare-and-set on the stored status
//!    (`WrongState` on mismatch, nothing written)
//! 4. Runs post-commit effects: reputation credit on completion, then
//!    notifications
//!
//! ## Modules
//!
//! - [`directory`]: actor registration, role changes, contacts
//! - [`moderation`]: listing creation quota and the approval gate
//! - [`escrow`]: the transaction state machine
//! - [`reputation`]: pure seller-stat update on a completed sale
//! - [`reviews`]: buyer reviews and seller rating
//! - [`queries`]: read-only views and platform statistics
//! - [`telemetry`]: tracing subscriber bootstrap

pub mod directory;
pub mod escrow;
mod market;
pub mod moderation;
pub mod queries;
pub mod reputation;
pub mod reviews;
pub mod telemetry;

pub use market::Marketplace;
pub use queries::{ActorCounts, PlatformStats};
pub use reputation::SaleCredit;
