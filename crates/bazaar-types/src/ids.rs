//! Identifiers used throughout Bazaar.
//!
//! Listings and transactions use UUIDv7 for time-ordered sorting. Actors
//! are keyed by the numeric id the chat transport assigns them.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// ActorId
// ---------------------------------------------------------------------------

/// Identifier of a marketplace participant, as issued by the chat transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ActorId(pub i64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ListingId
// ---------------------------------------------------------------------------

/// Unique listing identifier. Uses UUIDv7 for time-ordered sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ListingId(pub Uuid);

impl ListingId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ListingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listing:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// TransactionId
// ---------------------------------------------------------------------------

/// Globally unique escrow transaction identifier.
///
/// Users quote the short [`reference`](TransactionId::reference) code in
/// payment comments; it is taken from the random tail of the UUIDv7, not
/// the timestamp prefix, so orders created in the same millisecond still
/// get distinct codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TransactionId(pub Uuid);

impl TransactionId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// 8-character uppercase hex code shown to buyers and sellers.
    #[must_use]
    pub fn reference(&self) -> String {
        let simple = self.0.simple().to_string();
        simple[simple.len() - 8..].to_ascii_uppercase()
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_id_ordering() {
        let a = ListingId::new();
        let b = ListingId::new();
        assert!(a < b);
    }

    #[test]
    fn transaction_reference_shape() {
        let id = TransactionId::new();
        let code = id.reference();
        assert_eq!(code.len(), 8);
        assert!(code.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(code, code.to_ascii_uppercase());
    }

    #[test]
    fn transaction_references_differ_within_same_millisecond() {
        let codes: std::collections::HashSet<String> =
            (0..64).map(|_| TransactionId::new().reference()).collect();
        // 32 random bits per code; a collision among 64 is vanishingly rare.
        assert_eq!(codes.len(), 64);
    }

    #[test]
    fn actor_id_display() {
        assert_eq!(ActorId(42).to_string(), "42");
    }
}
