//! System-wide constants for the Bazaar escrow marketplace.

/// Money is fixed-point with two decimal places.
pub const MONEY_SCALE: u32 = 2;

/// Default operator fee, in tenths of a percent (55 = 5.5%).
pub const DEFAULT_FEE_PERMILLE: i64 = 55;

/// Default maximum number of simultaneously active listings per seller.
pub const DEFAULT_LISTING_QUOTA: u32 = 5;

/// Experience points awarded per completed sale.
pub const DEFAULT_EXPERIENCE_PER_DEAL: u64 = 100;

/// Experience at which a seller reaches Silver.
pub const DEFAULT_SILVER_THRESHOLD: u64 = 2_000;

/// Experience at which a seller reaches Gold.
pub const DEFAULT_GOLD_THRESHOLD: u64 = 5_000;

/// Experience at which a seller reaches Platinum.
pub const DEFAULT_PLATINUM_THRESHOLD: u64 = 10_000;

/// Largest listing price, in cents (10 digits, 2 decimals).
pub const DEFAULT_MAX_LISTING_PRICE_CENTS: i64 = 9_999_999_999;

/// Pending listings shown to an operator at once.
pub const DEFAULT_PENDING_LISTINGS_LIMIT: usize = 20;

/// Sellers shown on the leaderboard.
pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;

/// Transactions shown in a buyer's or seller's history.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Per-delivery timeout for the notification dispatcher (milliseconds).
pub const DEFAULT_DELIVERY_TIMEOUT_MS: u64 = 5_000;

/// Lowest review rating.
pub const MIN_RATING: u8 = 1;

/// Highest review rating.
pub const MAX_RATING: u8 = 5;

/// Maximum title length, in characters.
pub const MAX_TITLE_LEN: usize = 255;

/// Maximum category length, in characters.
pub const MAX_CATEGORY_LEN: usize = 100;

/// Fresh ids tried when a new transaction's reference code collides.
pub const REFERENCE_ATTEMPTS: usize = 4;
