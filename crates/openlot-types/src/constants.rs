//! System-wide constants for the OpenLot marketplace engine.

/// Basis-point denominator: 1 bps = 1/10000.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Hard cap on the platform fee (10%).
pub const MAX_PLATFORM_FEE_BPS: u16 = 1_000;

/// Default platform fee (2.5%).
pub const DEFAULT_PLATFORM_FEE_BPS: u16 = 250;

/// Minimum-bid increment as a share of the listing price (5%).
pub const MIN_BID_INCREMENT_BPS: u16 = 500;

/// Default floor for Dutch auctions as a share of the start price (50%).
pub const DEFAULT_DUTCH_FLOOR_BPS: u16 = 5_000;

/// Default minimum auction duration in seconds (1 minute).
pub const DEFAULT_MIN_AUCTION_DURATION_SECS: u64 = 60;

/// Default maximum auction duration in seconds (30 days).
pub const DEFAULT_MAX_AUCTION_DURATION_SECS: u64 = 2_592_000;

/// Default page size for listing enumeration views.
pub const DEFAULT_PAGE_LIMIT: usize = 20;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "OpenLot";
