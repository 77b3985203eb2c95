//! Configuration for a marketplace engine instance.

use serde::{Deserialize, Serialize};

use crate::{AccountId, Currency, OpenlotError, Result, constants};

/// Configuration for one [`Marketplace`] instance.
///
/// Durations are in whole seconds; fee shares are basis points.
///
/// [`Marketplace`]: https://docs.rs/openlot-engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketplaceConfig {
    /// Account that receives the platform fee on every sale.
    pub treasury: AccountId,
    /// Platform fee in basis points, capped at [`constants::MAX_PLATFORM_FEE_BPS`].
    pub platform_fee_bps: u16,
    /// Minimum-bid increment as a share of the listing price.
    pub min_bid_increment_bps: u16,
    /// Dutch auction floor as a share of the start price.
    pub dutch_floor_bps: u16,
    /// Minimum allowed auction duration in seconds.
    pub min_auction_duration_secs: u64,
    /// Maximum allowed auction duration in seconds.
    pub max_auction_duration_secs: u64,
    /// Currencies accepted for listings, bids, and offers.
    pub supported_currencies: Vec<Currency>,
}

impl MarketplaceConfig {
    /// Default configuration paying fees to `treasury`, accepting only the
    /// native currency.
    #[must_use]
    pub fn new(treasury: AccountId) -> Self {
        Self {
            treasury,
            platform_fee_bps: constants::DEFAULT_PLATFORM_FEE_BPS,
            min_bid_increment_bps: constants::MIN_BID_INCREMENT_BPS,
            dutch_floor_bps: constants::DEFAULT_DUTCH_FLOOR_BPS,
            min_auction_duration_secs: constants::DEFAULT_MIN_AUCTION_DURATION_SECS,
            max_auction_duration_secs: constants::DEFAULT_MAX_AUCTION_DURATION_SECS,
            supported_currencies: vec!["NATIVE".to_string()],
        }
    }

    /// Validate internal consistency.
    ///
    /// # Errors
    /// - `FeeTooHigh` if the platform fee exceeds the hard cap
    /// - `InvalidDuration` if the duration bounds are inverted
    pub fn validate(&self) -> Result<()> {
        if self.platform_fee_bps > constants::MAX_PLATFORM_FEE_BPS {
            return Err(OpenlotError::FeeTooHigh {
                bps: self.platform_fee_bps,
                cap_bps: constants::MAX_PLATFORM_FEE_BPS,
            });
        }
        if self.min_auction_duration_secs > self.max_auction_duration_secs {
            return Err(OpenlotError::InvalidDuration {
                secs: self.min_auction_duration_secs,
                min_secs: self.min_auction_duration_secs,
                max_secs: self.max_auction_duration_secs,
            });
        }
        Ok(())
    }

    /// Whether a currency is accepted for new listings, bids, and offers.
    #[must_use]
    pub fn supports_currency(&self, currency: &str) -> bool {
        self.supported_currencies.iter().any(|c| c == currency)
    }
}
