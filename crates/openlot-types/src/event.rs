//! Events emitted for external observers and indexers.
//!
//! Each variant carries the full set of identifiers and amounts needed to
//! reconstruct marketplace state without re-querying the engine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, AssetRef, Currency, ListingId, ListingKind, OfferId, SaleId};

/// A state change observable from outside the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketEvent {
    ListingCreated {
        listing_id: ListingId,
        asset: AssetRef,
        seller: AccountId,
        price: Decimal,
        currency: Currency,
        kind: ListingKind,
        ends_at: Option<DateTime<Utc>>,
    },
    ListingSold {
        listing_id: ListingId,
        asset: AssetRef,
        seller: AccountId,
        buyer: AccountId,
        price: Decimal,
        platform_fee: Decimal,
        royalty_amount: Decimal,
        seller_proceeds: Decimal,
        currency: Currency,
        sale_id: SaleId,
    },
    ListingCancelled {
        listing_id: ListingId,
        asset: AssetRef,
        seller: AccountId,
        refunded_bid: Option<Decimal>,
    },
    ListingExpired {
        listing_id: ListingId,
        asset: AssetRef,
    },
    BidPlaced {
        listing_id: ListingId,
        bidder: AccountId,
        amount: Decimal,
        previous_bidder: Option<AccountId>,
        refunded: Decimal,
    },
    OfferMade {
        offer_id: OfferId,
        asset: AssetRef,
        offerer: AccountId,
        amount: Decimal,
        currency: Currency,
        expires_at: DateTime<Utc>,
    },
    OfferAccepted {
        offer_id: OfferId,
        asset: AssetRef,
        seller: AccountId,
        offerer: AccountId,
        amount: Decimal,
        sale_id: SaleId,
    },
    OfferCancelled {
        offer_id: OfferId,
        offerer: AccountId,
        refunded: Decimal,
    },
    PlatformFeeUpdated {
        old_bps: u16,
        new_bps: u16,
    },
    CurrencySupportUpdated {
        currency: Currency,
        enabled: bool,
    },
    Paused,
    Unpaused,
}

impl MarketEvent {
    /// Stable label for log lines and indexers.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::ListingCreated { .. } => "LISTING_CREATED",
            Self::ListingSold { .. } => "LISTING_SOLD",
            Self::ListingCancelled { .. } => "LISTING_CANCELLED",
            Self::ListingExpired { .. } => "LISTING_EXPIRED",
            Self::BidPlaced { .. } => "BID_PLACED",
            Self::OfferMade { .. } => "OFFER_MADE",
            Self::OfferAccepted { .. } => "OFFER_ACCEPTED",
            Self::OfferCancelled { .. } => "OFFER_CANCELLED",
            Self::PlatformFeeUpdated { .. } => "PLATFORM_FEE_UPDATED",
            Self::CurrencySupportUpdated { .. } => "CURRENCY_SUPPORT_UPDATED",
            Self::Paused => "PAUSED",
            Self::Unpaused => "UNPAUSED",
        }
    }
}

impl std::fmt::Display for MarketEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
