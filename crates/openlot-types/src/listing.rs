//! Listing records and their lifecycle.
//!
//! A listing is created Active and transitions exactly once into one of the
//! terminal states {Sold, Cancelled, Expired}; terminal states are immutable.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, AssetRef, Currency, ListingId, bps};

/// How the listing sells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingKind {
    /// Take-it-or-leave-it at `price`.
    FixedPrice,
    /// English auction: ascending bids, highest bid wins at the end time.
    Auction,
    /// Dutch auction: asking price declines from `price` toward a floor;
    /// the first taker wins at the current ask.
    DutchAuction,
}

impl std::fmt::Display for ListingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FixedPrice => write!(f, "FIXED_PRICE"),
            Self::Auction => write!(f, "AUCTION"),
            Self::DutchAuction => write!(f, "DUTCH_AUCTION"),
        }
    }
}

/// Lifecycle status of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingStatus {
    Active,
    Sold,
    Cancelled,
    Expired,
}

impl ListingStatus {
    /// Terminal states never transition again.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Active)
    }
}

impl std::fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Sold => write!(f, "SOLD"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Expired => write!(f, "EXPIRED"),
        }
    }
}

/// A sale listing. Owned exclusively by the engine; the underlying asset's
/// ownership lives in the external registry and is only referenced here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub asset: AssetRef,
    pub seller: AccountId,
    /// Start price. For fixed-price listings this is the sale price.
    pub price: Decimal,
    pub currency: Currency,
    pub kind: ListingKind,
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
    /// `None` iff `kind == FixedPrice`.
    pub ends_at: Option<DateTime<Utc>>,
    /// Precomputed: 5% of `price`, truncated.
    pub min_bid_increment: Decimal,
    /// Standing highest bidder of an English auction, if any.
    pub highest_bidder: Option<AccountId>,
    /// Monotonically non-decreasing while Active.
    pub highest_bid: Decimal,
}

impl Listing {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == ListingStatus::Active
    }

    /// Whether the listing's end time has passed. Fixed-price listings
    /// never end by time.
    #[must_use]
    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        self.ends_at.is_some_and(|end| now >= end)
    }

    /// Minimum acceptable bid for an English auction: the start price for
    /// the first bid, otherwise the standing bid plus the increment.
    #[must_use]
    pub fn minimum_bid(&self) -> Decimal {
        if self.highest_bidder.is_none() {
            self.price
        } else {
            self.highest_bid + self.min_bid_increment
        }
    }

    /// Current asking price of a Dutch auction: linear decline from `price`
    /// at creation to `floor(price * floor_bps / 10000)` at `ends_at`,
    /// clamped at the floor afterwards. For other kinds this is `price`.
    #[must_use]
    pub fn current_ask(&self, now: DateTime<Utc>, floor_bps: u16) -> Decimal {
        let Some(ends_at) = self.ends_at else {
            return self.price;
        };
        if self.kind != ListingKind::DutchAuction {
            return self.price;
        }

        let floor_price = bps::share(self.price, floor_bps);
        let total = (ends_at - self.created_at).num_seconds();
        let elapsed = (now - self.created_at).num_seconds();
        if elapsed >= total || total <= 0 {
            return floor_price;
        }
        if elapsed <= 0 {
            return self.price;
        }
        let discount = ((self.price - floor_price) * Decimal::from(elapsed)
            / Decimal::from(total))
        .floor();
        self.price - discount
    }
}
