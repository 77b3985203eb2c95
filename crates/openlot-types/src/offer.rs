//! Out-of-band offers on assets, independent of any active listing.
//!
//! Funds equal to the offer amount are escrowed when the offer is made and
//! stay escrowed until acceptance, cancellation, or reclaim after expiry.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, AssetRef, Currency, OfferId};

/// An escrow-backed offer to buy an asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub id: OfferId,
    pub asset: AssetRef,
    pub offerer: AccountId,
    pub amount: Decimal,
    pub currency: Currency,
    pub expires_at: DateTime<Utc>,
    /// Cleared on accept or cancel. Expired offers stay active until the
    /// offerer cancels to reclaim escrow; they just can't be accepted.
    pub is_active: bool,
}

impl Offer {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Active and unexpired: the only state in which acceptance succeeds.
    #[must_use]
    pub fn is_acceptable(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired(now)
    }
}
