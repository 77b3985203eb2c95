//! Append-only sale records for the audit trail.
//!
//! Every completed settlement produces a [`SaleEvent`] carrying the full
//! fund split plus a SHA-256 digest over the settlement fields, so the
//! record can be independently checked for tampering. Sale events are
//! never mutated.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{AccountId, AssetRef, Currency, ListingId, OfferId, SaleId};

/// What triggered the sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SaleSource {
    /// A fixed-price purchase, Dutch take, or finalized English auction.
    Listing(ListingId),
    /// An accepted offer.
    Offer(OfferId),
}

impl std::fmt::Display for SaleSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Listing(id) => write!(f, "{id}"),
            Self::Offer(id) => write!(f, "{id}"),
        }
    }
}

/// One completed sale. `platform_fee + royalty_amount + seller_proceeds`
/// always equals `price` exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleEvent {
    pub sale_id: SaleId,
    pub source: SaleSource,
    pub asset: AssetRef,
    pub seller: AccountId,
    pub buyer: AccountId,
    pub price: Decimal,
    pub platform_fee: Decimal,
    pub royalty_amount: Decimal,
    pub seller_proceeds: Decimal,
    pub currency: Currency,
    pub occurred_at: DateTime<Utc>,
    /// SHA-256 over the settlement fields, see [`SaleEvent::compute_digest`].
    pub digest: [u8; 32],
}

impl SaleEvent {
    /// SHA-256 over the settlement-relevant fields in a fixed order.
    #[must_use]
    pub fn compute_digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(b"openlot:sale:v1:");
        hasher.update(self.source.to_string().as_bytes());
        hasher.update(self.asset.to_string().as_bytes());
        hasher.update(self.seller.0.as_bytes());
        hasher.update(self.buyer.0.as_bytes());
        hasher.update(self.price.to_string().as_bytes());
        hasher.update(self.platform_fee.to_string().as_bytes());
        hasher.update(self.royalty_amount.to_string().as_bytes());
        hasher.update(self.seller_proceeds.to_string().as_bytes());
        hasher.update(self.currency.as_bytes());
        hasher.update(self.occurred_at.timestamp_millis().to_le_bytes());
        hasher.finalize().into()
    }

    /// Whether the stored digest matches the record's fields.
    #[must_use]
    pub fn verify_digest(&self) -> bool {
        self.digest == self.compute_digest()
    }

    /// Hex rendering of the digest for logs.
    #[must_use]
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }
}
