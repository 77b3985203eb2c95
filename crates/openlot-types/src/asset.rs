//! Asset references and royalty policy.
//!
//! The engine never owns assets: an [`AssetRef`] points into the external
//! asset registry, which is the system of record for ownership and per-asset
//! royalty declarations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::AccountId;

/// Currency identifier (e.g. "NATIVE", "USDC").
pub type Currency = String;

/// Reference to a uniquely-identified asset in the external registry:
/// a collection plus a token id within it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AssetRef {
    /// Collection the asset belongs to.
    pub collection: String,
    /// Token id within the collection.
    pub token_id: u64,
}

impl AssetRef {
    #[must_use]
    pub fn new(collection: impl Into<String>, token_id: u64) -> Self {
        Self {
            collection: collection.into(),
            token_id,
        }
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.collection, self.token_id)
    }
}

/// Royalty declaration for an asset, fetched from the registry at
/// settlement time. Absence means zero royalty.
///
/// `royalty_bps` is trusted input — the registry enforces its own cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoyaltyPolicy {
    /// Who receives the royalty payout.
    pub recipient: AccountId,
    /// Royalty share in basis points (denominator 10000).
    pub royalty_bps: u16,
}
