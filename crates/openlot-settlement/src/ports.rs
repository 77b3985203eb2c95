//! Ports onto the engine's external collaborators.
//!
//! The asset registry and currency gateway are the only places where
//! untrusted external calls happen, and they are reached exclusively
//! through these traits. Contract for implementors: a call that returns
//! `Err` must have had **no external effect** — the engine treats a failed
//! operation as fully reverted and restores its own state to match.
//!
//! Methods take `&self`; implementations use interior mutability where they
//! carry state. The engine's single-writer model (see `openlot-engine`)
//! serializes all calls.

use chrono::{DateTime, Utc};
use openlot_types::{AccountId, AssetRef, Result, RoyaltyPolicy};
use rust_decimal::Decimal;

/// External system of record for unique-asset ownership and per-asset
/// royalty declarations.
pub trait AssetRegistry {
    /// Current holder of the asset, if the asset exists.
    fn owner_of(&self, asset: &AssetRef) -> Option<AccountId>;

    /// Whether `holder` has authorized the engine to move `asset`.
    fn is_transfer_approved(&self, holder: AccountId, asset: &AssetRef) -> bool;

    /// Move the asset `from` → `to`.
    ///
    /// # Errors
    /// `TransferFailed` if the registry rejects the move; no ownership
    /// change may have occurred in that case.
    fn transfer(&self, asset: &AssetRef, from: AccountId, to: AccountId) -> Result<()>;

    /// The asset's declared royalty policy. `None` means zero royalty.
    fn royalty_policy(&self, asset: &AssetRef) -> Option<RoyaltyPolicy>;
}

/// Currency transfer capability (native or token-based).
pub trait CurrencyGateway {
    /// Pay `amount` out of engine custody to `to`.
    ///
    /// # Errors
    /// `TransferFailed`; no funds may have moved in that case.
    fn transfer(&self, currency: &str, to: AccountId, amount: Decimal) -> Result<()>;

    /// Pull `amount` from `from` into engine custody.
    ///
    /// # Errors
    /// `TransferFailed`; no funds may have moved in that case.
    fn pull(&self, currency: &str, from: AccountId, amount: Decimal) -> Result<()>;
}

/// Time source, abstracted so auction expiry is testable.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
