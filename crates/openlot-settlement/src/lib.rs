//! # openlot-settlement
//!
//! Settlement coordination for the OpenLot marketplace engine.
//!
//! ## Architecture
//!
//! The [`SettlementCoordinator`] is the single point where external,
//! potentially untrusted calls occur. For each sale it:
//! 1. Computes the fee breakdown (platform fee, creator royalty, seller
//!    proceeds) via [`fees::split`]
//! 2. Commits internal escrow effects to their post-settlement values
//! 3. Executes the external asset transfer and the fund payouts
//! 4. Records an append-only [`SaleEvent`] in the [`SaleLog`]
//!
//! Any external failure aborts the whole settlement with `TransferFailed`
//! and internal effects are restored — no partial payout survives.
//!
//! [`SaleEvent`]: openlot_types::SaleEvent

pub mod coordinator;
pub mod fees;
pub mod ports;
pub mod sale_log;
#[cfg(any(test, feature = "test-helpers"))]
pub mod testkit;

pub use coordinator::{FundingSource, SettlementCoordinator, SettlementRequest};
pub use fees::FeeBreakdown;
pub use ports::{AssetRegistry, Clock, CurrencyGateway, SystemClock};
pub use sale_log::SaleLog;
