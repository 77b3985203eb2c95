//! # openlot-ledger
//!
//! Escrow accounting for the OpenLot marketplace engine.
//!
//! - [`EscrowLedger`]: per-(holder, currency) balances the engine holds on
//!   users' behalf until settlement or refund
//! - [`CustodyTracker`]: conservation check that escrow accounting never
//!   exceeds the funds actually in engine custody

pub mod conservation;
pub mod escrow;

pub use conservation::CustodyTracker;
pub use escrow::EscrowLedger;
