//! # openlot-engine
//!
//! Listing, auction, and offer engines behind the [`Marketplace`] facade.
//!
//! ## Architecture
//!
//! One [`Marketplace`] value owns all engine state: listing and offer
//! records, the escrow ledger, the custody tracker, the sale log, and the
//! event stream. External collaborators (asset registry, currency gateway,
//! clock, admin policy) are injected at construction.
//!
//! The facade is single-writer: every mutating operation takes `&mut self`,
//! runs under a non-reentrant guard, and either completes fully or leaves
//! no trace. Module split:
//!
//! - [`marketplace`]: the facade type, guards, and indices
//! - [`listing`]: create, buy-now (fixed price and Dutch), cancel
//! - [`auction`]: English-auction bidding and finalization
//! - [`offer`]: escrow-backed offers
//! - [`admin`]: fee, currency, and pause controls behind an [`AdminPolicy`]
//! - [`views`]: read-only queries, available while paused

pub mod admin;
pub mod auction;
pub mod listing;
pub mod marketplace;
pub mod offer;
pub mod views;

pub use admin::{AdminAction, AdminPolicy, SingleAdmin};
pub use marketplace::Marketplace;
