//! # openlot-types
//!
//! Shared types, errors, and configuration for the **OpenLot** marketplace
//! escrow and settlement engine.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`ListingId`], [`OfferId`], [`AccountId`], [`SaleId`]
//! - **Asset model**: [`AssetRef`], [`RoyaltyPolicy`], [`Currency`]
//! - **Listing model**: [`Listing`], [`ListingKind`], [`ListingStatus`]
//! - **Offer model**: [`Offer`]
//! - **Sale records**: [`SaleEvent`], [`SaleSource`]
//! - **Observer events**: [`MarketEvent`]
//! - **Configuration**: [`MarketplaceConfig`]
//! - **Errors**: [`OpenlotError`] with `OL_ERR_` prefix codes
//! - **Basis-point arithmetic**: [`bps::share`]
//! - **Constants**: fee caps, increments, duration bounds

pub mod asset;
pub mod bps;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod listing;
pub mod offer;
pub mod sale;

// Re-export all primary types at crate root for ergonomic imports:
//   use openlot_types::{Listing, Offer, SaleEvent, OpenlotError, ...};

pub use asset::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use listing::*;
pub use offer::*;
pub use sale::*;

// Constants are accessed via `openlot_types::constants::FOO`
// (not re-exported to avoid name collisions).
