//! Error types for the OpenLot marketplace engine.
//!
//! All errors use the `OL_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Listing errors
//! - 2xx: Auction errors
//! - 3xx: Offer errors
//! - 4xx: Escrow errors
//! - 5xx: Settlement errors
//! - 6xx: System / admin errors
//!
//! Every error is surfaced synchronously to the caller. Nothing is retried
//! inside the engine; retries belong to the orchestrating layer.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{ListingId, OfferId};

/// Central error enum for all OpenLot operations.
#[derive(Debug, Error)]
pub enum OpenlotError {
    // =================================================================
    // Listing Errors (1xx)
    // =================================================================
    /// The requested listing does not exist.
    #[error("OL_ERR_100: Listing not found: {0}")]
    ListingNotFound(ListingId),

    /// The listing exists but is no longer Active (Sold, Cancelled or Expired).
    #[error("OL_ERR_101: Listing {0} is not active")]
    ListingNotActive(ListingId),

    /// The operation does not apply to this listing kind
    /// (e.g. `buy_now` on an English auction).
    #[error("OL_ERR_102: Wrong listing kind for {0}")]
    WrongListingKind(ListingId),

    /// Listing price must be strictly positive.
    #[error("OL_ERR_103: Invalid price: {0}")]
    InvalidPrice(Decimal),

    /// Auction duration falls outside the configured bounds.
    #[error("OL_ERR_104: Invalid auction duration: {secs}s (allowed {min_secs}s..={max_secs}s)")]
    InvalidDuration {
        secs: u64,
        min_secs: u64,
        max_secs: u64,
    },

    /// Caller does not own the asset or has not approved the engine to move it.
    #[error("OL_ERR_105: Caller is not the asset's owner or transfer is not approved")]
    UnauthorizedSeller,

    // =================================================================
    // Auction Errors (2xx)
    // =================================================================
    /// Bids are closed: the auction end time has passed.
    #[error("OL_ERR_200: Auction has ended for {0}")]
    AuctionEnded(ListingId),

    /// Finalization attempted before the auction end time.
    #[error("OL_ERR_201: Auction has not ended yet for {0}")]
    AuctionNotEnded(ListingId),

    /// Bid below the minimum acceptable amount.
    #[error("OL_ERR_202: Insufficient bid: offered {offered}, minimum {minimum}")]
    InsufficientBid { offered: Decimal, minimum: Decimal },

    // =================================================================
    // Offer Errors (3xx)
    // =================================================================
    /// The requested offer does not exist.
    #[error("OL_ERR_300: Offer not found: {0}")]
    OfferNotFound(OfferId),

    /// The offer has already been accepted or cancelled.
    #[error("OL_ERR_301: Offer {0} is not active")]
    OfferNotActive(OfferId),

    /// The offer's expiration time has passed; it can only be cancelled.
    #[error("OL_ERR_302: Offer {0} has expired")]
    OfferExpired(OfferId),

    /// Offer expiration must lie in the future.
    #[error("OL_ERR_303: Offer expiration is not in the future")]
    InvalidExpiration,

    /// Only the offerer may cancel their offer.
    #[error("OL_ERR_304: Caller is not the offerer")]
    UnauthorizedOfferer,

    // =================================================================
    // Escrow Errors (4xx)
    // =================================================================
    /// Not enough escrowed funds to perform the operation.
    #[error("OL_ERR_400: Insufficient escrow: need {needed}, have {available}")]
    InsufficientEscrow { needed: Decimal, available: Decimal },

    /// Escrowed balances exceed the funds the engine actually holds.
    #[error("OL_ERR_401: Escrow conservation violated: {reason}")]
    EscrowInvariantViolation { reason: String },

    // =================================================================
    // Settlement Errors (5xx)
    // =================================================================
    /// An external asset or currency transfer failed. The whole operation
    /// is rolled back; no partial payout or escrow mutation survives.
    #[error("OL_ERR_500: External transfer failed: {reason}")]
    TransferFailed { reason: String },

    // =================================================================
    // System / Admin Errors (6xx)
    // =================================================================
    /// All state-mutating operations are rejected while paused.
    #[error("OL_ERR_600: System is paused")]
    SystemPaused,

    /// A nested (reentrant) call hit the engine while an operation was
    /// already in progress.
    #[error("OL_ERR_601: Operation already in progress (reentrant call)")]
    OperationInProgress,

    /// The currency is not in the supported set.
    #[error("OL_ERR_602: Unsupported payment token: {0}")]
    InvalidPaymentToken(String),

    /// Platform fee above the hard cap (1000 bps).
    #[error("OL_ERR_603: Platform fee {bps} bps exceeds cap of {cap_bps} bps")]
    FeeTooHigh { bps: u16, cap_bps: u16 },

    /// The caller is not authorized for this administrative action.
    #[error("OL_ERR_604: Caller is not authorized for this action")]
    Unauthorized,
}

/// Convenience result type for all OpenLot operations.
pub type Result<T> = std::result::Result<T, OpenlotError>;
