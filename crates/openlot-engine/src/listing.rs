//! Listing lifecycle: creation, immediate purchase, cancellation.
//!
//! Purchases settle through the coordinator with funds pulled from the buyer
//! at settlement time. Internal record state is committed before the external
//! calls; a failed settlement restores the record exactly as it was.

use openlot_settlement::{FundingSource, SettlementRequest};
use openlot_types::{
    AccountId, AssetRef, Currency, Listing, ListingId, ListingKind, ListingStatus, MarketEvent,
    OpenlotError, Result, SaleId, SaleSource, bps,
};
use rust_decimal::Decimal;

use crate::marketplace::Marketplace;

impl Marketplace {
    /// List an asset for sale.
    ///
    /// `duration_secs` must be `None` for fixed-price listings and within
    /// the configured bounds for English and Dutch auctions.
    ///
    /// # Errors
    /// - `InvalidPaymentToken` for an unsupported currency
    /// - `InvalidPrice` unless the price is strictly positive
    /// - `InvalidDuration` when the duration is missing or out of bounds
    /// - `UnauthorizedSeller` unless the caller owns the asset and has
    ///   approved the engine to transfer it
    pub fn create_listing(
        &mut self,
        caller: AccountId,
        asset: AssetRef,
        price: Decimal,
        currency: Currency,
        kind: ListingKind,
        duration_secs: Option<u64>,
    ) -> Result<ListingId> {
        self.market_op(|market| {
            if !market.config.supports_currency(&currency) {
                return Err(OpenlotError::InvalidPaymentToken(currency));
            }
            if price <= Decimal::ZERO {
                return Err(OpenlotError::InvalidPrice(price));
            }
            if market.registry.owner_of(&asset) != Some(caller)
                || !market.registry.is_transfer_approved(caller, &asset)
            {
                return Err(OpenlotError::UnauthorizedSeller);
            }

            let now = market.now();
            let min_secs = market.config.min_auction_duration_secs;
            let max_secs = market.config.max_auction_duration_secs;
            let ends_at = match kind {
                ListingKind::FixedPrice => {
                    if let Some(secs) = duration_secs {
                        return Err(OpenlotError::InvalidDuration {
                            secs,
                            min_secs,
                            max_secs,
                        });
                    }
                    None
                }
                ListingKind::Auction | ListingKind::DutchAuction => {
                    let secs = duration_secs.unwrap_or(0);
                    if secs < min_secs || secs > max_secs {
                        return Err(OpenlotError::InvalidDuration {
                            secs,
                            min_secs,
                            max_secs,
                        });
                    }
                    Some(now + chrono::TimeDelta::seconds(i64::try_from(secs).unwrap_or(i64::MAX)))
                }
            };

            let id = market.allocate_listing_id();
            let listing = Listing {
                id,
                asset: asset.clone(),
                seller: caller,
                price,
                currency: currency.clone(),
                kind,
                status: ListingStatus::Active,
                created_at: now,
                ends_at,
                min_bid_increment: bps::share(price, market.config.min_bid_increment_bps),
                highest_bidder: None,
                highest_bid: Decimal::ZERO,
            };
            market.record_event(MarketEvent::ListingCreated {
                listing_id: id,
                asset,
                seller: caller,
                price,
                currency,
                kind,
                ends_at,
            });
            market.insert_listing(listing);
            tracing::info!(listing = %id, %kind, "listing created");
            Ok(id)
        })
    }

    /// Buy a fixed-price listing at its price, or take a Dutch auction at
    /// its current ask. Funds are pulled from the buyer at settlement time.
    ///
    /// # Errors
    /// - `ListingNotFound` / `ListingNotActive` for missing or closed listings
    /// - `WrongListingKind` on an English auction
    /// - `AuctionEnded` on a Dutch auction past its end time
    /// - `TransferFailed` if settlement fails; the listing stays Active
    pub fn buy_now(&mut self, caller: AccountId, listing_id: ListingId) -> Result<SaleId> {
        self.market_op(|market| {
            let now = market.now();
            let dutch_floor_bps = market.config.dutch_floor_bps;
            let listing = market
                .listings
                .get(&listing_id)
                .ok_or(OpenlotError::ListingNotFound(listing_id))?;
            if !listing.is_active() {
                return Err(OpenlotError::ListingNotActive(listing_id));
            }
            if listing.kind == ListingKind::Auction {
                return Err(OpenlotError::WrongListingKind(listing_id));
            }
            if listing.kind == ListingKind::DutchAuction && listing.has_ended(now) {
                return Err(OpenlotError::AuctionEnded(listing_id));
            }

            let request = SettlementRequest {
                source: SaleSource::Listing(listing_id),
                asset: listing.asset.clone(),
                seller: listing.seller,
                buyer: caller,
                price: listing.current_ask(now, dutch_floor_bps),
                currency: listing.currency.clone(),
                funding: FundingSource::Direct,
            };

            // Effects: record reaches its terminal state before externals.
            market
                .listings
                .get_mut(&listing_id)
                .ok_or(OpenlotError::ListingNotFound(listing_id))?
                .status = ListingStatus::Sold;
            market.retire_listing(listing_id);

            let fee_bps = market.config.platform_fee_bps;
            let sale = match market.coordinator.settle(
                &request,
                fee_bps,
                &mut market.ledger,
                &mut market.custody,
                now,
            ) {
                Ok(sale) => sale,
                Err(err) => {
                    if let Some(listing) = market.listings.get_mut(&listing_id) {
                        listing.status = ListingStatus::Active;
                    }
                    market.unretire_listing(listing_id);
                    return Err(err);
                }
            };

            let sale_id = sale.sale_id;
            market.record_event(MarketEvent::ListingSold {
                listing_id,
                asset: sale.asset.clone(),
                seller: sale.seller,
                buyer: sale.buyer,
                price: sale.price,
                platform_fee: sale.platform_fee,
                royalty_amount: sale.royalty_amount,
                seller_proceeds: sale.seller_proceeds,
                currency: sale.currency.clone(),
                sale_id,
            });
            market.sale_log.record(sale);
            Ok(sale_id)
        })
    }

    /// Cancel an active listing. Only the seller may cancel. A standing
    /// English-auction bid is refunded in full from escrow.
    ///
    /// # Errors
    /// - `ListingNotFound` / `ListingNotActive`
    /// - `UnauthorizedSeller` unless the caller is the listing's seller
    /// - `TransferFailed` if the bid refund fails; nothing changes
    pub fn cancel_listing(&mut self, caller: AccountId, listing_id: ListingId) -> Result<()> {
        self.market_op(|market| {
            let listing = market
                .listings
                .get(&listing_id)
                .ok_or(OpenlotError::ListingNotFound(listing_id))?;
            if !listing.is_active() {
                return Err(OpenlotError::ListingNotActive(listing_id));
            }
            if listing.seller != caller {
                return Err(OpenlotError::UnauthorizedSeller);
            }
            let asset = listing.asset.clone();
            let currency = listing.currency.clone();
            let standing = listing.highest_bidder.map(|b| (b, listing.highest_bid));

            // Effects first, refund payout last.
            if let Some((bidder, amount)) = standing {
                market.ledger.debit(bidder, &currency, amount)?;
            }
            market
                .listings
                .get_mut(&listing_id)
                .ok_or(OpenlotError::ListingNotFound(listing_id))?
                .status = ListingStatus::Cancelled;
            market.retire_listing(listing_id);

            if let Some((bidder, amount)) = standing {
                if let Err(err) = market.gateway.transfer(&currency, bidder, amount) {
                    market.ledger.credit(bidder, &currency, amount);
                    if let Some(listing) = market.listings.get_mut(&listing_id) {
                        listing.status = ListingStatus::Active;
                    }
                    market.unretire_listing(listing_id);
                    return Err(err);
                }
                market.custody.record_outflow(&currency, amount);
            }

            market.record_event(MarketEvent::ListingCancelled {
                listing_id,
                asset,
                seller: caller,
                refunded_bid: standing.map(|(_, amount)| amount),
            });
            tracing::info!(listing = %listing_id, "listing cancelled");
            Ok(())
        })
    }
}
