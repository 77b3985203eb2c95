//! English auction bidding and finalization.
//!
//! Each bid is escrowed in full when placed; the outbid party is refunded in
//! the same operation. Exactly one bid per auction is escrowed at any time,
//! so cancellation and finalization each have at most one refund or debit
//! to deal with.

use openlot_settlement::{FundingSource, SettlementRequest};
use openlot_types::{
    AccountId, ListingId, ListingKind, ListingStatus, MarketEvent, OpenlotError, Result, SaleId,
    SaleSource,
};
use rust_decimal::Decimal;

use crate::marketplace::Marketplace;

impl Marketplace {
    /// Place a bid on an English auction. The full amount is pulled into
    /// escrow; the previous highest bid (if any) is refunded in full.
    ///
    /// # Errors
    /// - `ListingNotFound` / `ListingNotActive` / `WrongListingKind`
    /// - `AuctionEnded` once the end time has passed
    /// - `InsufficientBid` below the start price or the standing bid plus
    ///   the minimum increment
    /// - `TransferFailed` if the escrow pull fails; nothing changes
    pub fn place_bid(
        &mut self,
        caller: AccountId,
        listing_id: ListingId,
        amount: Decimal,
    ) -> Result<()> {
        self.market_op(|market| {
            let now = market.now();
            let listing = market
                .listings
                .get(&listing_id)
                .ok_or(OpenlotError::ListingNotFound(listing_id))?;
            if !listing.is_active() {
                return Err(OpenlotError::ListingNotActive(listing_id));
            }
            if listing.kind != ListingKind::Auction {
                return Err(OpenlotError::WrongListingKind(listing_id));
            }
            if listing.has_ended(now) {
                return Err(OpenlotError::AuctionEnded(listing_id));
            }
            let minimum = listing.minimum_bid();
            if amount < minimum {
                return Err(OpenlotError::InsufficientBid {
                    offered: amount,
                    minimum,
                });
            }
            let currency = listing.currency.clone();
            let previous = listing.highest_bidder.map(|b| (b, listing.highest_bid));

            // Effects: escrow and the listing record reach their post-bid
            // state before any external call.
            if let Some((prev_bidder, prev_amount)) = previous {
                market.ledger.debit(prev_bidder, &currency, prev_amount)?;
            }
            market.ledger.credit(caller, &currency, amount);
            {
                let listing = market
                    .listings
                    .get_mut(&listing_id)
                    .ok_or(OpenlotError::ListingNotFound(listing_id))?;
                listing.highest_bidder = Some(caller);
                listing.highest_bid = amount;
            }

            // Interactions: pull the new bid, then refund the outbid party.
            let external = market
                .gateway
                .pull(&currency, caller, amount)
                .and_then(|()| match previous {
                    Some((prev_bidder, prev_amount)) => {
                        market.gateway.transfer(&currency, prev_bidder, prev_amount)
                    }
                    None => Ok(()),
                });
            if let Err(err) = external {
                market
                    .ledger
                    .debit(caller, &currency, amount)
                    .expect("bid credit applied above must be revocable");
                if let Some((prev_bidder, prev_amount)) = previous {
                    market.ledger.credit(prev_bidder, &currency, prev_amount);
                }
                if let Some(listing) = market.listings.get_mut(&listing_id) {
                    listing.highest_bidder = previous.map(|(b, _)| b);
                    listing.highest_bid = previous.map_or(Decimal::ZERO, |(_, a)| a);
                }
                return Err(err);
            }

            market.custody.record_inflow(&currency, amount);
            if let Some((_, prev_amount)) = previous {
                market.custody.record_outflow(&currency, prev_amount);
            }
            market.record_event(MarketEvent::BidPlaced {
                listing_id,
                bidder: caller,
                amount,
                previous_bidder: previous.map(|(b, _)| b),
                refunded: previous.map_or(Decimal::ZERO, |(_, a)| a),
            });
            tracing::info!(listing = %listing_id, %amount, "bid placed");
            Ok(())
        })
    }

    /// Finalize an ended auction. Anyone may call once the end time has
    /// passed. An English auction with a standing bid settles to the
    /// highest bidder from escrow; without one it expires. A Dutch auction
    /// that found no taker expires.
    ///
    /// Returns the sale id when a sale occurred, `None` on expiry.
    ///
    /// # Errors
    /// - `ListingNotFound` / `ListingNotActive` / `WrongListingKind`
    /// - `AuctionNotEnded` before the end time
    /// - `TransferFailed` if settlement fails; the auction stays Active
    ///   and can be finalized again
    pub fn finalize_auction(
        &mut self,
        listing_id: ListingId,
    ) -> Result<Option<SaleId>> {
        self.market_op(|market| {
            let now = market.now();
            let listing = market
                .listings
                .get(&listing_id)
                .ok_or(OpenlotError::ListingNotFound(listing_id))?;
            if !listing.is_active() {
                return Err(OpenlotError::ListingNotActive(listing_id));
            }
            if listing.kind == ListingKind::FixedPrice {
                return Err(OpenlotError::WrongListingKind(listing_id));
            }
            if !listing.has_ended(now) {
                return Err(OpenlotError::AuctionNotEnded(listing_id));
            }

            let winner = match listing.kind {
                ListingKind::Auction => listing.highest_bidder.map(|b| (b, listing.highest_bid)),
                // A Dutch auction past its end found no taker.
                ListingKind::DutchAuction | ListingKind::FixedPrice => None,
            };
            let asset = listing.asset.clone();

            let Some((winner, winning_bid)) = winner else {
                market
                    .listings
                    .get_mut(&listing_id)
                    .ok_or(OpenlotError::ListingNotFound(listing_id))?
                    .status = ListingStatus::Expired;
                market.retire_listing(listing_id);
                market.record_event(MarketEvent::ListingExpired { listing_id, asset });
                tracing::info!(listing = %listing_id, "auction expired without winner");
                return Ok(None);
            };

            let request = SettlementRequest {
                source: SaleSource::Listing(listing_id),
                asset,
                seller: listing.seller,
                buyer: winner,
                price: winning_bid,
                currency: listing.currency.clone(),
                funding: FundingSource::Escrow,
            };

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
            Ok(Some(sale_id))
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use openlot_settlement::AssetRegistry;
    use openlot_types::AssetRef;

    use super::*;
    use crate::marketplace::tests::{Fixture, funded_account, harness};

    fn native(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    fn auction(market: &mut Marketplace, fx: &Fixture, start_price: i64) -> ListingId {
        let seller = AccountId::new();
        let asset = AssetRef::new("col", 1);
        fx.registry.set_owner(&asset, seller);
        market
            .create_listing(
                seller,
                asset,
                native(start_price),
                "NATIVE".into(),
                ListingKind::Auction,
                Some(3600),
            )
            .unwrap()
    }

    #[test]
    fn first_bid_must_meet_start_price() {
        let (mut market, fx) = harness();
        let id = auction(&mut market, &fx, 100);
        let bidder = funded_account(&fx, 500);

        let err = market.place_bid(bidder, id, native(99)).unwrap_err();
        assert!(matches!(
            err,
            OpenlotError::InsufficientBid { minimum, .. } if minimum == native(100)
        ));

        market.place_bid(bidder, id, native(100)).unwrap();
        assert_eq!(market.escrow_balance_of(bidder, "NATIVE"), native(100));
        assert_eq!(fx.bank.wallet_of(bidder, "NATIVE"), native(400));
    }

    #[test]
    fn outbid_refunds_previous_bidder_in_full() {
        let (mut market, fx) = harness();
        let id = auction(&mut market, &fx, 100);
        let alice = funded_account(&fx, 500);
        let bob = funded_account(&fx, 500);

        market.place_bid(alice, id, native(100)).unwrap();
        // Minimum next bid: 100 + 5% increment of the 100 start price.
        let err = market.place_bid(bob, id, native(104)).unwrap_err();
        assert!(matches!(
            err,
            OpenlotError::InsufficientBid { minimum, .. } if minimum == native(105)
        ));

        market.place_bid(bob, id, native(105)).unwrap();
        assert_eq!(fx.bank.wallet_of(alice, "NATIVE"), native(500));
        assert_eq!(market.escrow_balance_of(alice, "NATIVE"), Decimal::ZERO);
        assert_eq!(market.escrow_balance_of(bob, "NATIVE"), native(105));
        market.verify_conservation().unwrap();

        assert!(matches!(
            market.events().last().unwrap(),
            MarketEvent::BidPlaced {
                previous_bidder: Some(prev),
                refunded,
                ..
            } if *prev == alice && *refunded == native(100)
        ));
    }

    #[test]
    fn self_outbid_allowed_and_refunded() {
        let (mut market, fx) = harness();
        let id = auction(&mut market, &fx, 100);
        let alice = funded_account(&fx, 500);

        market.place_bid(alice, id, native(100)).unwrap();
        market.place_bid(alice, id, native(105)).unwrap();
        // Only the latest bid stays escrowed.
        assert_eq!(market.escrow_balance_of(alice, "NATIVE"), native(105));
        assert_eq!(fx.bank.wallet_of(alice, "NATIVE"), native(395));
    }

    #[test]
    fn failed_pull_rolls_the_bid_back() {
        let (mut market, fx) = harness();
        let id = auction(&mut market, &fx, 100);
        let alice = funded_account(&fx, 500);
        let broke = AccountId::new();

        market.place_bid(alice, id, native(100)).unwrap();
        let err = market.place_bid(broke, id, native(200)).unwrap_err();
        assert!(matches!(err, OpenlotError::TransferFailed { .. }));

        // Alice is still the highest bidder with her escrow intact.
        let listing = market.get_listing(id).unwrap();
        assert_eq!(listing.highest_bidder, Some(alice));
        assert_eq!(listing.highest_bid, native(100));
        assert_eq!(market.escrow_balance_of(alice, "NATIVE"), native(100));
        assert_eq!(market.escrow_balance_of(broke, "NATIVE"), Decimal::ZERO);
        market.verify_conservation().unwrap();
    }

    #[test]
    fn bid_after_end_rejected() {
        let (mut market, fx) = harness();
        let id = auction(&mut market, &fx, 100);
        let bidder = funded_account(&fx, 500);
        fx.clock.advance(TimeDelta::seconds(3600));
        let err = market.place_bid(bidder, id, native(100)).unwrap_err();
        assert!(matches!(err, OpenlotError::AuctionEnded(_)));
    }

    #[test]
    fn bid_on_fixed_price_rejected() {
        let (mut market, fx) = harness();
        let seller = AccountId::new();
        let asset = AssetRef::new("col", 2);
        fx.registry.set_owner(&asset, seller);
        let id = market
            .create_listing(
                seller,
                asset,
                native(100),
                "NATIVE".into(),
                ListingKind::FixedPrice,
                None,
            )
            .unwrap();
        let bidder = funded_account(&fx, 500);
        let err = market.place_bid(bidder, id, native(100)).unwrap_err();
        assert!(matches!(err, OpenlotError::WrongListingKind(_)));
    }

    #[test]
    fn finalize_settles_to_highest_bidder() {
        let (mut market, fx) = harness();
        let id = auction(&mut market, &fx, 100);
        let seller = market.get_listing(id).unwrap().seller;
        let asset = market.get_listing(id).unwrap().asset.clone();
        let alice = funded_account(&fx, 500);
        let bob = funded_account(&fx, 500);

        market.place_bid(alice, id, native(100)).unwrap();
        market.place_bid(bob, id, native(200)).unwrap();

        let err = market.finalize_auction(id).unwrap_err();
        assert!(matches!(err, OpenlotError::AuctionNotEnded(_)));

        fx.clock.advance(TimeDelta::seconds(3600));
        let sale_id = market.finalize_auction(id).unwrap().unwrap();

        assert_eq!(market.get_listing(id).unwrap().status, ListingStatus::Sold);
        assert_eq!(fx.registry.owner_of(&asset), Some(bob));
        assert_eq!(market.escrow_balance_of(bob, "NATIVE"), Decimal::ZERO);
        // 2.5% of 200 = 5 fee; seller gets 195.
        assert_eq!(fx.bank.wallet_of(fx.treasury, "NATIVE"), native(5));
        assert_eq!(fx.bank.wallet_of(seller, "NATIVE"), native(195));
        assert_eq!(market.sale(sale_id).unwrap().price, native(200));
        market.verify_conservation().unwrap();
    }

    #[test]
    fn finalize_without_bids_expires() {
        let (mut market, fx) = harness();
        let id = auction(&mut market, &fx, 100);
        fx.clock.advance(TimeDelta::seconds(3600));

        assert_eq!(market.finalize_auction(id).unwrap(), None);
        assert_eq!(
            market.get_listing(id).unwrap().status,
            ListingStatus::Expired
        );
        assert!(!market.is_listing_active(id));
        assert_eq!(market.events().last().unwrap().label(), "LISTING_EXPIRED");
    }

    #[test]
    fn finalize_untaken_dutch_expires() {
        let (mut market, fx) = harness();
        let seller = AccountId::new();
        let asset = AssetRef::new("col", 3);
        fx.registry.set_owner(&asset, seller);
        let id = market
            .create_listing(
                seller,
                asset,
                native(1000),
                "NATIVE".into(),
                ListingKind::DutchAuction,
                Some(3600),
            )
            .unwrap();
        fx.clock.advance(TimeDelta::seconds(3600));
        assert_eq!(market.finalize_auction(id).unwrap(), None);
        assert_eq!(
            market.get_listing(id).unwrap().status,
            ListingStatus::Expired
        );
    }

    #[test]
    fn failed_settlement_keeps_auction_finalizable() {
        let (mut market, fx) = harness();
        let id = auction(&mut market, &fx, 100);
        let alice = funded_account(&fx, 500);
        market.place_bid(alice, id, native(100)).unwrap();
        fx.clock.advance(TimeDelta::seconds(3600));

        fx.registry.set_fail_transfers(true);
        let err = market.finalize_auction(id).unwrap_err();
        assert!(matches!(err, OpenlotError::TransferFailed { .. }));
        assert!(market.is_listing_active(id));
        assert_eq!(market.escrow_balance_of(alice, "NATIVE"), native(100));

        fx.registry.set_fail_transfers(false);
        assert!(market.finalize_auction(id).unwrap().is_some());
    }

    #[test]
    fn finalize_twice_rejected() {
        let (mut market, fx) = harness();
        let id = auction(&mut market, &fx, 100);
        fx.clock.advance(TimeDelta::seconds(3600));
        market.finalize_auction(id).unwrap();
        let err = market.finalize_auction(id).unwrap_err();
        assert!(matches!(err, OpenlotError::ListingNotActive(_)));
    }
}
