//! Escrow-backed offers on assets, independent of any listing.
//!
//! The full offer amount is pulled into escrow when the offer is made and
//! stays there until acceptance, cancellation, or reclaim after expiry.
//! Expired offers are never purged by the engine; the offerer cancels to
//! get the escrow back.

use chrono::{DateTime, Utc};
use openlot_settlement::{FundingSource, SettlementRequest};
use openlot_types::{
    AccountId, AssetRef, Currency, MarketEvent, Offer, OfferId, OpenlotError, Result, SaleId,
    SaleSource,
};
use rust_decimal::Decimal;

use crate::marketplace::Marketplace;

impl Marketplace {
    /// Make an offer on an asset. The amount is escrowed immediately.
    ///
    /// # Errors
    /// - `InvalidPaymentToken` for an unsupported currency
    /// - `InvalidPrice` unless the amount is strictly positive
    /// - `InvalidExpiration` unless `expires_at` lies in the future
    /// - `TransferFailed` if the escrow pull fails; no offer is created
    pub fn make_offer(
        &mut self,
        caller: AccountId,
        asset: AssetRef,
        amount: Decimal,
        currency: Currency,
        expires_at: DateTime<Utc>,
    ) -> Result<OfferId> {
        self.market_op(|market| {
            if !market.config.supports_currency(&currency) {
                return Err(OpenlotError::InvalidPaymentToken(currency));
            }
            if amount <= Decimal::ZERO {
                return Err(OpenlotError::InvalidPrice(amount));
            }
            if expires_at <= market.now() {
                return Err(OpenlotError::InvalidExpiration);
            }

            let id = market.allocate_offer_id();
            let offer = Offer {
                id,
                asset: asset.clone(),
                offerer: caller,
                amount,
                currency: currency.clone(),
                expires_at,
                is_active: true,
            };

            // Effects before the external pull.
            market.ledger.credit(caller, &currency, amount);
            market.offers.insert(id, offer);

            if let Err(err) = market.gateway.pull(&currency, caller, amount) {
                market.offers.remove(&id);
                market
                    .ledger
                    .debit(caller, &currency, amount)
                    .expect("offer credit applied above must be revocable");
                return Err(err);
            }
            market.custody.record_inflow(&currency, amount);

            market.record_event(MarketEvent::OfferMade {
                offer_id: id,
                asset,
                offerer: caller,
                amount,
                currency,
                expires_at,
            });
            tracing::info!(offer = %id, %amount, "offer made");
            Ok(id)
        })
    }

    /// Accept an offer on an asset the caller owns. Settles from the
    /// offerer's escrow at the offered amount.
    ///
    /// # Errors
    /// - `OfferNotFound` / `OfferNotActive` / `OfferExpired`
    /// - `UnauthorizedSeller` unless the caller owns the asset and has
    ///   approved the engine to transfer it
    /// - `TransferFailed` if settlement fails; the offer stays active
    pub fn accept_offer(&mut self, caller: AccountId, offer_id: OfferId) -> Result<SaleId> {
        self.market_op(|market| {
            let now = market.now();
            let offer = market
                .offers
                .get(&offer_id)
                .ok_or(OpenlotError::OfferNotFound(offer_id))?;
            if !offer.is_active {
                return Err(OpenlotError::OfferNotActive(offer_id));
            }
            if offer.is_expired(now) {
                return Err(OpenlotError::OfferExpired(offer_id));
            }
            if market.registry.owner_of(&offer.asset) != Some(caller)
                || !market.registry.is_transfer_approved(caller, &offer.asset)
            {
                return Err(OpenlotError::UnauthorizedSeller);
            }

            let request = SettlementRequest {
                source: SaleSource::Offer(offer_id),
                asset: offer.asset.clone(),
                seller: caller,
                buyer: offer.offerer,
                price: offer.amount,
                currency: offer.currency.clone(),
                funding: FundingSource::Escrow,
            };

            market
                .offers
                .get_mut(&offer_id)
                .ok_or(OpenlotError::OfferNotFound(offer_id))?
                .is_active = false;

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
                    if let Some(offer) = market.offers.get_mut(&offer_id) {
                        offer.is_active = true;
                    }
                    return Err(err);
                }
            };

            let sale_id = sale.sale_id;
            market.record_event(MarketEvent::OfferAccepted {
                offer_id,
                asset: sale.asset.clone(),
                seller: caller,
                offerer: sale.buyer,
                amount: sale.price,
                sale_id,
            });
            market.sale_log.record(sale);
            Ok(sale_id)
        })
    }

    /// Cancel an offer and reclaim its escrow. Works on expired offers too;
    /// it is the only way to get expired escrow back.
    ///
    /// # Errors
    /// - `OfferNotFound` / `OfferNotActive`
    /// - `UnauthorizedOfferer` unless the caller made the offer
    /// - `TransferFailed` if the refund fails; the offer stays active
    pub fn cancel_offer(&mut self, caller: AccountId, offer_id: OfferId) -> Result<()> {
        self.market_op(|market| {
            let offer = market
                .offers
                .get(&offer_id)
                .ok_or(OpenlotError::OfferNotFound(offer_id))?;
            if !offer.is_active {
                return Err(OpenlotError::OfferNotActive(offer_id));
            }
            if offer.offerer != caller {
                return Err(OpenlotError::UnauthorizedOfferer);
            }
            let currency = offer.currency.clone();
            let amount = offer.amount;

            market.ledger.debit(caller, &currency, amount)?;
            market
                .offers
                .get_mut(&offer_id)
                .ok_or(OpenlotError::OfferNotFound(offer_id))?
                .is_active = false;

            if let Err(err) = market.gateway.transfer(&currency, caller, amount) {
                market.ledger.credit(caller, &currency, amount);
                if let Some(offer) = market.offers.get_mut(&offer_id) {
                    offer.is_active = true;
                }
                return Err(err);
            }
            market.custody.record_outflow(&currency, amount);

            market.record_event(MarketEvent::OfferCancelled {
                offer_id,
                offerer: caller,
                refunded: amount,
            });
            tracing::info!(offer = %offer_id, "offer cancelled");
            Ok(())
        })
    }
}
