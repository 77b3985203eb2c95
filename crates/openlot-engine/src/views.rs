//! Read-only views. All of these stay available while the engine is paused.

use openlot_types::{
    AccountId, AssetRef, Currency, Listing, ListingId, MarketEvent, Offer, OfferId, Result,
    SaleEvent, SaleId,
};
use rust_decimal::Decimal;

use crate::marketplace::Marketplace;

impl Marketplace {
    #[must_use]
    pub fn get_listing(&self, id: ListingId) -> Option<&Listing> {
        self.listings.get(&id)
    }

    #[must_use]
    pub fn get_offer(&self, id: OfferId) -> Option<&Offer> {
        self.offers.get(&id)
    }

    /// Whether a listing exists and is still Active.
    #[must_use]
    pub fn is_listing_active(&self, id: ListingId) -> bool {
        self.active_listings.contains(&id)
    }

    /// A page of active listings in creation (id) order.
    #[must_use]
    pub fn get_active_listings(&self, offset: usize, limit: usize) -> Vec<&Listing> {
        self.active_listings
            .iter()
            .skip(offset)
            .take(limit)
            .filter_map(|id| self.listings.get(id))
            .collect()
    }

    /// Every listing ever created for an asset, in creation order.
    #[must_use]
    pub fn listings_by_asset(&self, asset: &AssetRef) -> Vec<&Listing> {
        self.listings_by_asset
            .get(asset)
            .map(|ids| ids.iter().filter_map(|id| self.listings.get(id)).collect())
            .unwrap_or_default()
    }

    /// Every listing ever created by a seller, in creation order.
    #[must_use]
    pub fn listings_by_seller(&self, seller: AccountId) -> Vec<&Listing> {
        self.listings_by_seller
            .get(&seller)
            .map(|ids| ids.iter().filter_map(|id| self.listings.get(id)).collect())
            .unwrap_or_default()
    }

    /// Current asking price of a listing: the fixed price, the Dutch ask at
    /// the engine clock's now, or the start price of an English auction.
    #[must_use]
    pub fn current_ask(&self, id: ListingId) -> Option<Decimal> {
        self.listings
            .get(&id)
            .map(|l| l.current_ask(self.now(), self.config.dutch_floor_bps))
    }

    /// Funds escrowed for a holder in a currency.
    #[must_use]
    pub fn escrow_balance_of(&self, holder: AccountId, currency: &str) -> Decimal {
        self.ledger.balance_of(holder, currency)
    }

    /// All completed sales in settlement order.
    pub fn sales(&self) -> impl Iterator<Item = &SaleEvent> {
        self.sale_log.iter()
    }

    #[must_use]
    pub fn sale(&self, id: SaleId) -> Option<&SaleEvent> {
        self.sale_log.get(id)
    }

    /// Sale history of one asset, in settlement order.
    #[must_use]
    pub fn sales_of_asset(&self, asset: &AssetRef) -> Vec<&SaleEvent> {
        self.sale_log.by_asset(asset)
    }

    /// Events recorded since construction, in emission order.
    #[must_use]
    pub fn events(&self) -> &[MarketEvent] {
        &self.events
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[must_use]
    pub fn platform_fee_bps(&self) -> u16 {
        self.config.platform_fee_bps
    }

    #[must_use]
    pub fn treasury(&self) -> AccountId {
        self.config.treasury
    }

    #[must_use]
    pub fn supports_currency(&self, currency: &str) -> bool {
        self.config.supports_currency(currency)
    }

    #[must_use]
    pub fn supported_currencies(&self) -> &[Currency] {
        &self.config.supported_currencies
    }

    /// Check escrow conservation for every currency that has seen custody
    /// movement: summed escrow balances never exceed funds actually held.
    ///
    /// # Errors
    /// `EscrowInvariantViolation` naming the offending currency.
    pub fn verify_conservation(&self) -> Result<()> {
        for currency in self.custody.tracked_currencies() {
            self.custody
                .verify(&currency, self.ledger.total_escrowed(&currency))?;
        }
        Ok(())
    }
}
