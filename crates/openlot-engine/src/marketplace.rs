//! The marketplace facade: all engine state behind one single-writer type.
//!
//! Every public operation takes `&mut self` and runs to completion without
//! interleaving — the host environment serializes state-mutating calls. The
//! one remaining hazard is reentrancy through an external transfer call, so
//! every mutating entry point runs inside a non-reentrant guard: a `busy`
//! flag set on entry and cleared on exit, failing nested calls fast with
//! `OperationInProgress`. Internal state always reaches its post-operation
//! value before an external call is issued (checks-effects-interactions),
//! and failed operations restore every internal write before returning.

use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use chrono::{DateTime, Utc};
use openlot_ledger::{CustodyTracker, EscrowLedger};
use openlot_settlement::{
    AssetRegistry, Clock, CurrencyGateway, SaleLog, SettlementCoordinator,
};
use openlot_types::{
    AccountId, AssetRef, Listing, ListingId, MarketEvent, MarketplaceConfig, Offer, OfferId,
    OpenlotError, Result,
};

use crate::admin::AdminPolicy;

/// The OpenLot marketplace engine.
///
/// Owns all listing, offer, and escrow state for its lifetime; asset
/// ownership lives in the external registry and is only referenced here.
pub struct Marketplace {
    pub(crate) config: MarketplaceConfig,
    pub(crate) listings: HashMap<ListingId, Listing>,
    pub(crate) offers: HashMap<OfferId, Offer>,
    /// Next id = last id + 1, allocated together with the record it names.
    pub(crate) next_listing_id: ListingId,
    pub(crate) next_offer_id: OfferId,
    // Secondary indices, maintained transactionally with the primary records.
    pub(crate) active_listings: BTreeSet<ListingId>,
    pub(crate) listings_by_asset: HashMap<AssetRef, Vec<ListingId>>,
    pub(crate) listings_by_seller: HashMap<AccountId, Vec<ListingId>>,
    pub(crate) ledger: EscrowLedger,
    pub(crate) custody: CustodyTracker,
    pub(crate) coordinator: SettlementCoordinator,
    pub(crate) registry: Rc<dyn AssetRegistry>,
    pub(crate) gateway: Rc<dyn CurrencyGateway>,
    pub(crate) clock: Rc<dyn Clock>,
    pub(crate) policy: Box<dyn AdminPolicy>,
    pub(crate) sale_log: SaleLog,
    pub(crate) events: Vec<MarketEvent>,
    pub(crate) paused: bool,
    /// Non-reentrant guard flag.
    pub(crate) busy: bool,
}

impl Marketplace {
    /// Create an engine with the given configuration and collaborators.
    ///
    /// # Errors
    /// Propagates configuration validation failures.
    pub fn new(
        config: MarketplaceConfig,
        registry: Rc<dyn AssetRegistry>,
        gateway: Rc<dyn CurrencyGateway>,
        clock: Rc<dyn Clock>,
        policy: Box<dyn AdminPolicy>,
    ) -> Result<Self> {
        config.validate()?;
        let coordinator = SettlementCoordinator::new(
            config.treasury,
            Rc::clone(&registry),
            Rc::clone(&gateway),
        );
        Ok(Self {
            config,
            listings: HashMap::new(),
            offers: HashMap::new(),
            next_listing_id: ListingId(1),
            next_offer_id: OfferId(1),
            active_listings: BTreeSet::new(),
            listings_by_asset: HashMap::new(),
            listings_by_seller: HashMap::new(),
            ledger: EscrowLedger::new(),
            custody: CustodyTracker::new(),
            coordinator,
            registry,
            gateway,
            clock,
            policy,
            sale_log: SaleLog::new(),
            events: Vec::new(),
            paused: false,
            busy: false,
        })
    }

    /// Run a market operation under the reentrancy guard and pause check.
    pub(crate) fn market_op<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        if self.busy {
            return Err(OpenlotError::OperationInProgress);
        }
        if self.paused {
            return Err(OpenlotError::SystemPaused);
        }
        self.busy = true;
        let out = f(self);
        self.busy = false;
        out
    }

    /// Run an administrative operation under the reentrancy guard only —
    /// `unpause` has to work while paused.
    pub(crate) fn non_reentrant<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        if self.busy {
            return Err(OpenlotError::OperationInProgress);
        }
        self.busy = true;
        let out = f(self);
        self.busy = false;
        out
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub(crate) fn record_event(&mut self, event: MarketEvent) {
        tracing::debug!(event = event.label(), "event recorded");
        self.events.push(event);
    }

    /// Allocate the next listing id.
    pub(crate) fn allocate_listing_id(&mut self) -> ListingId {
        let id = self.next_listing_id;
        self.next_listing_id = id.next();
        id
    }

    /// Allocate the next offer id.
    pub(crate) fn allocate_offer_id(&mut self) -> OfferId {
        let id = self.next_offer_id;
        self.next_offer_id = id.next();
        id
    }

    /// Insert a fresh Active listing and update every index with it.
    pub(crate) fn insert_listing(&mut self, listing: Listing) {
        let id = listing.id;
        self.active_listings.insert(id);
        self.listings_by_asset
            .entry(listing.asset.clone())
            .or_default()
            .push(id);
        self.listings_by_seller
            .entry(listing.seller)
            .or_default()
            .push(id);
        self.listings.insert(id, listing);
    }

    /// Drop a listing from the active index when it reaches a terminal state.
    pub(crate) fn retire_listing(&mut self, id: ListingId) {
        self.active_listings.remove(&id);
    }

    /// Put a listing back in the active index (operation rollback).
    pub(crate) fn unretire_listing(&mut self, id: ListingId) {
        self.active_listings.insert(id);
    }
}
