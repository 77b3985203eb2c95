//! Settlement coordination: asset transfer + fund distribution, atomically.
//!
//! The coordinator is the single choke point where external, potentially
//! untrusted calls occur. Discipline (checks-effects-interactions): all
//! internal state — escrow debit here, record status at the caller — is
//! committed to its post-settlement value *before* any external call, so a
//! reentrant callback would observe already-settled state. On any external
//! failure the coordinator compensates the external calls already made (in
//! reverse order), restores its internal effects, and surfaces
//! [`TransferFailed`]; the caller restores its record snapshot. No partial
//! payout and no unpaid asset transfer ever survives.
//!
//! [`TransferFailed`]: openlot_types::OpenlotError::TransferFailed

use std::rc::Rc;

use chrono::{DateTime, Utc};
use openlot_ledger::{CustodyTracker, EscrowLedger};
use openlot_types::{
    AccountId, AssetRef, Currency, Result, SaleEvent, SaleId, SaleSource,
};
use rust_decimal::Decimal;

use crate::fees;
use crate::ports::{AssetRegistry, CurrencyGateway};

/// Where the buyer's funds come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FundingSource {
    /// Funds were escrowed earlier (auction bid, offer) and are debited
    /// from the buyer's escrow entry.
    Escrow,
    /// Funds are pulled from the buyer at settlement time (fixed-price
    /// purchase, Dutch take).
    Direct,
}

/// One settlement to execute.
#[derive(Debug, Clone)]
pub struct SettlementRequest {
    pub source: SaleSource,
    pub asset: AssetRef,
    pub seller: AccountId,
    pub buyer: AccountId,
    pub price: Decimal,
    pub currency: Currency,
    pub funding: FundingSource,
}

/// Orchestrates fee computation, escrow debit, asset transfer, and payout.
pub struct SettlementCoordinator {
    /// Receives the platform fee on every sale.
    treasury: AccountId,
    registry: Rc<dyn AssetRegistry>,
    gateway: Rc<dyn CurrencyGateway>,
}

impl SettlementCoordinator {
    #[must_use]
    pub fn new(
        treasury: AccountId,
        registry: Rc<dyn AssetRegistry>,
        gateway: Rc<dyn CurrencyGateway>,
    ) -> Self {
        Self {
            treasury,
            registry,
            gateway,
        }
    }

    #[must_use]
    pub fn treasury(&self) -> AccountId {
        self.treasury
    }

    /// Execute one settlement.
    ///
    /// 1. Compute the fee breakdown from the asset's royalty policy.
    /// 2. Effects: debit exactly `price` from the buyer's escrow when the
    ///    funds were escrowed.
    /// 3. Interactions: transfer the asset, pull direct funds, pay out
    ///    platform fee → treasury, royalty → recipient (skipped when zero),
    ///    remainder → seller.
    /// 4. Return the append-only [`SaleEvent`].
    ///
    /// # Errors
    /// - `InsufficientEscrow` if the escrowed funds don't cover `price`
    /// - `TransferFailed` if any external call fails; the escrow debit is
    ///   restored before returning
    pub fn settle(
        &self,
        request: &SettlementRequest,
        platform_fee_bps: u16,
        ledger: &mut EscrowLedger,
        custody: &mut CustodyTracker,
        now: DateTime<Utc>,
    ) -> Result<SaleEvent> {
        // 1. Fee breakdown from the asset's declared royalty policy.
        let royalty = self.registry.royalty_policy(&request.asset);
        let breakdown = fees::split(request.price, platform_fee_bps, royalty.as_ref());

        // 2. Effects: escrow reaches its post-settlement value before any
        //    external call is issued.
        if request.funding == FundingSource::Escrow {
            ledger.debit(request.buyer, &request.currency, request.price)?;
        }

        // 3. Interactions.
        let result = self.execute_transfers(request, &breakdown, royalty.map(|p| p.recipient));
        if let Err(err) = result {
            if request.funding == FundingSource::Escrow {
                ledger.credit(request.buyer, &request.currency, request.price);
            }
            return Err(err);
        }

        match request.funding {
            FundingSource::Escrow => custody.record_outflow(&request.currency, request.price),
            FundingSource::Direct => {
                custody.record_inflow(&request.currency, request.price);
                custody.record_outflow(&request.currency, request.price);
            }
        }

        // 4. Append-only sale record.
        let mut sale = SaleEvent {
            sale_id: SaleId::new(),
            source: request.source,
            asset: request.asset.clone(),
            seller: request.seller,
            buyer: request.buyer,
            price: request.price,
            platform_fee: breakdown.platform_fee,
            royalty_amount: breakdown.royalty_amount,
            seller_proceeds: breakdown.seller_proceeds,
            currency: request.currency.clone(),
            occurred_at: now,
            digest: [0u8; 32],
        };
        sale.digest = sale.compute_digest();

        tracing::info!(
            source = %request.source,
            asset = %request.asset,
            price = %request.price,
            platform_fee = %breakdown.platform_fee,
            royalty = %breakdown.royalty_amount,
            proceeds = %breakdown.seller_proceeds,
            "settlement completed"
        );
        Ok(sale)
    }

    /// The external call sequence: pull direct funds, move the asset, then
    /// pay out. Ordered so that the calls most likely to fail (the buyer's
    /// pull) come first, and every completed call is compensated in reverse
    /// order if a later one fails — a `TransferFailed` settlement leaves no
    /// external effect behind.
    fn execute_transfers(
        &self,
        request: &SettlementRequest,
        breakdown: &fees::FeeBreakdown,
        royalty_recipient: Option<AccountId>,
    ) -> Result<()> {
        // Nothing has happened yet; a failed pull aborts cleanly.
        if request.funding == FundingSource::Direct {
            self.gateway
                .pull(&request.currency, request.buyer, request.price)?;
        }

        if let Err(err) = self
            .registry
            .transfer(&request.asset, request.seller, request.buyer)
        {
            self.refund_direct_pull(request);
            return Err(err);
        }

        let mut payouts: Vec<(AccountId, Decimal)> = Vec::with_capacity(3);
        if breakdown.platform_fee > Decimal::ZERO {
            payouts.push((self.treasury, breakdown.platform_fee));
        }
        if breakdown.royalty_amount > Decimal::ZERO {
            if let Some(recipient) = royalty_recipient {
                payouts.push((recipient, breakdown.royalty_amount));
            }
        }
        if breakdown.seller_proceeds > Decimal::ZERO {
            payouts.push((request.seller, breakdown.seller_proceeds));
        }

        for (completed, &(to, amount)) in payouts.iter().enumerate() {
            if let Err(err) = self.gateway.transfer(&request.currency, to, amount) {
                self.unwind(request, &payouts[..completed]);
                return Err(err);
            }
        }
        Ok(())
    }

    /// Compensate completed external effects in reverse order: claw paid
    /// amounts back into custody, return the asset, refund a direct pull.
    /// A compensation failure cannot be recovered from here; it is logged
    /// and the original settlement error still surfaces to the caller.
    fn unwind(&self, request: &SettlementRequest, completed_payouts: &[(AccountId, Decimal)]) {
        for &(to, amount) in completed_payouts.iter().rev() {
            if let Err(err) = self.gateway.pull(&request.currency, to, amount) {
                tracing::error!(%err, %to, %amount, "payout claw-back failed during unwind");
            }
        }
        if let Err(err) = self
            .registry
            .transfer(&request.asset, request.buyer, request.seller)
        {
            tracing::error!(%err, asset = %request.asset, "asset return failed during unwind");
        }
        self.refund_direct_pull(request);
    }

    fn refund_direct_pull(&self, request: &SettlementRequest) {
        if request.funding == FundingSource::Direct {
            if let Err(err) =
                self.gateway
                    .transfer(&request.currency, request.buyer, request.price)
            {
                tracing::error!(%err, "pull refund failed during unwind");
            }
        }
    }
}
