//! Custody conservation invariant checker.
//!
//! Invariant enforced after every fund-moving operation:
//! ```text
//! ∀ currency: Σ escrow balances ≤ Σ(inflows) - Σ(outflows)
//! ```
//!
//! No escrow entry may reference funds the engine does not actually hold.
//! If the invariant ever breaks, something has gone catastrophically wrong
//! and the check surfaces `EscrowInvariantViolation`.

use std::collections::HashMap;

use openlot_types::{Currency, OpenlotError, Result};
use rust_decimal::Decimal;

/// Tracks the engine's custodial totals per currency and validates that
/// escrow accounting never exceeds them.
#[derive(Debug, Default)]
pub struct CustodyTracker {
    /// Funds pulled into engine custody since genesis, per currency.
    inflows: HashMap<Currency, Decimal>,
    /// Funds paid out of engine custody since genesis, per currency.
    outflows: HashMap<Currency, Decimal>,
}

impl CustodyTracker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inflows: HashMap::new(),
            outflows: HashMap::new(),
        }
    }

    /// Record funds pulled into custody (bid escrow, offer escrow, purchase).
    pub fn record_inflow(&mut self, currency: &str, amount: Decimal) {
        *self
            .inflows
            .entry(currency.to_string())
            .or_insert(Decimal::ZERO) += amount;
    }

    /// Record funds paid out of custody (payouts, refunds).
    pub fn record_outflow(&mut self, currency: &str, amount: Decimal) {
        *self
            .outflows
            .entry(currency.to_string())
            .or_insert(Decimal::ZERO) += amount;
    }

    /// Funds the engine currently holds in a currency: inflows - outflows.
    #[must_use]
    pub fn held(&self, currency: &str) -> Decimal {
        let inflow = self.inflows.get(currency).copied().unwrap_or(Decimal::ZERO);
        let outflow = self
            .outflows
            .get(currency)
            .copied()
            .unwrap_or(Decimal::ZERO);
        inflow - outflow
    }

    /// Verify that the summed escrow balances do not exceed custody.
    ///
    /// # Errors
    /// Returns [`OpenlotError::EscrowInvariantViolation`] if
    /// `total_escrowed > held`.
    pub fn verify(&self, currency: &str, total_escrowed: Decimal) -> Result<()> {
        let held = self.held(currency);
        if total_escrowed > held {
            tracing::error!(
                %currency,
                %total_escrowed,
                %held,
                "escrow conservation violated"
            );
            return Err(OpenlotError::EscrowInvariantViolation {
                reason: format!(
                    "currency {currency}: escrowed {total_escrowed} exceeds held {held} \
                     (inflows={}, outflows={})",
                    self.inflows.get(currency).copied().unwrap_or(Decimal::ZERO),
                    self.outflows
                        .get(currency)
                        .copied()
                        .unwrap_or(Decimal::ZERO),
                ),
            });
        }
        Ok(())
    }

    /// All currencies that have seen custody movement.
    #[must_use]
    pub fn tracked_currencies(&self) -> Vec<Currency> {
        let mut currencies: std::collections::HashSet<Currency> =
            self.inflows.keys().cloned().collect();
        currencies.extend(self.outflows.keys().cloned());
        currencies.into_iter().collect()
    }
}
