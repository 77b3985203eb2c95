//! Per-(holder, currency) escrow accounting.
//!
//! All fund movement through the engine is modeled as credits and debits
//! here before any external payout. Mutations are atomic: either the full
//! operation succeeds or the balance is unchanged.

use std::collections::HashMap;

use openlot_types::{AccountId, Currency, OpenlotError, Result};
use rust_decimal::Decimal;

/// Source of truth for funds the engine holds on users' behalf.
///
/// Debit is checked-and-applied as one step on a single map entry — there
/// is no window where a balance is reserved but not yet decremented, so
/// concurrent-looking operation sequences on the same holder cannot
/// double-spend.
#[derive(Debug, Default)]
pub struct EscrowLedger {
    /// Per-(holder, currency) escrowed amounts.
    balances: HashMap<(AccountId, Currency), Decimal>,
}

impl EscrowLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self {
            balances: HashMap::new(),
        }
    }

    /// Credit `amount` to the holder's escrow.
    pub fn credit(&mut self, holder: AccountId, currency: &str, amount: Decimal) {
        let entry = self
            .balances
            .entry((holder, currency.to_string()))
            .or_insert(Decimal::ZERO);
        *entry += amount;
    }

    /// Debit `amount` from the holder's escrow.
    ///
    /// # Errors
    /// Returns `InsufficientEscrow` if the balance is below `amount`;
    /// the balance is left unchanged.
    pub fn debit(&mut self, holder: AccountId, currency: &str, amount: Decimal) -> Result<()> {
        let entry = self
            .balances
            .get_mut(&(holder, currency.to_string()))
            .ok_or(OpenlotError::InsufficientEscrow {
                needed: amount,
                available: Decimal::ZERO,
            })?;

        if *entry < amount {
            return Err(OpenlotError::InsufficientEscrow {
                needed: amount,
                available: *entry,
            });
        }

        *entry -= amount;
        Ok(())
    }

    /// Escrowed balance for a (holder, currency) pair. Zero if absent.
    #[must_use]
    pub fn balance_of(&self, holder: AccountId, currency: &str) -> Decimal {
        self.balances
            .get(&(holder, currency.to_string()))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Sum of all escrowed balances in a currency.
    #[must_use]
    pub fn total_escrowed(&self, currency: &str) -> Decimal {
        self.balances
            .iter()
            .filter(|((_, c), _)| c == currency)
            .map(|(_, amount)| *amount)
            .sum()
    }
}
