//! Test doubles for the external collaborator ports.
//!
//! In-memory registry, bank, and clock with failure injection, used by the
//! unit tests here and by `openlot-engine` (via the `test-helpers` feature).

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use chrono::{DateTime, TimeDelta, Utc};
use openlot_types::{AccountId, AssetRef, OpenlotError, Result, RoyaltyPolicy};
use rust_decimal::Decimal;

use crate::ports::{AssetRegistry, Clock, CurrencyGateway};

// ---------------------------------------------------------------------------
// MockRegistry
// ---------------------------------------------------------------------------

/// In-memory asset registry with per-call failure injection.
#[derive(Debug, Default)]
pub struct MockRegistry {
    owners: RefCell<HashMap<AssetRef, AccountId>>,
    approvals: RefCell<HashSet<(AccountId, AssetRef)>>,
    royalties: RefCell<HashMap<AssetRef, RoyaltyPolicy>>,
    fail_transfers: Cell<bool>,
}

impl MockRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `holder` as the asset's owner and approve the engine.
    pub fn set_owner(&self, asset: &AssetRef, holder: AccountId) {
        self.owners.borrow_mut().insert(asset.clone(), holder);
        self.approvals.borrow_mut().insert((holder, asset.clone()));
    }

    /// Register ownership without transfer approval.
    pub fn set_owner_unapproved(&self, asset: &AssetRef, holder: AccountId) {
        self.owners.borrow_mut().insert(asset.clone(), holder);
    }

    pub fn set_royalty(&self, asset: &AssetRef, policy: RoyaltyPolicy) {
        self.royalties.borrow_mut().insert(asset.clone(), policy);
    }

    /// Make every subsequent `transfer` fail (until reset).
    pub fn set_fail_transfers(&self, fail: bool) {
        self.fail_transfers.set(fail);
    }
}

impl AssetRegistry for MockRegistry {
    fn owner_of(&self, asset: &AssetRef) -> Option<AccountId> {
        self.owners.borrow().get(asset).copied()
    }

    fn is_transfer_approved(&self, holder: AccountId, asset: &AssetRef) -> bool {
        self.approvals.borrow().contains(&(holder, asset.clone()))
    }

    fn transfer(&self, asset: &AssetRef, from: AccountId, to: AccountId) -> Result<()> {
        if self.fail_transfers.get() {
            return Err(OpenlotError::TransferFailed {
                reason: format!("registry rejected transfer of {asset}"),
            });
        }
        let mut owners = self.owners.borrow_mut();
        match owners.get(asset) {
            Some(&holder) if holder == from => {
                owners.insert(asset.clone(), to);
                // New owner starts without approval.
                self.approvals.borrow_mut().remove(&(from, asset.clone()));
                Ok(())
            }
            _ => Err(OpenlotError::TransferFailed {
                reason: format!("{from} does not hold {asset}"),
            }),
        }
    }

    fn royalty_policy(&self, asset: &AssetRef) -> Option<RoyaltyPolicy> {
        self.royalties.borrow().get(asset).copied()
    }
}

// ---------------------------------------------------------------------------
// MockBank
// ---------------------------------------------------------------------------

/// In-memory currency gateway: user wallets plus an engine custody pot,
/// with failure injection for both directions.
#[derive(Debug, Default)]
pub struct MockBank {
    wallets: RefCell<HashMap<(AccountId, String), Decimal>>,
    custody: RefCell<HashMap<String, Decimal>>,
    fail_transfers: Cell<bool>,
    fail_pulls: Cell<bool>,
    fail_transfers_to: RefCell<HashSet<AccountId>>,
}

impl MockBank {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Put funds in a user's wallet.
    pub fn fund(&self, account: AccountId, currency: &str, amount: Decimal) {
        let mut wallets = self.wallets.borrow_mut();
        let entry = wallets
            .entry((account, currency.to_string()))
            .or_insert(Decimal::ZERO);
        *entry += amount;
    }

    /// A user's wallet balance (outside engine custody).
    #[must_use]
    pub fn wallet_of(&self, account: AccountId, currency: &str) -> Decimal {
        self.wallets
            .borrow()
            .get(&(account, currency.to_string()))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Funds sitting in engine custody.
    #[must_use]
    pub fn custody_of(&self, currency: &str) -> Decimal {
        self.custody
            .borrow()
            .get(currency)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Make every subsequent payout `transfer` fail (until reset).
    pub fn set_fail_transfers(&self, fail: bool) {
        self.fail_transfers.set(fail);
    }

    /// Make every subsequent `pull` fail (until reset).
    pub fn set_fail_pulls(&self, fail: bool) {
        self.fail_pulls.set(fail);
    }

    /// Make payouts to one specific account fail, leaving other transfer
    /// directions working.
    pub fn set_fail_transfers_to(&self, account: AccountId) {
        self.fail_transfers_to.borrow_mut().insert(account);
    }
}

impl CurrencyGateway for MockBank {
    fn transfer(&self, currency: &str, to: AccountId, amount: Decimal) -> Result<()> {
        if self.fail_transfers.get() || self.fail_transfers_to.borrow().contains(&to) {
            return Err(OpenlotError::TransferFailed {
                reason: "gateway rejected payout".to_string(),
            });
        }
        let mut custody = self.custody.borrow_mut();
        let held = custody.entry(currency.to_string()).or_insert(Decimal::ZERO);
        if *held < amount {
            return Err(OpenlotError::TransferFailed {
                reason: format!("custody holds {held}, payout needs {amount}"),
            });
        }
        *held -= amount;
        drop(custody);
        self.fund(to, currency, amount);
        Ok(())
    }

    fn pull(&self, currency: &str, from: AccountId, amount: Decimal) -> Result<()> {
        if self.fail_pulls.get() {
            return Err(OpenlotError::TransferFailed {
                reason: "gateway rejected pull".to_string(),
            });
        }
        let mut wallets = self.wallets.borrow_mut();
        let wallet = wallets
            .entry((from, currency.to_string()))
            .or_insert(Decimal::ZERO);
        if *wallet < amount {
            return Err(OpenlotError::TransferFailed {
                reason: format!("wallet holds {wallet}, pull needs {amount}"),
            });
        }
        *wallet -= amount;
        drop(wallets);
        let mut custody = self.custody.borrow_mut();
        *custody.entry(currency.to_string()).or_insert(Decimal::ZERO) += amount;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ManualClock
// ---------------------------------------------------------------------------

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
}

impl ManualClock {
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// A clock starting at the current system time.
    #[must_use]
    pub fn starting_now() -> Self {
        Self::new(Utc::now())
    }

    pub fn advance(&self, delta: TimeDelta) {
        self.now.set(self.now.get() + delta);
    }

    pub fn set(&self, to: DateTime<Utc>) {
        self.now.set(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_transfer_moves_ownership() {
        let registry = MockRegistry::new();
        let asset = AssetRef::new("col", 1);
        let a = AccountId::new();
        let b = AccountId::new();
        registry.set_owner(&asset, a);
        assert!(registry.is_transfer_approved(a, &asset));

        registry.transfer(&asset, a, b).unwrap();
        assert_eq!(registry.owner_of(&asset), Some(b));
        assert!(!registry.is_transfer_approved(b, &asset));
    }

    #[test]
    fn registry_rejects_transfer_from_non_owner() {
        let registry = MockRegistry::new();
        let asset = AssetRef::new("col", 1);
        let a = AccountId::new();
        registry.set_owner(&asset, a);
        let err = registry
            .transfer(&asset, AccountId::new(), AccountId::new())
            .unwrap_err();
        assert!(matches!(err, OpenlotError::TransferFailed { .. }));
        assert_eq!(registry.owner_of(&asset), Some(a));
    }

    #[test]
    fn bank_pull_then_payout() {
        let bank = MockBank::new();
        let user = AccountId::new();
        bank.fund(user, "NATIVE", Decimal::new(100, 0));

        bank.pull("NATIVE", user, Decimal::new(60, 0)).unwrap();
        assert_eq!(bank.wallet_of(user, "NATIVE"), Decimal::new(40, 0));
        assert_eq!(bank.custody_of("NATIVE"), Decimal::new(60, 0));

        let payee = AccountId::new();
        bank.transfer("NATIVE", payee, Decimal::new(60, 0)).unwrap();
        assert_eq!(bank.wallet_of(payee, "NATIVE"), Decimal::new(60, 0));
        assert_eq!(bank.custody_of("NATIVE"), Decimal::ZERO);
    }

    #[test]
    fn bank_pull_insufficient_fails_cleanly() {
        let bank = MockBank::new();
        let user = AccountId::new();
        bank.fund(user, "NATIVE", Decimal::new(10, 0));
        let err = bank.pull("NATIVE", user, Decimal::new(11, 0)).unwrap_err();
        assert!(matches!(err, OpenlotError::TransferFailed { .. }));
        assert_eq!(bank.wallet_of(user, "NATIVE"), Decimal::new(10, 0));
        assert_eq!(bank.custody_of("NATIVE"), Decimal::ZERO);
    }

    #[test]
    fn manual_clock_advances_only_when_told() {
        let clock = ManualClock::starting_now();
        let t0 = clock.now();
        assert_eq!(clock.now(), t0);
        clock.advance(TimeDelta::seconds(30));
        assert_eq!(clock.now(), t0 + TimeDelta::seconds(30));
    }
}
