//! Administrative surface: fee updates, currency support, pause control.
//!
//! Authorization is a capability check injected into the engine — an
//! [`AdminPolicy`] decides per (caller, action), with no access-control
//! inheritance baked into the engine itself.

use openlot_types::{
    AccountId, MarketEvent, OpenlotError, Result, constants,
};

use crate::marketplace::Marketplace;

/// An administrative action requiring authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminAction {
    SetPlatformFee,
    SetSupportedCurrency,
    Pause,
    Unpause,
}

/// Decides whether a caller may perform an administrative action.
pub trait AdminPolicy {
    fn authorize(&self, caller: AccountId, action: AdminAction) -> bool;
}

/// Policy with a single privileged account allowed to do everything.
#[derive(Debug, Clone, Copy)]
pub struct SingleAdmin {
    admin: AccountId,
}

impl SingleAdmin {
    #[must_use]
    pub fn new(admin: AccountId) -> Self {
        Self { admin }
    }
}

impl AdminPolicy for SingleAdmin {
    fn authorize(&self, caller: AccountId, _action: AdminAction) -> bool {
        caller == self.admin
    }
}

impl Marketplace {
    /// Update the platform fee.
    ///
    /// # Errors
    /// - `Unauthorized` if the policy rejects the caller
    /// - `FeeTooHigh` above the 1000 bps cap
    pub fn set_platform_fee(&mut self, caller: AccountId, bps: u16) -> Result<()> {
        self.non_reentrant(|market| {
            market.authorize(caller, AdminAction::SetPlatformFee)?;
            if bps > constants::MAX_PLATFORM_FEE_BPS {
                return Err(OpenlotError::FeeTooHigh {
                    bps,
                    cap_bps: constants::MAX_PLATFORM_FEE_BPS,
                });
            }
            let old_bps = market.config.platform_fee_bps;
            market.config.platform_fee_bps = bps;
            market.record_event(MarketEvent::PlatformFeeUpdated {
                old_bps,
                new_bps: bps,
            });
            Ok(())
        })
    }

    /// Enable or disable a currency for new listings, bids, and offers.
    /// Existing records in a disabled currency still settle and refund.
    ///
    /// # Errors
    /// `Unauthorized` if the policy rejects the caller.
    pub fn set_supported_currency(
        &mut self,
        caller: AccountId,
        currency: &str,
        enabled: bool,
    ) -> Result<()> {
        self.non_reentrant(|market| {
            market.authorize(caller, AdminAction::SetSupportedCurrency)?;
            let supported = &mut market.config.supported_currencies;
            if enabled {
                if !supported.iter().any(|c| c == currency) {
                    supported.push(currency.to_string());
                }
            } else {
                supported.retain(|c| c != currency);
            }
            market.record_event(MarketEvent::CurrencySupportUpdated {
                currency: currency.to_string(),
                enabled,
            });
            Ok(())
        })
    }

    /// Stop all state-mutating market operations. Views stay available.
    ///
    /// # Errors
    /// `Unauthorized` if the policy rejects the caller.
    pub fn pause(&mut self, caller: AccountId) -> Result<()> {
        self.non_reentrant(|market| {
            market.authorize(caller, AdminAction::Pause)?;
            market.paused = true;
            market.record_event(MarketEvent::Paused);
            Ok(())
        })
    }

    /// Resume state-mutating market operations.
    ///
    /// # Errors
    /// `Unauthorized` if the policy rejects the caller.
    pub fn unpause(&mut self, caller: AccountId) -> Result<()> {
        self.non_reentrant(|market| {
            market.authorize(caller, AdminAction::Unpause)?;
            market.paused = false;
            market.record_event(MarketEvent::Unpaused);
            Ok(())
        })
    }

    pub(crate) fn authorize(&self, caller: AccountId, action: AdminAction) -> Result<()> {
        if self.policy.authorize(caller, action) {
            Ok(())
        } else {
            Err(OpenlotError::Unauthorized)
        }
    }
}
