//! Basis-point arithmetic on integral base-unit amounts.
//!
//! Amounts throughout OpenLot are exact integers of indivisible base units
//! carried in a [`Decimal`]. Shares truncate toward zero, so any rounding
//! remainder stays with whoever is paid by subtraction last.

use rust_decimal::Decimal;

use crate::constants::BPS_DENOMINATOR;

/// `floor(amount * bps / 10000)`.
#[must_use]
pub fn share(amount: Decimal, bps: u16) -> Decimal {
    (amount * Decimal::from(bps) / Decimal::from(BPS_DENOMINATOR)).floor()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_division() {
        // 2.5% of 1000 = 25
        assert_eq!(share(Decimal::new(1000, 0), 250), Decimal::new(25, 0));
    }

    #[test]
    fn truncates_toward_zero() {
        // 2.5% of 999 = 24.975 -> 24
        assert_eq!(share(Decimal::new(999, 0), 250), Decimal::new(24, 0));
    }

    #[test]
    fn zero_bps_is_zero() {
        assert_eq!(share(Decimal::new(12345, 0), 0), Decimal::ZERO);
    }

    #[test]
    fn full_share_is_identity() {
        assert_eq!(share(Decimal::new(777, 0), 10_000), Decimal::new(777, 0));
    }
}
