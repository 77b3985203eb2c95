//! Fee and royalty calculation.
//!
//! Pure arithmetic, no side effects. Shares truncate toward zero and the
//! seller is paid by subtraction last, so the three parts always sum to
//! the sale price exactly.

use openlot_types::{RoyaltyPolicy, bps};
use rust_decimal::Decimal;

/// How a sale price splits between the platform, the creator, and the seller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeBreakdown {
    pub platform_fee: Decimal,
    pub royalty_amount: Decimal,
    pub seller_proceeds: Decimal,
}

/// Split `price` into platform fee, creator royalty, and seller proceeds.
///
/// `platform_fee = floor(price * platform_fee_bps / 10000)`, likewise the
/// royalty (zero when the asset declares none); proceeds are the remainder.
/// `platform_fee_bps` is validated at the admin surface; `royalty` is
/// trusted input from the asset registry.
#[must_use]
pub fn split(price: Decimal, platform_fee_bps: u16, royalty: Option<&RoyaltyPolicy>) -> FeeBreakdown {
    let platform_fee = bps::share(price, platform_fee_bps);
    let royalty_amount = royalty.map_or(Decimal::ZERO, |p| bps::share(price, p.royalty_bps));
    let seller_proceeds = price - platform_fee - royalty_amount;
    FeeBreakdown {
        platform_fee,
        royalty_amount,
        seller_proceeds,
    }
}

#[cfg(test)]
mod tests {
    use openlot_types::AccountId;

    use super::*;

    fn royalty(bps: u16) -> RoyaltyPolicy {
        RoyaltyPolicy {
            recipient: AccountId::new(),
            royalty_bps: bps,
        }
    }

    #[test]
    fn exact_split() {
        // 1000 at 2.5% fee, 5% royalty: 25 + 50 + 925
        let breakdown = split(Decimal::new(1000, 0), 250, Some(&royalty(500)));
        assert_eq!(breakdown.platform_fee, Decimal::new(25, 0));
        assert_eq!(breakdown.royalty_amount, Decimal::new(50, 0));
        assert_eq!(breakdown.seller_proceeds, Decimal::new(925, 0));
    }

    #[test]
    fn no_royalty_goes_to_seller() {
        let breakdown = split(Decimal::new(1000, 0), 250, None);
        assert_eq!(breakdown.royalty_amount, Decimal::ZERO);
        assert_eq!(breakdown.seller_proceeds, Decimal::new(975, 0));
    }

    #[test]
    fn conservation_holds_under_truncation() {
        // 999 at 2.5% -> fee 24 (24.975 truncated); remainder stays with seller.
        let breakdown = split(Decimal::new(999, 0), 250, Some(&royalty(333)));
        assert_eq!(
            breakdown.platform_fee + breakdown.royalty_amount + breakdown.seller_proceeds,
            Decimal::new(999, 0)
        );
        assert_eq!(breakdown.platform_fee, Decimal::new(24, 0));
    }

    #[test]
    fn zero_fee_zero_royalty() {
        let breakdown = split(Decimal::new(500, 0), 0, None);
        assert_eq!(breakdown.platform_fee, Decimal::ZERO);
        assert_eq!(breakdown.seller_proceeds, Decimal::new(500, 0));
    }

    #[test]
    fn conservation_over_range() {
        for price in 1..200i64 {
            let breakdown = split(Decimal::new(price, 0), 250, Some(&royalty(777)));
            assert_eq!(
                breakdown.platform_fee + breakdown.royalty_amount + breakdown.seller_proceeds,
                Decimal::new(price, 0),
                "conservation broke at price {price}"
            );
        }
    }
}
