//! Monetary arithmetic helpers over rust_decimal
//!
//! All balances and movement amounts in the system are signed decimals with
//! two fractional digits. Sign convention: a positive amount increases the
//! customer's debt towards the business, a negative amount decreases it.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Number of fractional digits carried by every stored monetary value
pub const MONEY_SCALE: u32 = 2;

/// Rounds a monetary value to two decimal places, half-up
///
/// Half-up ("commercial") rounding is what customers see on receipts:
/// `100.035` becomes `100.04`, `-0.005` becomes `-0.01`.
pub fn round2(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Computes `value`% of `base`, rounded to two decimal places
///
/// Used for percentage surcharges on an outstanding balance.
pub fn percentage_of(base: Decimal, value: Decimal) -> Decimal {
    round2(base * value / dec!(100))
}

/// Returns true if the amount is strictly positive
pub fn is_debt(amount: Decimal) -> bool {
    amount > Decimal::ZERO
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2_half_up() {
        assert_eq!(round2(dec!(100.035)), dec!(100.04));
        assert_eq!(round2(dec!(100.034)), dec!(100.03));
        assert_eq!(round2(dec!(-0.005)), dec!(-0.01));
    }

    #[test]
    fn test_percentage_of_balance() {
        // 10% of 1000.33 is 100.033, which rounds to 100.03
        assert_eq!(percentage_of(dec!(1000.33), dec!(10)), dec!(100.03));
        assert_eq!(percentage_of(dec!(8000), dec!(5)), dec!(400.00));
    }

    #[test]
    fn test_is_debt() {
        assert!(is_debt(dec!(0.01)));
        assert!(!is_debt(Decimal::ZERO));
        assert!(!is_debt(dec!(-15)));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn round2_is_idempotent(minor in -1_000_000_000i64..1_000_000_000i64) {
            let amount = Decimal::new(minor, 3);
            let rounded = round2(amount);
            prop_assert_eq!(round2(rounded), rounded);
            prop_assert!(rounded.scale() <= MONEY_SCALE);
        }

        #[test]
        fn round2_stays_within_half_a_cent(minor in -1_000_000_000i64..1_000_000_000i64) {
            let amount = Decimal::new(minor, 4);
            let diff = (round2(amount) - amount).abs();
            prop_assert!(diff <= Decimal::new(5, 3));
        }
    }
}
