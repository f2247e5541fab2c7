//! Shared arithmetic helpers for the ITBI calculations.
//!
//! Rounding lives here so that every display path rounds the same way; the
//! calculation functions themselves never round.

use rust_decimal::{Decimal, RoundingStrategy};

/// One hundred, the divisor that turns a percentage rate into a fraction.
pub const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero, which is the
/// convention for displaying centavos.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use itbi_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the larger of two decimal values.
///
/// ```
/// use rust_decimal_macros::dec;
/// use itbi_core::calculations::common::max;
///
/// assert_eq!(max(dec!(100.00), dec!(200.00)), dec!(200.00));
/// assert_eq!(max(dec!(-100.00), dec!(-200.00)), dec!(-100.00));
/// ```
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Converts a percentage (e.g. `3` for 3%) into a fraction (`0.03`).
pub fn percent_to_fraction(rate_percent: Decimal) -> Decimal {
    rate_percent / ONE_HUNDRED
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // round_half_up tests
    // =========================================================================

    #[test]
    fn round_half_up_rounds_down_below_midpoint() {
        assert_eq!(round_half_up(dec!(5000.004)), dec!(5000.00));
    }

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
    }

    #[test]
    fn round_half_up_handles_negative_values() {
        assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46));
    }

    #[test]
    fn round_half_up_handles_large_values() {
        assert_eq!(round_half_up(dec!(999999.999)), dec!(1000000.00));
    }

    // =========================================================================
    // max tests
    // =========================================================================

    #[test]
    fn max_returns_larger_value_in_either_position() {
        assert_eq!(max(dec!(100), dec!(200)), dec!(200));
        assert_eq!(max(dec!(200), dec!(100)), dec!(200));
    }

    #[test]
    fn max_handles_equal_values() {
        assert_eq!(max(dec!(150), dec!(150)), dec!(150));
    }

    #[test]
    fn max_handles_zero() {
        assert_eq!(max(dec!(0), dec!(100)), dec!(100));
    }

    // =========================================================================
    // percent_to_fraction tests
    // =========================================================================

    #[test]
    fn percent_to_fraction_divides_by_one_hundred() {
        assert_eq!(percent_to_fraction(dec!(3)), dec!(0.03));
        assert_eq!(percent_to_fraction(dec!(2.5)), dec!(0.025));
    }
}
