//! Parsing and display of pt-BR monetary and percentage strings.
//!
//! Two input conventions show up in form fields and they are kept apart:
//!
//! | Mode | Input | Result |
//! |------|-------|--------|
//! | decimal string | `"1.234,56"` | `1234.56` |
//! | cents entry | `"12345"` | `123.45` |
//!
//! In decimal-string mode `.` is the thousands separator and `,` the decimal
//! marker. In cents-entry mode every digit typed shifts the amount one place
//! to the left, the way a currency mask on a numeric keypad behaves.
//!
//! Neither parser fails: input without digits is worth zero, and deciding
//! whether zero is acceptable is up to the caller.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calculations::common::round_half_up;

/// Which parser a form field uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryMode {
    /// `"1.234,56"` style, see [`parse_locale_number`].
    #[default]
    DecimalString,
    /// `"123456"` typed digits, see [`parse_cents_entry`].
    CentsEntry,
}

impl EntryMode {
    /// Parses `raw` with the parser selected by this mode.
    pub fn parse(
        self,
        raw: &str,
    ) -> Decimal {
        match self {
            Self::DecimalString => parse_locale_number(raw),
            Self::CentsEntry => parse_cents_entry(raw),
        }
    }
}

/// Parses a pt-BR decimal string such as `"R$ 1.234,56"` or `"2,5"`.
///
/// Everything except digits, `.` and `,` is discarded. Every `.` is treated
/// as a thousands separator and dropped; the first `,` becomes the decimal
/// point and anything after a second `,` is ignored.
///
/// ```
/// use rust_decimal_macros::dec;
/// use itbi_core::calculations::money::parse_locale_number;
///
/// assert_eq!(parse_locale_number("1.234,56"), dec!(1234.56));
/// assert_eq!(parse_locale_number("R$ 250.000,00"), dec!(250000));
/// assert_eq!(parse_locale_number(""), dec!(0));
/// ```
pub fn parse_locale_number(raw: &str) -> Decimal {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',')
        .collect();

    if !kept.chars().any(|c| c.is_ascii_digit()) {
        return Decimal::ZERO;
    }

    let (integer, fraction) = match kept.split_once(',') {
        Some((integer, rest)) => (integer, rest.split_once(',').map_or(rest, |(f, _)| f)),
        None => (kept.as_str(), ""),
    };
    let integer = if integer.is_empty() { "0" } else { integer };

    let normalized = if fraction.is_empty() {
        integer.to_string()
    } else {
        format!("{integer}.{fraction}")
    };

    Decimal::from_str(&normalized).unwrap_or_else(|e| {
        warn!(input = %raw, "unparseable decimal string, using zero: {}", e);
        Decimal::ZERO
    })
}

/// Parses digits typed into a currency mask as an amount of centavos.
///
/// All non-digit characters are stripped, so a value that was already masked
/// (`"R$ 123,45"`) parses back to the same amount. Leading zeros are
/// ignored; more significant digits than the 96-bit decimal mantissa holds
/// saturate to zero.
///
/// ```
/// use rust_decimal_macros::dec;
/// use itbi_core::calculations::money::parse_cents_entry;
///
/// assert_eq!(parse_cents_entry("12345"), dec!(123.45));
/// assert_eq!(parse_cents_entry("5"), dec!(0.05));
/// assert_eq!(parse_cents_entry(""), dec!(0));
/// ```
pub fn parse_cents_entry(raw: &str) -> Decimal {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return Decimal::ZERO;
    }

    let parsed = significant
        .parse::<i128>()
        .map_err(|e| e.to_string())
        .and_then(|cents| {
            Decimal::try_from_i128_with_scale(cents, 2).map_err(|e| e.to_string())
        });

    parsed.unwrap_or_else(|e| {
        warn!(input = %raw, "cents entry out of range, using zero: {}", e);
        Decimal::ZERO
    })
}

/// Formats an amount as Brazilian reais, e.g. `R$ 1.234,56`.
///
/// The amount is rounded half away from zero to two places first.
pub fn format_brl(value: Decimal) -> String {
    let rounded = round_half_up(value);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    let plain = format!("{:.2}", rounded.abs());
    let (integer, fraction) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    format!("{sign}R$ {},{fraction}", group_thousands(integer))
}

/// Applies the currency mask to raw keypad input: `"12345"` becomes `R$ 123,45`.
pub fn format_cents_entry(raw: &str) -> String {
    format_brl(parse_cents_entry(raw))
}

/// Formats a percentage rate the pt-BR way, e.g. `2,5%`.
pub fn format_percent(rate: Decimal) -> String {
    format!("{}%", rate.normalize().to_string().replace('.', ","))
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // parse_locale_number tests
    // =========================================================================

    #[test]
    fn parse_locale_number_handles_thousands_and_decimal_comma() {
        assert_eq!(parse_locale_number("1.234,56"), dec!(1234.56));
        assert_eq!(parse_locale_number("1.234.567,89"), dec!(1234567.89));
    }

    #[test]
    fn parse_locale_number_strips_currency_symbol() {
        assert_eq!(parse_locale_number("R$ 180.000,00"), dec!(180000));
    }

    #[test]
    fn parse_locale_number_accepts_plain_percentages() {
        assert_eq!(parse_locale_number("2,5"), dec!(2.5));
        assert_eq!(parse_locale_number("3"), dec!(3));
        assert_eq!(parse_locale_number("3,2 %"), dec!(3.2));
    }

    #[test]
    fn parse_locale_number_empty_is_zero() {
        assert_eq!(parse_locale_number(""), Decimal::ZERO);
        assert_eq!(parse_locale_number("   "), Decimal::ZERO);
    }

    #[test]
    fn parse_locale_number_without_digits_is_zero() {
        assert_eq!(parse_locale_number("abc"), Decimal::ZERO);
        assert_eq!(parse_locale_number("R$ ,"), Decimal::ZERO);
        assert_eq!(parse_locale_number(".,."), Decimal::ZERO);
    }

    #[test]
    fn parse_locale_number_treats_dot_as_thousands_separator() {
        // "2.5" is read as two-thousand-five hundred in pt-BR grouping terms.
        assert_eq!(parse_locale_number("2.5"), dec!(25));
    }

    #[test]
    fn parse_locale_number_ignores_text_after_second_comma() {
        assert_eq!(parse_locale_number("1,2,3"), dec!(1.2));
    }

    #[test]
    fn parse_locale_number_leading_comma_means_fraction() {
        assert_eq!(parse_locale_number(",75"), dec!(0.75));
    }

    #[test]
    fn parse_locale_number_huge_input_is_zero() {
        let raw = "9".repeat(60);
        assert_eq!(parse_locale_number(&raw), Decimal::ZERO);
    }

    // =========================================================================
    // parse_cents_entry tests
    // =========================================================================

    #[test]
    fn parse_cents_entry_divides_digits_by_one_hundred() {
        assert_eq!(parse_cents_entry("12345"), dec!(123.45));
        assert_eq!(parse_cents_entry("5"), dec!(0.05));
        assert_eq!(parse_cents_entry("25000000"), dec!(250000.00));
    }

    #[test]
    fn parse_cents_entry_empty_is_zero() {
        assert_eq!(parse_cents_entry(""), Decimal::ZERO);
        assert_eq!(parse_cents_entry("R$ "), Decimal::ZERO);
    }

    #[test]
    fn parse_cents_entry_reparses_masked_value() {
        assert_eq!(parse_cents_entry("R$ 1.234,56"), dec!(1234.56));
    }

    #[test]
    fn parse_cents_entry_keeps_amounts_wider_than_i64() {
        assert_eq!(
            parse_cents_entry("12345678901234567890"),
            dec!(123456789012345678.90)
        );
        assert_eq!(
            parse_cents_entry(&"1".repeat(28)),
            Decimal::from_i128_with_scale(1_111_111_111_111_111_111_111_111_111, 2)
        );
    }

    #[test]
    fn parse_cents_entry_ignores_leading_zeros() {
        let raw = format!("{}12345", "0".repeat(50));
        assert_eq!(parse_cents_entry(&raw), dec!(123.45));
        assert_eq!(parse_cents_entry("0000"), Decimal::ZERO);
    }

    #[test]
    fn parse_cents_entry_overflow_is_zero() {
        // 30 digits exceed the 96-bit mantissa; 45 exceed i128 too.
        assert_eq!(parse_cents_entry(&"1".repeat(30)), Decimal::ZERO);
        assert_eq!(parse_cents_entry(&"9".repeat(45)), Decimal::ZERO);
    }

    #[test]
    fn entry_mode_dispatches_to_matching_parser() {
        assert_eq!(EntryMode::DecimalString.parse("123,45"), dec!(123.45));
        assert_eq!(EntryMode::CentsEntry.parse("12345"), dec!(123.45));
        assert_eq!(EntryMode::default(), EntryMode::DecimalString);
    }

    // =========================================================================
    // formatting tests
    // =========================================================================

    #[test]
    fn format_brl_groups_thousands() {
        assert_eq!(format_brl(dec!(1234.5)), "R$ 1.234,50");
        assert_eq!(format_brl(dec!(250000)), "R$ 250.000,00");
        assert_eq!(format_brl(dec!(1234567.891)), "R$ 1.234.567,89");
    }

    #[test]
    fn format_brl_small_values() {
        assert_eq!(format_brl(dec!(0)), "R$ 0,00");
        assert_eq!(format_brl(dec!(0.05)), "R$ 0,05");
        assert_eq!(format_brl(dec!(999.999)), "R$ 1.000,00");
    }

    #[test]
    fn format_brl_negative_values() {
        assert_eq!(format_brl(dec!(-1500)), "-R$ 1.500,00");
        assert_eq!(format_brl(dec!(-0.001)), "R$ 0,00");
    }

    #[test]
    fn format_cents_entry_masks_typed_digits() {
        assert_eq!(format_cents_entry("12345"), "R$ 123,45");
        assert_eq!(format_cents_entry(""), "R$ 0,00");
    }

    #[test]
    fn format_percent_uses_decimal_comma() {
        assert_eq!(format_percent(dec!(2.5)), "2,5%");
        assert_eq!(format_percent(dec!(3.00)), "3%");
    }
}
