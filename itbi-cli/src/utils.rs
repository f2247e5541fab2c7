use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use thiserror::Error;

/// Plain decimals: digits with an optional `.` or `,` fraction.
static PLAIN_DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:[.,]\d+)?$").expect("static pattern is valid"));

/// Error returned when a rate or factor argument is not a plain decimal.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid number '{input}': expected digits with an optional ',' or '.' fraction")]
pub struct ParseDecimalError {
    input: String,
}

/// Parses a small plain decimal where either `,` or `.` marks the fraction.
///
/// Currency amounts go through
/// [`parse_locale_number`](itbi_core::calculations::parse_locale_number)
/// instead, which treats `.` as a thousands separator. Rates and factors
/// are short numbers like `3.2` or `0,9` where that reading would be wrong.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let trimmed = s.trim();
    let invalid = || {
        tracing::warn!(input = %s, "invalid decimal argument");
        ParseDecimalError {
            input: s.to_string(),
        }
    };

    if !PLAIN_DECIMAL.is_match(trimmed) {
        return Err(invalid());
    }
    trimmed.replace(',', ".").parse().map_err(|_| invalid())
}

/// Parses a percentage rate, accepting a trailing `%` (`"3,2%"` → 3.2).
pub fn parse_rate(s: &str) -> Result<Decimal, ParseDecimalError> {
    let trimmed = s.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed);
    parse_decimal(number)
}

/// Parses the venal correction factor. Missing, blank or zero means 1.
pub fn parse_factor(s: Option<&str>) -> Result<Decimal, ParseDecimalError> {
    match s.map(str::trim) {
        None | Some("") => Ok(Decimal::ONE),
        Some(raw) => {
            let factor = parse_decimal(raw)?;
            Ok(if factor.is_zero() { Decimal::ONE } else { factor })
        }
    }
}

/// Area in m² with a pt-BR decimal comma (`85,5 m²`).
pub fn format_area(area: Decimal) -> String {
    format!("{} m²", area.normalize().to_string().replace('.', ","))
}
