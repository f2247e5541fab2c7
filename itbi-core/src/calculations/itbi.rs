//! ITBI (property-transfer tax) calculation.
//!
//! The tax is levied on whichever is higher: the price declared for the
//! transaction or the assessed ("venal") value. The state rate, given as a
//! percentage, is applied to that taxable base.
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Transaction value |
//! | 2    | Assessed (venal) value |
//! | 3    | Taxable base: larger of step 1 or step 2 |
//! | 4    | Rate (percent) |
//! | 5    | Tax: step 3 × step 4 ÷ 100 |
//!
//! Nothing here rounds; round for display with
//! [`format_brl`](crate::calculations::money::format_brl).
//!
//! Two entry points handle a missing rate differently:
//! [`compute_tax_strict`] refuses to calculate, [`compute_tax_permissive`]
//! treats the rate as zero.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use itbi_core::calculations::{ItbiCalculator, ItbiInput};
//! use itbi_core::{RateTable, StateCode};
//!
//! let table = RateTable::brazil_default();
//! let calculator = ItbiCalculator::new(&table);
//!
//! let input = ItbiInput {
//!     transaction_value: dec!(250000.00),
//!     assessed_value: dec!(180000.00),
//! };
//! let result = calculator.calculate_for_state(StateCode::SP, &input).unwrap();
//!
//! assert_eq!(result.taxable_base, dec!(250000.00));
//! assert_eq!(result.tax_amount, dec!(8000.00));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::calculations::common::{ONE_HUNDRED, max, percent_to_fraction};
use crate::models::{RateTable, StateCode};

/// Errors raised by the strict calculation path.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ItbiError {
    /// No rate was supplied or found for the jurisdiction.
    #[error("ITBI rate is required")]
    MissingRate,

    /// The state has no rate in the lookup table.
    #[error("no ITBI rate configured for state {0}")]
    UnknownStateRate(StateCode),

    /// The rate must be a percentage in (0, 100].
    #[error("ITBI rate must be greater than 0 and at most 100, got {0}")]
    RateOutOfRange(Decimal),

    /// The tax does not fit in a `Decimal`.
    #[error("amount too large to calculate")]
    Overflow,
}

/// The two valuations a calculation compares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItbiInput {
    /// Price paid in the transfer.
    pub transaction_value: Decimal,

    /// Government-assessed value of the property.
    pub assessed_value: Decimal,
}

/// Every input of a direct calculation, with the rate as a percentage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxCalculationInput {
    pub transaction_value: Decimal,
    pub assessed_value: Decimal,
    pub rate: Decimal,
}

impl TaxCalculationInput {
    pub fn valuations(&self) -> ItbiInput {
        ItbiInput {
            transaction_value: self.transaction_value,
            assessed_value: self.assessed_value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxCalculationResult {
    /// Larger of the transaction and assessed values.
    pub taxable_base: Decimal,

    /// Tax due on the taxable base.
    pub tax_amount: Decimal,
}

/// Alias kept for call sites that read better with the tax's name.
pub type ItbiResult = TaxCalculationResult;

/// Picks the taxable base: the larger of the two valuations.
pub fn select_taxable_base(
    transaction_value: Decimal,
    assessed_value: Decimal,
) -> Decimal {
    max(transaction_value, assessed_value)
}

/// Applies a percentage rate to the taxable base, or `None` when the
/// product overflows.
pub fn checked_compute_tax(
    taxable_base: Decimal,
    rate_percent: Decimal,
) -> Option<Decimal> {
    taxable_base.checked_mul(percent_to_fraction(rate_percent))
}

/// Applies a percentage rate to the taxable base.
///
/// A rate of zero yields zero tax. A product beyond the `Decimal` range
/// saturates.
pub fn compute_tax(
    taxable_base: Decimal,
    rate_percent: Decimal,
) -> Decimal {
    checked_compute_tax(taxable_base, rate_percent).unwrap_or_else(|| {
        warn!(%taxable_base, rate = %rate_percent, "ITBI overflowed, saturating");
        taxable_base.saturating_mul(percent_to_fraction(rate_percent))
    })
}

/// Runs the full calculation for a direct input. A tax beyond the
/// `Decimal` range saturates; use [`checked_calculate`] to reject it.
pub fn calculate(input: &TaxCalculationInput) -> TaxCalculationResult {
    checked_calculate(input).unwrap_or_else(|_| {
        let taxable_base = select_taxable_base(input.transaction_value, input.assessed_value);
        TaxCalculationResult {
            taxable_base,
            tax_amount: compute_tax(taxable_base, input.rate),
        }
    })
}

/// Like [`calculate`], but fails instead of saturating.
///
/// # Errors
///
/// [`ItbiError::Overflow`] when the tax does not fit in a `Decimal`.
pub fn checked_calculate(input: &TaxCalculationInput) -> Result<TaxCalculationResult, ItbiError> {
    let taxable_base = select_taxable_base(input.transaction_value, input.assessed_value);
    let tax_amount = checked_compute_tax(taxable_base, input.rate).ok_or(ItbiError::Overflow)?;

    debug!(
        transaction_value = %input.transaction_value,
        assessed_value = %input.assessed_value,
        rate = %input.rate,
        %taxable_base,
        %tax_amount,
        "ITBI calculated"
    );

    Ok(TaxCalculationResult {
        taxable_base,
        tax_amount,
    })
}

/// Calculates only when a valid rate is present.
///
/// # Errors
///
/// * [`ItbiError::MissingRate`] when `rate` is `None`.
/// * [`ItbiError::RateOutOfRange`] when the rate is not in (0, 100].
/// * [`ItbiError::Overflow`] when the tax does not fit in a `Decimal`.
pub fn compute_tax_strict(
    input: &ItbiInput,
    rate: Option<Decimal>,
) -> Result<ItbiResult, ItbiError> {
    let rate = rate.ok_or(ItbiError::MissingRate)?;
    if rate <= Decimal::ZERO || rate > ONE_HUNDRED {
        return Err(ItbiError::RateOutOfRange(rate));
    }

    checked_calculate(&TaxCalculationInput {
        transaction_value: input.transaction_value,
        assessed_value: input.assessed_value,
        rate,
    })
}

/// Always calculates; a missing rate counts as zero.
pub fn compute_tax_permissive(
    input: &ItbiInput,
    rate: Option<Decimal>,
) -> ItbiResult {
    calculate(&TaxCalculationInput {
        transaction_value: input.transaction_value,
        assessed_value: input.assessed_value,
        rate: rate.unwrap_or(Decimal::ZERO),
    })
}

/// Calculator bound to a state rate table.
#[derive(Debug, Clone)]
pub struct ItbiCalculator<'a> {
    rates: &'a RateTable,
}

impl<'a> ItbiCalculator<'a> {
    pub fn new(rates: &'a RateTable) -> Self {
        Self { rates }
    }

    /// Looks up the state's rate and calculates strictly.
    ///
    /// # Errors
    ///
    /// * [`ItbiError::UnknownStateRate`] when the table has no rate for `state`.
    /// * [`ItbiError::RateOutOfRange`] when the configured rate is invalid.
    pub fn calculate_for_state(
        &self,
        state: StateCode,
        input: &ItbiInput,
    ) -> Result<ItbiResult, ItbiError> {
        let rate = self
            .rates
            .rate_for(state)
            .ok_or(ItbiError::UnknownStateRate(state))?;
        compute_tax_strict(input, Some(rate))
    }

    /// Calculates with an explicit rate, ignoring the table.
    pub fn calculate(
        &self,
        input: &TaxCalculationInput,
    ) -> TaxCalculationResult {
        calculate(input)
    }
}
