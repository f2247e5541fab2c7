//! Venal (assessed) value estimation.
//!
//! When the assessed value is not known it can be approximated from the
//! property's areas and reference prices per square metre:
//!
//! ```text
//! venal = (built area × built m² price + land area × land m² price) × correction factor
//! ```
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use itbi_core::calculations::VenalEstimateInput;
//!
//! let input = VenalEstimateInput {
//!     built_area: dec!(100),
//!     price_per_sqm_built: dec!(1000),
//!     land_area: dec!(200),
//!     price_per_sqm_land: dec!(500),
//!     ..Default::default()
//! };
//!
//! assert_eq!(input.estimate(), dec!(200000));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calculations::itbi::{ItbiError, TaxCalculationInput, calculate, checked_calculate};

/// Inputs of the venal value estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenalEstimateInput {
    /// Constructed area in m².
    pub built_area: Decimal,

    /// Reference price per m² of construction.
    pub price_per_sqm_built: Decimal,

    /// Land area in m².
    pub land_area: Decimal,

    /// Reference price per m² of land.
    pub price_per_sqm_land: Decimal,

    /// Multiplier applied to the sum (e.g. 0.95, 1.1). Defaults to 1.
    #[serde(default = "default_correction_factor")]
    pub correction_factor: Decimal,
}

fn default_correction_factor() -> Decimal {
    Decimal::ONE
}

impl Default for VenalEstimateInput {
    fn default() -> Self {
        Self {
            built_area: Decimal::ZERO,
            price_per_sqm_built: Decimal::ZERO,
            land_area: Decimal::ZERO,
            price_per_sqm_land: Decimal::ZERO,
            correction_factor: default_correction_factor(),
        }
    }
}

impl VenalEstimateInput {
    pub fn estimate(&self) -> Decimal {
        estimate_assessed_value(
            self.built_area,
            self.price_per_sqm_built,
            self.land_area,
            self.price_per_sqm_land,
            self.correction_factor,
        )
    }
}

/// Result of estimating the venal value and taxing the transfer with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenalItbiResult {
    pub assessed_value: Decimal,
    pub taxable_base: Decimal,
    pub tax_amount: Decimal,
}

/// The estimate, or `None` when any step leaves the `Decimal` range.
pub fn checked_estimate_assessed_value(
    built_area: Decimal,
    price_per_sqm_built: Decimal,
    land_area: Decimal,
    price_per_sqm_land: Decimal,
    correction_factor: Decimal,
) -> Option<Decimal> {
    let built_value = built_area.checked_mul(price_per_sqm_built)?;
    let land_value = land_area.checked_mul(price_per_sqm_land)?;
    built_value
        .checked_add(land_value)?
        .checked_mul(correction_factor)
}

/// Saturates at the `Decimal` bounds when the estimate overflows.
pub fn estimate_assessed_value(
    built_area: Decimal,
    price_per_sqm_built: Decimal,
    land_area: Decimal,
    price_per_sqm_land: Decimal,
    correction_factor: Decimal,
) -> Decimal {
    checked_estimate_assessed_value(
        built_area,
        price_per_sqm_built,
        land_area,
        price_per_sqm_land,
        correction_factor,
    )
    .unwrap_or_else(|| {
        warn!(%built_area, %land_area, "venal estimate overflowed, saturating");
        built_area
            .saturating_mul(price_per_sqm_built)
            .saturating_add(land_area.saturating_mul(price_per_sqm_land))
            .saturating_mul(correction_factor)
    })
}

/// Estimates the venal value, then computes the ITBI against `transaction_value`.
pub fn estimate_and_compute(
    venal: &VenalEstimateInput,
    transaction_value: Decimal,
    rate_percent: Decimal,
) -> VenalItbiResult {
    let assessed_value = venal.estimate();
    let result = calculate(&TaxCalculationInput {
        transaction_value,
        assessed_value,
        rate: rate_percent,
    });

    VenalItbiResult {
        assessed_value,
        taxable_base: result.taxable_base,
        tax_amount: result.tax_amount,
    }
}

/// [`estimate_and_compute`] without saturation.
///
/// # Errors
///
/// [`ItbiError::Overflow`] when the estimate or the tax does not fit in a
/// `Decimal`.
pub fn try_estimate_and_compute(
    venal: &VenalEstimateInput,
    transaction_value: Decimal,
    rate_percent: Decimal,
) -> Result<VenalItbiResult, ItbiError> {
    let assessed_value = checked_estimate_assessed_value(
        venal.built_area,
        venal.price_per_sqm_built,
        venal.land_area,
        venal.price_per_sqm_land,
        venal.correction_factor,
    )
    .ok_or(ItbiError::Overflow)?;
    let result = checked_calculate(&TaxCalculationInput {
        transaction_value,
        assessed_value,
        rate: rate_percent,
    })?;

    Ok(VenalItbiResult {
        assessed_value,
        taxable_base: result.taxable_base,
        tax_amount: result.tax_amount,
    })
}
