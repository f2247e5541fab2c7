//! ITBI calculation modules.
//!
//! Everything here is a pure function of its inputs: parsing form strings,
//! estimating the venal value and computing the tax.

pub mod common;
pub mod itbi;
pub mod money;
pub mod venal;

pub use itbi::{
    ItbiCalculator, ItbiError, ItbiInput, ItbiResult, TaxCalculationInput, TaxCalculationResult,
    calculate, checked_calculate, checked_compute_tax, compute_tax, compute_tax_permissive,
    compute_tax_strict, select_taxable_base,
};
pub use money::{
    EntryMode, format_brl, format_cents_entry, format_percent, parse_cents_entry,
    parse_locale_number,
};
pub use venal::{
    VenalEstimateInput, VenalItbiResult, checked_estimate_assessed_value, estimate_and_compute,
    estimate_assessed_value, try_estimate_and_compute,
};
