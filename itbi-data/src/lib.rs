//! Bulk import of property records.

mod loader;

pub use loader::{PropertyCsvRecord, PropertyLoader, PropertyLoaderError};
