use std::io::Read;

use itbi_core::{PropertyForm, PropertyRepository, RepositoryError, ValidationErrors};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when importing property records.
#[derive(Debug, Error)]
pub enum PropertyLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    /// `row` is 1-based, not counting the header.
    #[error("invalid property on row {row}: {source}")]
    InvalidRecord {
        row: usize,
        #[source]
        source: ValidationErrors,
    },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for PropertyLoaderError {
    fn from(err: csv::Error) -> Self {
        PropertyLoaderError::CsvParse(err.to_string())
    }
}

/// A single record from a property CSV file.
///
/// Columns are matched by header name:
/// `property_type,address,neighborhood,city,state,area,owner,cpf`.
/// Values are kept as text and go through the same validation as the
/// interactive form, so `area` may be written `85,5` or `1.200`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PropertyCsvRecord {
    pub property_type: String,
    pub address: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub area: String,
    pub owner: String,
    pub cpf: String,
}

impl From<&PropertyCsvRecord> for PropertyForm {
    fn from(record: &PropertyCsvRecord) -> Self {
        PropertyForm {
            property_type: record.property_type.clone(),
            address: record.address.clone(),
            neighborhood: record.neighborhood.clone(),
            city: record.city.clone(),
            state: record.state.clone(),
            area: record.area.clone(),
            owner: record.owner.clone(),
            cpf: record.cpf.clone(),
        }
    }
}

/// Bulk import of property records through any [`PropertyRepository`].
pub struct PropertyLoader;

impl PropertyLoader {
    /// Parse property records from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<PropertyCsvRecord>, PropertyLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: PropertyCsvRecord = result?;
            records.push(record);
        }

        debug!(count = records.len(), "parsed property records");
        Ok(records)
    }

    /// Validate every record, then insert them all in one batch.
    ///
    /// Nothing is written when any record is invalid; the error names the
    /// first offending row. A repository failure during the insert leaves
    /// nothing behind on backends that override
    /// [`PropertyRepository::create_properties`] with a transaction.
    /// Returns the number of properties inserted.
    pub async fn load<R: PropertyRepository + ?Sized>(
        repo: &R,
        records: &[PropertyCsvRecord],
    ) -> Result<usize, PropertyLoaderError> {
        let properties = records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                PropertyForm::from(record)
                    .validate()
                    .map_err(|source| PropertyLoaderError::InvalidRecord { row: i + 1, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let inserted = repo.create_properties(properties).await?.len();

        info!(inserted, "property import complete");
        Ok(inserted)
    }
}
