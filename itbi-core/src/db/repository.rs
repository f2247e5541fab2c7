use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewProperty, Property, StateCode};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Storage for the property register.
#[async_trait]
pub trait PropertyRepository: Send + Sync {
    async fn create_property(
        &self,
        property: NewProperty,
    ) -> Result<Property, RepositoryError>;

    /// Inserts every record, stopping at the first failure.
    ///
    /// Backends with transactions override this to insert all or none;
    /// this default keeps the records inserted before the failure.
    async fn create_properties(
        &self,
        properties: Vec<NewProperty>,
    ) -> Result<Vec<Property>, RepositoryError> {
        let mut created = Vec::with_capacity(properties.len());
        for property in properties {
            created.push(self.create_property(property).await?);
        }
        Ok(created)
    }

    async fn get_property(
        &self,
        id: i64,
    ) -> Result<Property, RepositoryError>;

    /// Overwrites the stored record with the same id and bumps `updated_at`.
    async fn update_property(
        &self,
        property: &Property,
    ) -> Result<(), RepositoryError>;

    async fn delete_property(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError>;

    /// All properties ordered by id, optionally restricted to one state.
    async fn list_properties(
        &self,
        state: Option<StateCode>,
    ) -> Result<Vec<Property>, RepositoryError>;
}
