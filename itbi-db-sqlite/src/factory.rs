use async_trait::async_trait;

use itbi_core::db::{DbConfig, PropertyRepository, RepositoryError, RepositoryFactory};

use crate::repository::SqliteRepository;

/// Turns a user-facing connection string into a sqlx SQLite URL.
///
/// * `:memory:` → `sqlite::memory:`
/// * anything already starting with `sqlite:` is used as is
/// * a bare path → `sqlite:<path>?mode=rwc` (file created when missing)
pub fn sqlite_url(connection_string: &str) -> String {
    let trimmed = connection_string.trim();
    if trimmed == ":memory:" {
        "sqlite::memory:".to_string()
    } else if trimmed.starts_with("sqlite:") {
        trimmed.to_string()
    } else {
        format!("sqlite:{trimmed}?mode=rwc")
    }
}

/// [`RepositoryFactory`] for SQLite.
///
/// ```rust,no_run
/// use itbi_core::db::RepositoryRegistry;
/// use itbi_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Opens the database and brings its schema up to date.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn PropertyRepository>, RepositoryError> {
        let repo = SqliteRepository::new(&sqlite_url(&config.connection_string)).await?;
        repo.run_migrations().await?;
        Ok(Box::new(repo))
    }
}
