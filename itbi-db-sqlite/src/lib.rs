//! SQLite storage for the property register.

mod decimal;
mod factory;
mod repository;

pub use decimal::{decimal_to_text, get_decimal};
pub use factory::{SqliteRepositoryFactory, sqlite_url};
pub use repository::SqliteRepository;
