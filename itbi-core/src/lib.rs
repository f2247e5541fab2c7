pub mod calculations;
pub mod db;
pub mod models;

pub use db::repository::{PropertyRepository, RepositoryError};
pub use models::*;
