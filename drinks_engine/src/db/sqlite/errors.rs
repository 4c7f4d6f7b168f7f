use thiserror::Error;

use crate::api::errors::RecipeApiError;

#[derive(Debug, Error)]
pub enum SqliteDatabaseError {
    #[error("Database connection error: {0}")]
    DriverError(#[from] sqlx::Error),
    #[error("Could not run database migrations: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
    #[error("Stored ingredient list for recipe #{0} is corrupt: {1}")]
    CorruptRecipe(i64, String),
    #[error("Could not serialize ingredient list: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<SqliteDatabaseError> for RecipeApiError {
    fn from(e: SqliteDatabaseError) -> Self {
        RecipeApiError::DatabaseError(e.to_string())
    }
}
