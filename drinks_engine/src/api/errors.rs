use thiserror::Error;

use crate::db_types::RecipeId;

#[derive(Debug, Clone, Error)]
pub enum RecipeApiError {
    #[error("Invalid recipe. {0}")]
    ValidationError(String),
    #[error("Recipe #{0} does not exist")]
    RecipeNotFound(RecipeId),
    #[error("A recipe titled '{0}' already exists")]
    DuplicateTitle(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for RecipeApiError {
    fn from(e: sqlx::Error) -> Self {
        RecipeApiError::DatabaseError(e.to_string())
    }
}
