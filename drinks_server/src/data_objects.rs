use drinks_engine::db_types::RecipeId;
use serde::{Deserialize, Serialize};

/// Successful responses that carry recipes, in whichever projection the route exposes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrinksResponse<T> {
    pub success: bool,
    pub drinks: Vec<T>,
}

impl<T> DrinksResponse<T> {
    pub fn new(drinks: Vec<T>) -> Self {
        Self { success: true, drinks }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub delete: RecipeId,
}

impl DeleteResponse {
    pub fn new(id: RecipeId) -> Self {
        Self { success: true, delete: id }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub success: bool,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self { success: true }
    }
}
