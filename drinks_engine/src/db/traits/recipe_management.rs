use crate::{
    api::errors::RecipeApiError,
    db_types::{NewRecipe, Recipe, RecipeId, RecipeUpdate},
};

/// The `RecipeManagement` trait defines the persistence boundary for drink recipes.
///
/// Every mutating call must be atomic: when an error is returned, the stored state is unchanged.
#[allow(async_fn_in_trait)]
pub trait RecipeManagement {
    /// Fetches every stored recipe, in id order. An empty store yields an empty vector.
    async fn fetch_recipes(&self) -> Result<Vec<Recipe>, RecipeApiError>;

    /// Fetches the recipe with the given id. If no such recipe exists, `None` is returned.
    async fn fetch_recipe(&self, id: RecipeId) -> Result<Option<Recipe>, RecipeApiError>;

    /// Stores a new recipe and returns it with its assigned id.
    ///
    /// Title uniqueness must be enforced atomically: a colliding title returns
    /// [`RecipeApiError::DuplicateTitle`] and nothing is written.
    async fn insert_recipe(&self, recipe: NewRecipe) -> Result<Recipe, RecipeApiError>;

    /// Applies a partial update and returns the updated recipe.
    ///
    /// Fails with [`RecipeApiError::RecipeNotFound`] if `id` does not exist, and with
    /// [`RecipeApiError::DuplicateTitle`] if the new title belongs to a different recipe.
    async fn update_recipe(&self, id: RecipeId, update: RecipeUpdate) -> Result<Recipe, RecipeApiError>;

    /// Permanently removes a recipe. Fails with [`RecipeApiError::RecipeNotFound`] if `id` does not exist.
    async fn delete_recipe(&self, id: RecipeId) -> Result<(), RecipeApiError>;
}
