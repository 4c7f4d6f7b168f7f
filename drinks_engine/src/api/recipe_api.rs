//! Unifies API for managing drink recipes.

use std::fmt::Debug;

use log::{debug, trace};

use crate::{
    api::{errors::RecipeApiError, recipe_objects::RecipeDraft},
    db_types::{Recipe, RecipeId, RecipeSummary},
    traits::RecipeManagement,
};

/// The `RecipeApi` validates client drafts and forwards them to the storage backend.
pub struct RecipeApi<B> {
    db: B,
}

impl<B: Debug> Debug for RecipeApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RecipeApi ({:?})", self.db)
    }
}

impl<B> RecipeApi<B>
where B: RecipeManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    /// All recipes, in the summary projection.
    pub async fn summaries(&self) -> Result<Vec<RecipeSummary>, RecipeApiError> {
        let recipes = self.db.fetch_recipes().await?;
        trace!("Fetched {} recipes for summary view", recipes.len());
        Ok(recipes.iter().map(Recipe::summary).collect())
    }

    /// All recipes, in the detail projection.
    pub async fn recipes(&self) -> Result<Vec<Recipe>, RecipeApiError> {
        self.db.fetch_recipes().await
    }

    pub async fn create(&self, draft: RecipeDraft) -> Result<Recipe, RecipeApiError> {
        let recipe = draft.into_new_recipe()?;
        debug!("Creating recipe '{}' with {} ingredients", recipe.title, recipe.ingredients.len());
        self.db.insert_recipe(recipe).await
    }

    /// Validates the draft, then applies it. A draft with no fields is a no-op that returns the current recipe.
    pub async fn update(&self, id: RecipeId, draft: RecipeDraft) -> Result<Recipe, RecipeApiError> {
        let update = draft.into_update()?;
        if update.is_empty() {
            debug!("Empty update for recipe #{id}. Nothing to do.");
            return self.db.fetch_recipe(id).await?.ok_or(RecipeApiError::RecipeNotFound(id));
        }
        debug!("Updating recipe #{id}");
        self.db.update_recipe(id, update).await
    }

    pub async fn delete(&self, id: RecipeId) -> Result<RecipeId, RecipeApiError> {
        self.db.delete_recipe(id).await?;
        debug!("Recipe #{id} deleted");
        Ok(id)
    }
}
