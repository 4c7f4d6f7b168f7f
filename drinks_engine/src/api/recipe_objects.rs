//! Unvalidated recipe payloads, as they arrive from clients, and the rules that turn them into storable values.
use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::{
    api::errors::RecipeApiError,
    db_types::{Ingredient, NewRecipe, RecipeUpdate},
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientDraft {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub parts: Option<Number>,
}

impl IngredientDraft {
    pub fn new<S: Into<String>, P: Into<Number>>(name: S, color: S, parts: P) -> Self {
        Self { name: Some(name.into()), color: Some(color.into()), parts: Some(parts.into()) }
    }
}

/// A recipe body as submitted for creation or update. The legacy `recipe` key is accepted for the ingredient list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDraft {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "recipe")]
    pub ingredients: Option<Vec<IngredientDraft>>,
}

impl RecipeDraft {
    /// Both a title and a non-empty, complete ingredient list are required to create a recipe.
    pub fn into_new_recipe(self) -> Result<NewRecipe, RecipeApiError> {
        let title = self.title.ok_or_else(|| RecipeApiError::ValidationError("A title is required".into()))?;
        let title = validate_title(title)?;
        let drafts = self
            .ingredients
            .ok_or_else(|| RecipeApiError::ValidationError("An ingredient list is required".into()))?;
        let ingredients = validate_ingredients(drafts)?;
        Ok(NewRecipe { title, ingredients })
    }

    /// Any supplied field is validated exactly as it would be for creation. Missing fields are left alone.
    pub fn into_update(self) -> Result<RecipeUpdate, RecipeApiError> {
        let title = self.title.map(validate_title).transpose()?;
        let ingredients = self.ingredients.map(validate_ingredients).transpose()?;
        Ok(RecipeUpdate { title, ingredients })
    }
}

fn validate_title(title: String) -> Result<String, RecipeApiError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(RecipeApiError::ValidationError("The title cannot be empty".into()));
    }
    Ok(title.to_string())
}

fn validate_ingredients(drafts: Vec<IngredientDraft>) -> Result<Vec<Ingredient>, RecipeApiError> {
    if drafts.is_empty() {
        return Err(RecipeApiError::ValidationError("A recipe needs at least one ingredient".into()));
    }
    drafts.into_iter().enumerate().map(|(i, draft)| validate_ingredient(i, draft)).collect()
}

fn validate_ingredient(index: usize, draft: IngredientDraft) -> Result<Ingredient, RecipeApiError> {
    let incomplete = |field: &str| RecipeApiError::ValidationError(format!("Ingredient #{index} is missing `{field}`"));
    let name = draft.name.filter(|s| !s.trim().is_empty()).ok_or_else(|| incomplete("name"))?;
    let color = draft.color.filter(|s| !s.trim().is_empty()).ok_or_else(|| incomplete("color"))?;
    let parts = draft.parts.ok_or_else(|| incomplete("parts"))?;
    if !is_positive(&parts) {
        return Err(RecipeApiError::ValidationError(format!(
            "Ingredient #{index} must have a positive number of `parts`, not {parts}"
        )));
    }
    Ok(Ingredient { name, color, parts })
}

/// JSON numbers are always finite, so only the sign needs checking.
fn is_positive(n: &Number) -> bool {
    n.as_f64().is_some_and(|p| p > 0.0)
}
