use std::fmt::Display;

use serde::{Deserialize, Serialize};
use serde_json::Number;
use sqlx::FromRow;

//--------------------------------------     RecipeId       ----------------------------------------------------------
/// The store-assigned identifier of a recipe. Immutable once assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct RecipeId(pub i64);

impl Display for RecipeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RecipeId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

//--------------------------------------     Ingredient       --------------------------------------------------------
/// A single, complete ingredient entry. Every field is guaranteed to be present and non-empty once constructed via
/// validation (see [`crate::recipe_objects`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub color: String,
    /// A positive quantity. Fractions are allowed, and the number keeps the form it was submitted in (`2` stays `2`).
    pub parts: Number,
}

impl Ingredient {
    pub fn new<S: Into<String>, P: Into<Number>>(name: S, color: S, parts: P) -> Self {
        Self { name: name.into(), color: color.into(), parts: parts.into() }
    }

    pub fn summary(&self) -> IngredientSummary {
        IngredientSummary { color: self.color.clone(), parts: self.parts.clone() }
    }
}

/// The anonymous view of an ingredient. It reveals the composition of a drink, but not what goes into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientSummary {
    pub color: String,
    pub parts: Number,
}

//--------------------------------------     Recipe       ------------------------------------------------------------
/// A drink recipe, as stored. Serializing a `Recipe` yields the *detail* projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub title: String,
    pub ingredients: Vec<Ingredient>,
}

impl Recipe {
    /// The summary projection: id, title and each ingredient's color and parts. Ingredient names are dropped.
    pub fn summary(&self) -> RecipeSummary {
        RecipeSummary {
            id: self.id,
            title: self.title.clone(),
            ingredients: self.ingredients.iter().map(Ingredient::summary).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub id: RecipeId,
    pub title: String,
    pub ingredients: Vec<IngredientSummary>,
}

/// A validated recipe that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecipe {
    pub title: String,
    pub ingredients: Vec<Ingredient>,
}

impl NewRecipe {
    pub fn new<S: Into<String>>(title: S, ingredients: Vec<Ingredient>) -> Self {
        Self { title: title.into(), ingredients }
    }
}

/// A validated partial update. `None` fields are left untouched; the ingredient list is always replaced wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeUpdate {
    pub title: Option<String>,
    pub ingredients: Option<Vec<Ingredient>>,
}

impl RecipeUpdate {
    pub fn with_title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_ingredients(mut self, ingredients: Vec<Ingredient>) -> Self {
        self.ingredients = Some(ingredients);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.ingredients.is_none()
    }
}

//--------------------------------------     RecipeRow       ---------------------------------------------------------
/// The raw database representation of a recipe. The ingredient list is held as a JSON blob.
#[derive(Debug, Clone, FromRow)]
pub struct RecipeRow {
    pub id: i64,
    pub title: String,
    pub recipe: String,
}

impl TryFrom<RecipeRow> for Recipe {
    type Error = serde_json::Error;

    fn try_from(row: RecipeRow) -> Result<Self, Self::Error> {
        let ingredients = serde_json::from_str(&row.recipe)?;
        Ok(Self { id: RecipeId(row.id), title: row.title, ingredients })
    }
}
