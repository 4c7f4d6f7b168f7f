use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{Ingredient, NewRecipe, Recipe, RecipeId, RecipeRow, RecipeUpdate},
};

fn into_recipe(row: RecipeRow) -> Result<Recipe, SqliteDatabaseError> {
    let id = row.id;
    Recipe::try_from(row).map_err(|e| SqliteDatabaseError::CorruptRecipe(id, e.to_string()))
}

fn serialize_ingredients(ingredients: &[Ingredient]) -> Result<String, SqliteDatabaseError> {
    Ok(serde_json::to_string(ingredients)?)
}

pub async fn fetch_all(conn: &mut SqliteConnection) -> Result<Vec<Recipe>, SqliteDatabaseError> {
    let rows = sqlx::query_as::<_, RecipeRow>("SELECT id, title, recipe FROM drinks ORDER BY id")
        .fetch_all(conn)
        .await?;
    trace!("🗃️ Fetched {} recipes", rows.len());
    rows.into_iter().map(into_recipe).collect()
}

pub async fn fetch_by_id(id: RecipeId, conn: &mut SqliteConnection) -> Result<Option<Recipe>, SqliteDatabaseError> {
    let row = sqlx::query_as::<_, RecipeRow>("SELECT id, title, recipe FROM drinks WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    row.map(into_recipe).transpose()
}

/// Inserts the recipe. The first statement is the write itself, so a transaction that starts with this call takes the
/// write lock immediately. A taken title surfaces as a unique-constraint violation from the driver.
pub async fn insert(recipe: NewRecipe, conn: &mut SqliteConnection) -> Result<Recipe, SqliteDatabaseError> {
    let blob = serialize_ingredients(&recipe.ingredients)?;
    let id = sqlx::query_scalar::<_, i64>("INSERT INTO drinks (title, recipe) VALUES ($1, $2) RETURNING id")
        .bind(&recipe.title)
        .bind(blob)
        .fetch_one(conn)
        .await?;
    debug!("🗃️ Recipe '{}' saved with id {id}", recipe.title);
    let NewRecipe { title, ingredients } = recipe;
    Ok(Recipe { id: RecipeId(id), title, ingredients })
}

/// Writes the supplied fields of `update` to the recipe. Returns the number of rows affected, which is zero if `id`
/// does not exist. Renaming to a title owned by another recipe is a unique-constraint violation.
pub async fn update(
    id: RecipeId,
    update: &RecipeUpdate,
    conn: &mut SqliteConnection,
) -> Result<u64, SqliteDatabaseError> {
    let blob = update.ingredients.as_deref().map(serialize_ingredients).transpose()?;
    let result = sqlx::query(
        "UPDATE drinks SET title = COALESCE($1, title), recipe = COALESCE($2, recipe) WHERE id = $3",
    )
    .bind(update.title.as_deref())
    .bind(blob)
    .bind(id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete(id: RecipeId, conn: &mut SqliteConnection) -> Result<u64, SqliteDatabaseError> {
    let result = sqlx::query("DELETE FROM drinks WHERE id = $1").bind(id).execute(conn).await?;
    Ok(result.rows_affected())
}

pub async fn delete_all(conn: &mut SqliteConnection) -> Result<u64, SqliteDatabaseError> {
    let result = sqlx::query("DELETE FROM drinks").execute(conn).await?;
    Ok(result.rows_affected())
}
