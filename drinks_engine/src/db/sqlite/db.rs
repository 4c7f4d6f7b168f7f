use std::fmt::Debug;

use log::*;
use sqlx::{migrate, SqlitePool};

use super::{db_url, new_pool, recipes, SqliteDatabaseError};
use crate::{
    api::errors::RecipeApiError,
    db_types::{Ingredient, NewRecipe, Recipe, RecipeId, RecipeUpdate},
    traits::RecipeManagement,
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SqliteDatabase ({})", self.url)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL in `DRINKS_DATABASE_URL`, or the default.
    pub async fn new(max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        trace!("Creating new database connection pool for {url}");
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date. Safe to call on every startup.
    pub async fn migrate(&self) -> Result<(), SqliteDatabaseError> {
        migrate!("./src/db/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    /// Deletes every recipe and stores the single seed recipe, `water`. This is destructive and irreversible.
    pub async fn reset_with_seed(&self) -> Result<Recipe, SqliteDatabaseError> {
        let mut tx = self.pool.begin().await?;
        let removed = recipes::delete_all(&mut tx).await?;
        warn!("🗃️ Database reset. {removed} recipes were deleted.");
        let seed = NewRecipe::new("water", vec![Ingredient::new("water", "blue", 1)]);
        let recipe = recipes::insert(seed, &mut tx).await?;
        tx.commit().await?;
        Ok(recipe)
    }
}

/// Title uniqueness is left to the `UNIQUE` column, so violations surface as [`RecipeApiError::DuplicateTitle`].
///
/// Every mutating transaction below must open with its write, so that it waits on the busy timeout for the write lock.
/// A transaction that reads first and then writes gets `SQLITE_BUSY` at once under contention.
fn title_conflict_or(e: SqliteDatabaseError, title: &str) -> RecipeApiError {
    match &e {
        SqliteDatabaseError::DriverError(sqlx::Error::Database(de)) if de.is_unique_violation() => {
            RecipeApiError::DuplicateTitle(title.to_string())
        },
        _ => e.into(),
    }
}

impl RecipeManagement for SqliteDatabase {
    async fn fetch_recipes(&self) -> Result<Vec<Recipe>, RecipeApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(recipes::fetch_all(&mut conn).await?)
    }

    async fn fetch_recipe(&self, id: RecipeId) -> Result<Option<Recipe>, RecipeApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(recipes::fetch_by_id(id, &mut conn).await?)
    }

    async fn insert_recipe(&self, recipe: NewRecipe) -> Result<Recipe, RecipeApiError> {
        let title = recipe.title.clone();
        let mut tx = self.pool.begin().await?;
        let recipe = recipes::insert(recipe, &mut tx).await.map_err(|e| {
            let e = title_conflict_or(e, &title);
            debug!("🗃️ Could not insert recipe '{title}'. {e}");
            e
        })?;
        tx.commit().await?;
        Ok(recipe)
    }

    async fn update_recipe(&self, id: RecipeId, update: RecipeUpdate) -> Result<Recipe, RecipeApiError> {
        let title = update.title.clone().unwrap_or_default();
        let mut tx = self.pool.begin().await?;
        let affected = recipes::update(id, &update, &mut tx).await.map_err(|e| title_conflict_or(e, &title))?;
        match affected {
            0 => return Err(RecipeApiError::RecipeNotFound(id)),
            1 => {},
            n => {
                error!("🗃️ Updating recipe #{id} affected {n} rows. Rolling back.");
                return Err(RecipeApiError::DatabaseError(format!("Update of recipe #{id} affected {n} rows")));
            },
        }
        let recipe = recipes::fetch_by_id(id, &mut tx).await?.ok_or(RecipeApiError::RecipeNotFound(id))?;
        tx.commit().await?;
        debug!("🗃️ Recipe #{id} updated");
        Ok(recipe)
    }

    async fn delete_recipe(&self, id: RecipeId) -> Result<(), RecipeApiError> {
        let mut tx = self.pool.begin().await?;
        match recipes::delete(id, &mut tx).await? {
            0 => Err(RecipeApiError::RecipeNotFound(id)),
            1 => {
                tx.commit().await?;
                debug!("🗃️ Recipe #{id} deleted");
                Ok(())
            },
            n => {
                error!("🗃️ Deleting recipe #{id} affected {n} rows. Rolling back.");
                Err(RecipeApiError::DatabaseError(format!("Delete of recipe #{id} affected {n} rows")))
            },
        }
    }
}
