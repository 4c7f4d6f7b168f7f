//! Drinks Engine
//!
//! The storage and domain layer of the drinks recipe service. It is transport-agnostic: nothing in here knows about
//! HTTP or authorization.
//!
//! The library is divided into two main sections:
//! 1. Database management and control ([`mod@db`]). SQLite is the supported backend. You should never need to access
//!    the database directly. Instead, use [`RecipeApi`]. The exception is the data types used in the database. These
//!    are defined in the `db_types` module and are public.
//! 2. The recipe API ([`mod@api`]). This validates incoming recipe drafts and forwards them to a backend. Backends need
//!    to implement [`RecipeManagement`] in order to be usable by the server.
//!
//! Two projections of a recipe are available. [`db_types::RecipeSummary`] omits ingredient names and is meant for
//! anonymous callers. [`db_types::Recipe`] serializes to the full detail view.
mod db;

pub mod api;
pub mod db_types;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use api::{errors::RecipeApiError, recipe_api::RecipeApi, recipe_objects};
#[cfg(feature = "sqlite")]
pub use db::sqlite::{db::SqliteDatabase, SqliteDatabaseError};
pub use db::traits;
pub use traits::RecipeManagement;
