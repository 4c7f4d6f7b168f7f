//! #  Storage backend contracts.
//!
//! Backends implement [`RecipeManagement`] to be usable by [`crate::RecipeApi`]. Backends are expected to take
//! already-validated values ([`crate::db_types::NewRecipe`] and [`crate::db_types::RecipeUpdate`]). Validation is the
//! API layer's job.
mod recipe_management;

pub use recipe_management::RecipeManagement;
