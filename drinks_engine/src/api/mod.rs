//! The public-facing recipe API.
//!
//! Callers never talk to a storage backend directly. [`RecipeApi`] wraps any [`crate::RecipeManagement`]
//! implementation and guarantees that incoming drafts are validated before the backend is touched.
pub mod errors;
pub mod recipe_api;
pub mod recipe_objects;
