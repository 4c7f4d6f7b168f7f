//! # Drinks server
//! This crate hosts the HTTP server for the drinks recipe catalog. It is responsible for:
//! Authorizing requests with bearer tokens issued by an external identity provider.
//! Mapping each route onto the recipe API in [`drinks_engine`].
//! Shaping JSON responses, including errors.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `GET /health`: A health check route that returns a 200 OK response with `{"success":true}`.
//! * `GET /drinks`: Public recipe summaries.
//! * `GET /drinks-detail`: Full recipes. Requires `get:drinks-detail`.
//! * `POST /drinks`: Create a recipe. Requires `post:drinks`.
//! * `PATCH /drinks/{id}`: Update a recipe. Requires `patch:drinks`.
//! * `DELETE /drinks/{id}`: Delete a recipe. Requires `delete:drinks`.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod jwks;
pub mod middleware;
pub mod routes;
pub mod server;
