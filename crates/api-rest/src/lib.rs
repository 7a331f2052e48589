//! # API REST
//!
//! REST API for the clinic booking platform.
//!
//! Handles:
//! - HTTP endpoints with axum, one module per principal
//! - Bearer-token extraction into typed principals
//! - Mapping core errors onto the JSON envelope
//! - OpenAPI/Swagger documentation
//!
//! Uses `api-shared` for wire types and `clinic-core` for all business rules.

#![warn(rust_2018_idioms)]

pub mod docs;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

#[cfg(test)]
mod tests;

pub use docs::ApiDoc;
pub use routes::router;
pub use state::AppState;
