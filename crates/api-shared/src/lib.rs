//! # API Shared
//!
//! Shared request/response definitions for the clinic booking platform.
//!
//! Contains:
//! - The JSON response envelope (`envelope` module)
//! - Wire DTOs for every endpoint (`dto` module), deriving `utoipa::ToSchema`
//! - Role names and bearer-header parsing (`auth` module)
//! - The `HealthService`
//!
//! Used by `clinic-core` (which maps stored documents to these views) and `api-rest`.

pub mod auth;
pub mod dto;
pub mod envelope;
pub mod health;

pub use auth::Role;
pub use dto::*;
pub use envelope::{ApiEnvelope, ErrorCode};
pub use health::{HealthRes, HealthService};
