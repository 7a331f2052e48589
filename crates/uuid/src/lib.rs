//! Document identifiers and sharded-path utilities.
//!
//! Every document in the platform (clinics, bookings, patients, platform administrators) and
//! every embedded child of a clinic (branches, doctors, services, categories, owners) is
//! identified by a [`DocumentId`].
//!
//! A `DocumentId` uses a *canonical* representation: **32 lowercase hexadecimal characters**
//! (no hyphens), e.g. `550e8400e29b41d4a716446655440000`. This is the value produced by
//! `Uuid::new_v4().simple().to_string()`.
//!
//! Identifiers supplied from outside (path parameters, request bodies) must already be in
//! canonical form. Use [`DocumentId::parse`] to validate them.
//!
//! ## Sharded directory layout
//! For a canonical id `u`, the document store keeps the document under:
//! `collection_dir/<u[0..2]>/<u[2..4]>/<u>.json`
//!
//! This keeps directory fan-out bounded as collections grow.

mod service;

pub use service::{DocumentId, Uuid};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
