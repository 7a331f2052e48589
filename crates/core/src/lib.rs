//! # Clinic Core
//!
//! Core business logic for the clinic booking platform.
//!
//! This crate contains the data operations and their storage:
//! - A file-backed document store with atomic per-document updates (`store`)
//! - Clinic aggregates with embedded branches, doctors, services, categories and admins
//! - The booking lifecycle
//! - Patient sign-in (phone and Google) and profiles
//! - Password hashing, bearer tokens and the authenticated principal (`identity`)
//!
//! **No HTTP concerns**: routing, extractors and the response envelope belong in `api-rest`.
//! Configuration is resolved once by the binaries and handed in as an `Arc<CoreConfig>`.

pub mod config;
pub mod constants;
pub mod error;
pub mod identity;
pub mod models;
pub mod repositories;
pub mod store;
pub mod validation;

pub use clinic_uuid::DocumentId;
pub use config::{core_config_from_env, CoreConfig};
pub use error::{CoreError, CoreResult, FieldErrors};
pub use identity::{GoogleIdentity, GoogleTokenVerifier, Principal, TokenService};
pub use repositories::{
    BookingService, ClinicService, DoctorLogin, PatientService, PlatformAdminService, StaffLogin,
};
pub use store::{Collection, Document, DocumentStore};
