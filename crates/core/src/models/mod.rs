//! Stored documents.
//!
//! Field names are camelCase and ids are stored under `_id`, matching the wire views so that
//! a document read straight from disk is recognisable to API clients.

pub mod admin;
pub mod booking;
pub mod clinic;
pub mod patient;

pub use admin::PlatformAdmin;
pub use booking::{Booking, Cancellation};
pub use clinic::{limits_for, Branch, Category, Clinic, ClinicOwner, Doctor, Service};
pub use patient::{Patient, PatientAuth};
