//! Wire DTOs for the REST API.
//!
//! Request types are deserialised from JSON bodies and query strings; view types are what
//! `clinic-core` produces from stored documents. Optional fields on update requests use
//! [`clinic_types::Patch`] so that "omitted", `null` and a value stay distinguishable.

pub mod auth;
pub mod booking;
pub mod clinic;
pub mod common;
pub mod patient;

pub use auth::*;
pub use booking::*;
pub use clinic::*;
pub use common::*;
pub use patient::*;
