//! Services over the document store.
//!
//! Each service holds the shared configuration and store handles and exposes the operations
//! for one area: clinic aggregates, bookings, patient identity and platform administrators.

pub mod admins;
pub mod bookings;
pub mod clinic;
pub mod patients;
pub(crate) mod shared;

pub use admins::PlatformAdminService;
pub use bookings::BookingService;
pub use clinic::{ClinicService, DoctorLogin, StaffLogin};
pub use patients::PatientService;
