//! Constants used throughout the core crate.

use api_shared::PlanLimits;

/// Default directory for document storage when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "clinic_data";

/// Collection directory names. These are part of the storage contract.
pub const PLATFORM_ADMINS_COLLECTION: &str = "platform_admins";
pub const CLINICS_COLLECTION: &str = "clinics";
pub const PATIENTS_COLLECTION: &str = "patients";
pub const BOOKINGS_COLLECTION: &str = "bookings";

/// Fixed issuer written into and required from every token.
pub const TOKEN_ISSUER: &str = "clinic-booking-platform";

/// Default token lifetime.
pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 7;

/// Default bcrypt cost factor.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Minimum accepted length for any secret used to sign tokens.
pub const MIN_JWT_SECRET_LEN: usize = 16;

/// Permissions granted to every platform administrator.
pub const PLATFORM_ADMIN_PERMISSIONS: &[&str] = &[
    "clinics:read",
    "clinics:create",
    "clinics:update",
    "clinics:delete",
    "plans:update",
];

pub const STARTER_LIMITS: PlanLimits = PlanLimits {
    max_branches: 1,
    max_services: 5,
    max_admins: 1,
};

pub const PRO_LIMITS: PlanLimits = PlanLimits {
    max_branches: 10,
    max_services: 50,
    max_admins: 10,
};

/// Google's published signing keys for ID tokens.
pub const GOOGLE_CERTS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";

/// Issuers accepted on Google ID tokens.
pub const GOOGLE_ISSUERS: &[&str] = &["accounts.google.com", "https://accounts.google.com"];

/// How long a fetched Google key set is reused before refetching.
pub const GOOGLE_KEYS_TTL_SECS: i64 = 3600;

/// Attempts made by the clinic booking-counter writer before giving up.
pub const COUNTER_WRITE_ATTEMPTS: usize = 3;
