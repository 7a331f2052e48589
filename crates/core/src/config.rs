//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup (see the `*_from_env_value` helpers) and
//! then passed into core services through an `Arc<CoreConfig>`. Nothing in request handling
//! reads process environment variables.

use crate::constants::{
    DEFAULT_BCRYPT_COST, DEFAULT_DATA_DIR, DEFAULT_TOKEN_TTL_DAYS, MIN_JWT_SECRET_LEN,
};
use crate::{CoreError, CoreResult};
use chrono::{Duration, FixedOffset, Offset, Utc};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    jwt_secret: String,
    patient_jwt_secret: String,
    token_ttl: Duration,
    bcrypt_cost: u32,
    google_client_id: Option<String>,
    plan_limits_enforced: bool,
    booking_utc_offset: FixedOffset,
}

impl CoreConfig {
    /// Create a new `CoreConfig` with default TTL, bcrypt cost, enforced plan limits, UTC
    /// booking times and Google sign-in disabled.
    ///
    /// `patient_jwt_secret` signs patient tokens; when `None` the staff secret is reused.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] if a secret is shorter than
    /// [`MIN_JWT_SECRET_LEN`].
    pub fn new(
        data_dir: PathBuf,
        jwt_secret: String,
        patient_jwt_secret: Option<String>,
    ) -> CoreResult<Self> {
        let patient_jwt_secret = patient_jwt_secret.unwrap_or_else(|| jwt_secret.clone());
        for (name, secret) in [
            ("JWT_SECRET", &jwt_secret),
            ("PATIENT_JWT_SECRET", &patient_jwt_secret),
        ] {
            if secret.trim().len() < MIN_JWT_SECRET_LEN {
                return Err(CoreError::InvalidConfig(format!(
                    "{name} must be at least {MIN_JWT_SECRET_LEN} characters"
                )));
            }
        }

        Ok(Self {
            data_dir,
            jwt_secret,
            patient_jwt_secret,
            token_ttl: Duration::days(DEFAULT_TOKEN_TTL_DAYS),
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            google_client_id: None,
            plan_limits_enforced: true,
            booking_utc_offset: utc(),
        })
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    pub fn with_google_client_id(mut self, client_id: Option<String>) -> Self {
        self.google_client_id = client_id.filter(|id| !id.trim().is_empty());
        self
    }

    pub fn with_plan_limits_enforced(mut self, enforced: bool) -> Self {
        self.plan_limits_enforced = enforced;
        self
    }

    pub fn with_booking_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.booking_utc_offset = offset;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    pub fn patient_jwt_secret(&self) -> &str {
        &self.patient_jwt_secret
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    pub fn bcrypt_cost(&self) -> u32 {
        self.bcrypt_cost
    }

    pub fn google_client_id(&self) -> Option<&str> {
        self.google_client_id.as_deref()
    }

    pub fn plan_limits_enforced(&self) -> bool {
        self.plan_limits_enforced
    }

    pub fn booking_utc_offset(&self) -> FixedOffset {
        self.booking_utc_offset
    }
}

/// Resolve the full configuration from process environment variables.
///
/// Only binaries call this, once, before any service is built. `JWT_SECRET` is required;
/// everything else has a default.
pub fn core_config_from_env() -> CoreResult<CoreConfig> {
    let var = |name: &str| std::env::var(name).ok();

    let data_dir = non_blank(var("CLINIC_DATA_DIR")).unwrap_or_else(|| DEFAULT_DATA_DIR.into());
    let jwt_secret = non_blank(var("JWT_SECRET"))
        .ok_or_else(|| CoreError::InvalidConfig("JWT_SECRET must be set".into()))?;

    Ok(
        CoreConfig::new(PathBuf::from(data_dir), jwt_secret, non_blank(var("PATIENT_JWT_SECRET")))?
            .with_token_ttl(token_ttl_from_env_value(var("JWT_EXPIRES_IN_DAYS"))?)
            .with_bcrypt_cost(bcrypt_cost_from_env_value(var("BCRYPT_COST"))?)
            .with_google_client_id(var("GOOGLE_CLIENT_ID"))
            .with_plan_limits_enforced(bool_from_env_value(
                "PLAN_LIMITS_ENFORCED",
                var("PLAN_LIMITS_ENFORCED"),
                true,
            )?)
            .with_booking_utc_offset(utc_offset_from_env_value(var("BOOKING_UTC_OFFSET"))?),
    )
}

fn utc() -> FixedOffset {
    Utc.fix()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the token lifetime (whole days) from an optional string value.
pub fn token_ttl_from_env_value(value: Option<String>) -> CoreResult<Duration> {
    match non_blank(value) {
        None => Ok(Duration::days(DEFAULT_TOKEN_TTL_DAYS)),
        Some(v) => match v.parse::<i64>() {
            Ok(days) if days > 0 => Ok(Duration::days(days)),
            _ => Err(CoreError::InvalidConfig(format!(
                "JWT_EXPIRES_IN_DAYS must be a positive integer, got '{v}'"
            ))),
        },
    }
}

/// Parse the bcrypt cost factor (4..=31) from an optional string value.
pub fn bcrypt_cost_from_env_value(value: Option<String>) -> CoreResult<u32> {
    match non_blank(value) {
        None => Ok(DEFAULT_BCRYPT_COST),
        Some(v) => match v.parse::<u32>() {
            Ok(cost) if (4..=31).contains(&cost) => Ok(cost),
            _ => Err(CoreError::InvalidConfig(format!(
                "BCRYPT_COST must be between 4 and 31, got '{v}'"
            ))),
        },
    }
}

/// Parse a boolean flag; missing values fall back to `default`.
pub fn bool_from_env_value(name: &str, value: Option<String>, default: bool) -> CoreResult<bool> {
    match non_blank(value).map(|v| v.to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(CoreError::InvalidConfig(format!(
                "{name} must be a boolean, got '{v}'"
            ))),
        },
    }
}

/// Parse a UTC offset such as `+05:00`, `-03:30` or `Z`. Missing values mean UTC.
pub fn utc_offset_from_env_value(value: Option<String>) -> CoreResult<FixedOffset> {
    let Some(v) = non_blank(value) else {
        return Ok(utc());
    };
    if v.eq_ignore_ascii_case("z") || v.eq_ignore_ascii_case("utc") {
        return Ok(utc());
    }
    let invalid = || {
        CoreError::InvalidConfig(format!(
            "BOOKING_UTC_OFFSET must look like +05:00, got '{v}'"
        ))
    };

    let (sign, rest) = match v.as_bytes().first() {
        Some(b'+') => (1, &v[1..]),
        Some(b'-') => (-1, &v[1..]),
        _ => return Err(invalid()),
    };
    let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if hours > 23 || !(0..60).contains(&minutes) {
        return Err(invalid());
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}
