//! Input validation utilities.
//!
//! Validators return `Result<T, String>` (or a [`TextError`]) so they can be fed straight into
//! [`FieldErrors::check`](crate::FieldErrors::check), which collects one message per field.

use crate::{CoreError, CoreResult};
use api_shared::{GeoPoint, Weekday, WorkingDay};
use chrono::{NaiveDate, NaiveTime};
use clinic_types::{NonEmptyText, Patch, TextError};
use clinic_uuid::DocumentId;
use std::collections::HashSet;

const USERNAME_MIN_LEN: usize = 3;
const USERNAME_MAX_LEN: usize = 32;
// bcrypt only looks at the first 72 bytes.
const PASSWORD_MIN_LEN: usize = 6;
const PASSWORD_MAX_LEN: usize = 72;
const MAX_SERVICE_MINUTES: u32 = 24 * 60;
const MAX_AGE: u8 = 130;

/// Trimmed, non-empty text.
pub fn required_text(input: &str) -> Result<String, TextError> {
    NonEmptyText::new(input).map(NonEmptyText::into_string)
}

/// Trims optional text; blank values become `None`.
pub fn optional_text(input: Option<String>) -> Option<String> {
    input
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// [`optional_text`] for partial updates: a value that is blank after trimming clears the
/// field.
pub fn patch_text(patch: Patch<String>) -> Patch<String> {
    match patch {
        Patch::Value(s) => optional_text(Some(s)).into(),
        other => other,
    }
}

/// Login name for clinic staff, doctors and platform admins.
///
/// Stored as typed (trimmed); uniqueness checks compare case-insensitively.
pub fn username(input: &str) -> Result<String, String> {
    let trimmed = input.trim();
    if trimmed.len() < USERNAME_MIN_LEN || trimmed.len() > USERNAME_MAX_LEN {
        return Err(format!(
            "must be between {USERNAME_MIN_LEN} and {USERNAME_MAX_LEN} characters"
        ));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err("may only contain letters, digits, '.', '_' and '-'".into());
    }
    Ok(trimmed.to_string())
}

pub fn password(input: &str) -> Result<(), String> {
    if input.len() < PASSWORD_MIN_LEN {
        return Err(format!("must be at least {PASSWORD_MIN_LEN} characters"));
    }
    if input.len() > PASSWORD_MAX_LEN {
        return Err(format!("must be at most {PASSWORD_MAX_LEN} bytes"));
    }
    Ok(())
}

/// Strict `HH:MM` (24-hour, zero padded).
pub fn time_of_day(input: &str) -> Result<NaiveTime, String> {
    let bytes = input.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return Err("must be a time in HH:MM format".into());
    }
    NaiveTime::parse_from_str(input, "%H:%M").map_err(|_| "must be a time in HH:MM format".into())
}

/// Strict `YYYY-MM-DD`.
pub fn calendar_date(input: &str) -> Result<NaiveDate, String> {
    if input.len() != 10 {
        return Err("must be a date in YYYY-MM-DD format".into());
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| "must be a date in YYYY-MM-DD format".into())
}

/// Weekly hours: one entry per day at most, `start < end` on working days and the lunch
/// break strictly inside the working window.
pub fn weekly_schedule(days: &[WorkingDay]) -> Result<(), String> {
    let mut seen: HashSet<Weekday> = HashSet::new();
    for day in days {
        let label = format!("{:?}", day.day).to_lowercase();
        if !seen.insert(day.day) {
            return Err(format!("{label} appears more than once"));
        }
        let start = time_of_day(&day.start).map_err(|e| format!("{label} start {e}"))?;
        let end = time_of_day(&day.end).map_err(|e| format!("{label} end {e}"))?;
        if !day.is_working {
            continue;
        }
        if start >= end {
            return Err(format!("{label} start must be before end"));
        }
        if let Some(lunch) = &day.lunch {
            let l_start =
                time_of_day(&lunch.start).map_err(|e| format!("{label} lunch start {e}"))?;
            let l_end = time_of_day(&lunch.end).map_err(|e| format!("{label} lunch end {e}"))?;
            if !(start < l_start && l_start < l_end && l_end < end) {
                return Err(format!("{label} lunch must fall inside working hours"));
            }
        }
    }
    Ok(())
}

pub fn geo_point(point: &GeoPoint) -> Result<(), String> {
    if !(-90.0..=90.0).contains(&point.lat) || !(-180.0..=180.0).contains(&point.lng) {
        return Err("coordinates are out of range".into());
    }
    Ok(())
}

pub fn price(value: f64) -> Result<f64, String> {
    if !value.is_finite() || value < 0.0 {
        return Err("must be a non-negative number".into());
    }
    Ok(value)
}

pub fn duration_minutes(value: u32) -> Result<u32, String> {
    if value == 0 || value > MAX_SERVICE_MINUTES {
        return Err(format!("must be between 1 and {MAX_SERVICE_MINUTES}"));
    }
    Ok(value)
}

pub fn age(value: u8) -> Result<u8, String> {
    if value > MAX_AGE {
        return Err(format!("must be at most {MAX_AGE}"));
    }
    Ok(value)
}

/// Lowercased e-mail address with a plausible `local@domain.tld` shape.
pub fn email(input: &str) -> Result<String, String> {
    let normalised = input.trim().to_lowercase();
    let valid = match normalised.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !normalised.contains(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(normalised)
    } else {
        Err("must be a valid email address".into())
    }
}

pub fn document_id(input: &str) -> Result<DocumentId, String> {
    DocumentId::parse(input.trim()).map_err(|_| "must be a valid id".to_string())
}

/// Parses an id taken from a request, failing as a validation error on `field`.
pub fn parse_id(field: &str, input: &str) -> CoreResult<DocumentId> {
    document_id(input).map_err(|msg| CoreError::validation(field, msg))
}

/// Parses a list of ids, dropping duplicates while keeping first-seen order.
pub fn document_ids(inputs: &[String]) -> Result<Vec<DocumentId>, String> {
    let mut out: Vec<DocumentId> = Vec::with_capacity(inputs.len());
    for input in inputs {
        let id = document_id(input)?;
        if !out.contains(&id) {
            out.push(id);
        }
    }
    Ok(out)
}
