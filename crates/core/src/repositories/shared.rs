//! Helpers shared by the service modules.

use crate::models::Clinic;
use crate::store::DocumentStore;
use crate::{CoreError, CoreResult};
use chrono::Utc;
use clinic_uuid::DocumentId;

pub(crate) fn load_clinic(store: &DocumentStore, clinic_id: &DocumentId) -> CoreResult<Clinic> {
    store
        .get::<Clinic>(clinic_id)?
        .ok_or_else(|| CoreError::NotFound("clinic not found".into()))
}

/// Runs `f` as one atomic update of the clinic document.
///
/// After `f` succeeds the cached stats are recomputed from the arrays and `updatedAt` is
/// refreshed, so the counts can never drift from the array lengths.
pub(crate) fn update_clinic<R>(
    store: &DocumentStore,
    clinic_id: &DocumentId,
    f: impl FnOnce(&mut Clinic) -> CoreResult<R>,
) -> CoreResult<R> {
    store
        .update::<Clinic, R>(clinic_id, |clinic| {
            let result = f(clinic)?;
            clinic.refresh_counts();
            clinic.updated_at = Utc::now();
            Ok(result)
        })?
        .ok_or_else(|| CoreError::NotFound("clinic not found".into()))
}

/// Like [`update_clinic`], returning the clinic as written.
pub(crate) fn mutate_clinic(
    store: &DocumentStore,
    clinic_id: &DocumentId,
    f: impl FnOnce(&mut Clinic) -> CoreResult<()>,
) -> CoreResult<Clinic> {
    store
        .update::<Clinic, Clinic>(clinic_id, |clinic| {
            f(clinic)?;
            clinic.refresh_counts();
            clinic.updated_at = Utc::now();
            Ok(clinic.clone())
        })?
        .ok_or_else(|| CoreError::NotFound("clinic not found".into()))
}

/// Which login namespace a username belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoginKind {
    /// `owners[].userName`
    ClinicStaff,
    /// `doctors[].username`
    Doctor,
}

/// Case-insensitive lookup across every clinic. `except` skips one child record (its own
/// entry when renaming).
///
/// This is a read-then-write check; two concurrent requests can both pass it.
pub(crate) fn username_taken(
    store: &DocumentStore,
    kind: LoginKind,
    username: &str,
    except: Option<&DocumentId>,
) -> CoreResult<bool> {
    let wanted = username.to_lowercase();
    let hit = store.find_one::<Clinic>(|clinic| match kind {
        LoginKind::ClinicStaff => clinic
            .owners
            .iter()
            .any(|o| Some(&o.id) != except && o.user_name.to_lowercase() == wanted),
        LoginKind::Doctor => clinic
            .doctors
            .iter()
            .any(|d| Some(&d.id) != except && d.username.to_lowercase() == wanted),
    })?;
    Ok(hit.is_some())
}

/// Whether a non-deleted clinic other than `except` already uses `unique_name`.
pub(crate) fn unique_name_taken(
    store: &DocumentStore,
    unique_name: &str,
    except: Option<&DocumentId>,
) -> CoreResult<bool> {
    let wanted = unique_name.to_lowercase();
    let hit = store.find_one::<Clinic>(|clinic| {
        Some(&clinic.id) != except
            && clinic.deleted_at.is_none()
            && clinic.clinic_unique_name.to_lowercase() == wanted
    })?;
    Ok(hit.is_some())
}

/// Retries `op` on server-side failures, up to `attempts` times.
///
/// Caller errors (validation, not found, conflict...) are returned immediately.
pub(crate) fn with_retries<T>(
    what: &str,
    attempts: usize,
    mut op: impl FnMut() -> CoreResult<T>,
) -> CoreResult<T> {
    let mut attempt = 1;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(e) if e.is_internal() && attempt < attempts => {
                tracing::warn!("{} failed (attempt {}/{}): {}", what, attempt, attempts, e);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_with_retries_retries_internal_errors_only() {
        let calls = Cell::new(0);
        let result: CoreResult<u8> = with_retries("op", 3, || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(CoreError::StorageWrite(std::io::Error::other("disk")))
            } else {
                Ok(7)
            }
        });
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.get(), 3);

        let calls = Cell::new(0);
        let result: CoreResult<u8> = with_retries("op", 3, || {
            calls.set(calls.get() + 1);
            Err(CoreError::NotFound("x".into()))
        });
        assert!(matches!(result, Err(CoreError::NotFound(_))));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_with_retries_gives_up_after_attempts() {
        let calls = Cell::new(0);
        let result: CoreResult<()> = with_retries("op", 3, || {
            calls.set(calls.get() + 1);
            Err(CoreError::StorageWrite(std::io::Error::other("disk")))
        });
        assert!(result.is_err());
        assert_eq!(calls.get(), 3);
    }
}
