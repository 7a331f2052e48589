use crate::config::CoreConfig;
use crate::constants::PLATFORM_ADMIN_PERMISSIONS;
use crate::identity::{hash_password, verify_password};
use crate::models::PlatformAdmin;
use crate::store::DocumentStore;
use crate::validation;
use crate::{CoreError, CoreResult, FieldErrors};
use api_shared::{AdminView, Role};
use chrono::Utc;
use clinic_uuid::DocumentId;
use std::sync::Arc;

/// Platform administrators: seeded from the CLI, log in through the admin endpoint.
#[derive(Clone, Debug)]
pub struct PlatformAdminService {
    cfg: Arc<CoreConfig>,
    store: Arc<DocumentStore>,
}

impl PlatformAdminService {
    pub fn new(cfg: Arc<CoreConfig>, store: Arc<DocumentStore>) -> Self {
        Self { cfg, store }
    }

    /// Creates a `super_admin` with the fixed platform permissions.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the username (case-insensitive) is already taken.
    pub fn create(&self, username: &str, password: &str, full_name: &str) -> CoreResult<AdminView> {
        let mut errors = FieldErrors::new();
        let username = errors.check("username", validation::username(username));
        let full_name = errors.check("fullName", validation::required_text(full_name));
        errors.check("password", validation::password(password));
        let (Some(username), Some(full_name)) = (username, full_name) else {
            return Err(CoreError::Validation(errors));
        };
        errors.finish()?;

        let admin = PlatformAdmin {
            id: DocumentId::new(),
            password_hash: hash_password(password, self.cfg.bcrypt_cost())?,
            full_name,
            role: Role::SuperAdmin,
            permissions: PLATFORM_ADMIN_PERMISSIONS.iter().map(|p| p.to_string()).collect(),
            is_active: true,
            last_login_at: None,
            created_at: Utc::now(),
            username,
        };
        self.store.insert(&admin).map_err(|e| match e {
            CoreError::Conflict(_) => {
                CoreError::Conflict(format!("username '{}' is already taken", admin.username))
            }
            other => other,
        })?;
        tracing::info!("platform admin {} created", admin.id);
        Ok(admin.to_view())
    }

    pub fn login(&self, username: &str, password: &str) -> CoreResult<PlatformAdmin> {
        let wanted = username.trim().to_lowercase();
        let admin = self
            .store
            .find_one::<PlatformAdmin>(|a| a.username.to_lowercase() == wanted)?
            .filter(|a| verify_password(password, &a.password_hash))
            .ok_or_else(|| CoreError::Unauthorized("invalid credentials".into()))?;
        if !admin.is_active {
            return Err(CoreError::Unauthorized("account is disabled".into()));
        }

        self.store
            .update::<PlatformAdmin, PlatformAdmin>(&admin.id, |a| {
                a.last_login_at = Some(Utc::now());
                Ok(a.clone())
            })?
            .ok_or_else(|| CoreError::Unauthorized("invalid credentials".into()))
    }

    /// Whether the account behind a token still exists and is enabled.
    pub fn require_active(&self, admin_id: &DocumentId) -> CoreResult<PlatformAdmin> {
        self.store
            .get::<PlatformAdmin>(admin_id)?
            .filter(|a| a.is_active)
            .ok_or_else(|| CoreError::Unauthorized("admin account is not active".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::clinic::test_support::test_cfg;
    use tempfile::TempDir;

    fn service(temp_dir: &TempDir) -> PlatformAdminService {
        let store = Arc::new(DocumentStore::open(temp_dir.path()).expect("store should open"));
        PlatformAdminService::new(test_cfg(temp_dir.path()), store)
    }

    #[test]
    fn test_create_and_login() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let admins = service(&temp_dir);

        let view = admins.create("root", "rootpass", "Root User").unwrap();
        assert_eq!(view.role, Role::SuperAdmin);
        assert_eq!(view.permissions.len(), PLATFORM_ADMIN_PERMISSIONS.len());

        let admin = admins.login("ROOT", "rootpass").unwrap();
        assert_eq!(admin.id.to_string(), view.id);
        assert!(admin.last_login_at.is_some());
        assert!(admins.require_active(&admin.id).is_ok());

        assert!(matches!(
            admins.login("root", "nope-nope"),
            Err(CoreError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_duplicate_username_conflicts() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let admins = service(&temp_dir);
        admins.create("root", "rootpass", "Root User").unwrap();
        assert!(matches!(
            admins.create("Root", "otherpass", "Other"),
            Err(CoreError::Conflict(_))
        ));
    }

    #[test]
    fn test_create_validates_input() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let admins = service(&temp_dir);
        let err = admins.create("r", "123", " ").unwrap_err();
        let CoreError::Validation(fields) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert!(fields.get("username").is_some());
        assert!(fields.get("password").is_some());
        assert!(fields.get("fullName").is_some());
    }
}
