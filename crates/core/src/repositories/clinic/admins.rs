use super::ClinicService;
use crate::identity::hash_password;
use crate::models::ClinicOwner;
use crate::repositories::shared::{update_clinic, username_taken, LoginKind};
use crate::validation;
use crate::{CoreError, CoreResult, FieldErrors};
use api_shared::{CreateAdminReq, OwnerRole, OwnerView};
use chrono::Utc;
use clinic_uuid::DocumentId;

/// Looks up an `admin` entry; the `owner` entry is never editable through these calls.
fn admin_entry<'a>(
    owners: &'a mut [ClinicOwner],
    admin_id: &DocumentId,
) -> CoreResult<&'a mut ClinicOwner> {
    let entry = owners
        .iter_mut()
        .find(|o| &o.id == admin_id)
        .ok_or_else(|| CoreError::NotFound("admin not found".into()))?;
    if entry.role == OwnerRole::Owner {
        return Err(CoreError::Conflict("the clinic owner cannot be changed".into()));
    }
    Ok(entry)
}

impl ClinicService {
    /// Adds an `admin` login to the clinic, subject to the plan's `maxAdmins` (the owner
    /// counts towards it).
    pub fn add_admin(&self, clinic_id: &DocumentId, req: CreateAdminReq) -> CoreResult<OwnerView> {
        let mut errors = FieldErrors::new();
        let user_name = errors.check("userName", validation::username(&req.user_name));
        let display_name = errors.check("displayName", validation::required_text(&req.display_name));
        errors.check("password", validation::password(&req.password));
        let (Some(user_name), Some(display_name)) = (user_name, display_name) else {
            return Err(CoreError::Validation(errors));
        };
        errors.finish()?;

        if username_taken(&self.store, LoginKind::ClinicStaff, &user_name, None)? {
            return Err(CoreError::Conflict(format!(
                "user name '{user_name}' is already taken"
            )));
        }

        let admin = ClinicOwner {
            id: DocumentId::new(),
            user_name,
            display_name,
            password_hash: hash_password(&req.password, self.cfg.bcrypt_cost())?,
            role: OwnerRole::Admin,
            is_active: true,
            last_login_at: None,
            created_at: Utc::now(),
        };

        update_clinic(&self.store, clinic_id, |clinic| {
            self.check_limit(clinic.owners.len(), clinic.plan.limits.max_admins, "admins")?;
            clinic.owners.push(admin.clone());
            Ok(())
        })?;
        tracing::info!("clinic {}: added admin {}", clinic_id, admin.id);
        Ok(admin.to_view())
    }

    pub fn set_admin_status(
        &self,
        clinic_id: &DocumentId,
        admin_id: &DocumentId,
        is_active: bool,
    ) -> CoreResult<OwnerView> {
        update_clinic(&self.store, clinic_id, |clinic| {
            let admin = admin_entry(&mut clinic.owners, admin_id)?;
            admin.is_active = is_active;
            Ok(admin.to_view())
        })
    }

    pub fn remove_admin(&self, clinic_id: &DocumentId, admin_id: &DocumentId) -> CoreResult<()> {
        update_clinic(&self.store, clinic_id, |clinic| {
            admin_entry(&mut clinic.owners, admin_id)?;
            clinic.owners.retain(|o| &o.id != admin_id);
            Ok(())
        })?;
        tracing::info!("clinic {}: removed admin {}", clinic_id, admin_id);
        Ok(())
    }
}
