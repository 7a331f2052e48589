use super::ClinicService;
use crate::identity::verify_password;
use crate::models::Clinic;
use crate::{CoreError, CoreResult};
use api_shared::{ClinicStaffView, DoctorView, OwnerRole, Role};
use chrono::Utc;
use clinic_uuid::DocumentId;

/// A successful owner/admin login, ready for token issuance.
#[derive(Debug, Clone)]
pub struct StaffLogin {
    pub clinic_id: DocumentId,
    pub staff_id: DocumentId,
    pub role: Role,
    pub view: ClinicStaffView,
}

#[derive(Debug, Clone)]
pub struct DoctorLogin {
    pub clinic_id: DocumentId,
    pub doctor_id: DocumentId,
    pub view: DoctorView,
}

fn invalid_credentials() -> CoreError {
    CoreError::Unauthorized("invalid credentials".into())
}

impl ClinicService {
    /// Owner or admin login by `userName` across all clinics.
    pub fn login_staff(&self, user_name: &str, password: &str) -> CoreResult<StaffLogin> {
        let wanted = user_name.trim().to_lowercase();
        let clinic = self
            .store
            .find_one::<Clinic>(|c| c.owners.iter().any(|o| o.user_name.to_lowercase() == wanted))?
            .ok_or_else(invalid_credentials)?;
        let owner = clinic
            .owners
            .iter()
            .find(|o| o.user_name.to_lowercase() == wanted)
            .ok_or_else(invalid_credentials)?;

        if !verify_password(password, &owner.password_hash) {
            return Err(invalid_credentials());
        }
        if !owner.is_active {
            return Err(CoreError::Unauthorized("account is disabled".into()));
        }
        if !clinic.is_active() {
            return Err(CoreError::Unauthorized("clinic is not active".into()));
        }

        let staff_id = owner.id.clone();
        self.store.update::<Clinic, ()>(&clinic.id, |c| {
            if let Some(o) = c.owner_mut(&staff_id) {
                o.last_login_at = Some(Utc::now());
            }
            Ok(())
        })?;

        let role = match owner.role {
            OwnerRole::Owner => Role::ClinicOwner,
            OwnerRole::Admin => Role::ClinicAdmin,
        };
        tracing::info!("clinic {}: {} logged in", clinic.id, role);
        Ok(StaffLogin {
            clinic_id: clinic.id.clone(),
            staff_id,
            role,
            view: ClinicStaffView {
                id: owner.id.to_string(),
                user_name: owner.user_name.clone(),
                display_name: owner.display_name.clone(),
                role: owner.role,
                clinic_id: clinic.id.to_string(),
                clinic_name: clinic.clinic_display_name.clone(),
            },
        })
    }

    pub fn login_doctor(&self, username: &str, password: &str) -> CoreResult<DoctorLogin> {
        let wanted = username.trim().to_lowercase();
        let clinic = self
            .store
            .find_one::<Clinic>(|c| c.doctors.iter().any(|d| d.username.to_lowercase() == wanted))?
            .ok_or_else(invalid_credentials)?;
        let doctor = clinic
            .doctors
            .iter()
            .find(|d| d.username.to_lowercase() == wanted)
            .ok_or_else(invalid_credentials)?;

        if !verify_password(password, &doctor.password_hash) {
            return Err(invalid_credentials());
        }
        if !doctor.is_active {
            return Err(CoreError::Unauthorized("account is disabled".into()));
        }
        if !clinic.is_active() {
            return Err(CoreError::Unauthorized("clinic is not active".into()));
        }

        let doctor_id = doctor.id.clone();
        let now = Utc::now();
        self.store.update::<Clinic, ()>(&clinic.id, |c| {
            if let Some(d) = c.doctor_mut(&doctor_id) {
                d.last_login_at = Some(now);
            }
            Ok(())
        })?;

        let mut view = doctor.to_view(&clinic.id);
        view.last_login_at = Some(now);
        Ok(DoctorLogin {
            clinic_id: clinic.id.clone(),
            doctor_id,
            view,
        })
    }

    /// Whether an owner/admin token still maps to an enabled account of an active clinic.
    /// Runs on every authenticated request.
    pub fn require_active_staff(
        &self,
        clinic_id: &DocumentId,
        staff_id: &DocumentId,
    ) -> CoreResult<()> {
        let clinic = self.require_active_clinic(clinic_id)?;
        match clinic.owner(staff_id) {
            Some(owner) if owner.is_active => Ok(()),
            _ => Err(CoreError::Unauthorized("account is not active".into())),
        }
    }

    /// Doctor counterpart of [`ClinicService::require_active_staff`].
    pub fn require_active_doctor(
        &self,
        clinic_id: &DocumentId,
        doctor_id: &DocumentId,
    ) -> CoreResult<()> {
        let clinic = self.require_active_clinic(clinic_id)?;
        match clinic.doctor(doctor_id) {
            Some(doctor) if doctor.is_active => Ok(()),
            _ => Err(CoreError::Unauthorized("account is not active".into())),
        }
    }

    fn require_active_clinic(&self, clinic_id: &DocumentId) -> CoreResult<Clinic> {
        self.store
            .get::<Clinic>(clinic_id)?
            .filter(Clinic::is_active)
            .ok_or_else(|| CoreError::Unauthorized("clinic is not active".into()))
    }
}
