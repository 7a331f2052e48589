use super::ClinicService;
use crate::identity::hash_password;
use crate::models::{Clinic, Doctor};
use crate::repositories::shared::{load_clinic, update_clinic, username_taken, LoginKind};
use crate::validation;
use crate::{CoreError, CoreResult, FieldErrors};
use api_shared::{
    CreateDoctorReq, DoctorView, UpdateDoctorProfileReq, UpdateDoctorReq, WorkingDay,
};
use chrono::Utc;
use clinic_types::Patch;
use clinic_uuid::DocumentId;

fn doctor_not_found() -> CoreError {
    CoreError::NotFound("doctor not found".into())
}

/// Profile fields shared by the owner-side update and the doctor's own update.
struct ProfileChanges {
    full_name: Option<String>,
    phone: Patch<String>,
    specialization: Patch<String>,
    bio: Patch<String>,
    photo_url: Patch<String>,
    experience_years: Patch<u8>,
}

impl ProfileChanges {
    fn validate(
        errors: &mut FieldErrors,
        full_name: Option<String>,
        phone: Patch<String>,
        specialization: Patch<String>,
        bio: Patch<String>,
        photo_url: Patch<String>,
        experience_years: Patch<u8>,
    ) -> Self {
        let full_name = match full_name.as_deref() {
            Some(n) => errors.check("fullName", validation::required_text(n)),
            None => None,
        };
        if let Patch::Value(years) = experience_years {
            if years > 70 {
                errors.add("experienceYears", "must be at most 70");
            }
        }
        Self {
            full_name,
            phone: validation::patch_text(phone),
            specialization: validation::patch_text(specialization),
            bio: validation::patch_text(bio),
            photo_url: validation::patch_text(photo_url),
            experience_years,
        }
    }

    fn apply(self, doctor: &mut Doctor) {
        if let Some(name) = self.full_name {
            doctor.full_name = name;
        }
        self.phone.apply_to(&mut doctor.phone);
        self.specialization.apply_to(&mut doctor.specialization);
        self.bio.apply_to(&mut doctor.bio);
        self.photo_url.apply_to(&mut doctor.photo_url);
        self.experience_years.apply_to(&mut doctor.experience_years);
    }
}

impl ClinicService {
    /// Adds a doctor assigned to exactly one branch and no services.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the username exists in any clinic, or if the clinic has no branches.
    /// - `NotFound` if `branchId` is not one of this clinic's branches.
    pub fn add_doctor(&self, clinic_id: &DocumentId, req: CreateDoctorReq) -> CoreResult<DoctorView> {
        let mut errors = FieldErrors::new();
        let full_name = errors.check("fullName", validation::required_text(&req.full_name));
        let username = errors.check("username", validation::username(&req.username));
        errors.check("password", validation::password(&req.password));
        let branch_id = errors.check("branchId", validation::document_id(&req.branch_id));
        errors.check("schedule", validation::weekly_schedule(&req.schedule));
        if matches!(req.experience_years, Some(years) if years > 70) {
            errors.add("experienceYears", "must be at most 70");
        }
        let (Some(full_name), Some(username), Some(branch_id)) = (full_name, username, branch_id)
        else {
            return Err(CoreError::Validation(errors));
        };
        errors.finish()?;

        if username_taken(&self.store, LoginKind::Doctor, &username, None)? {
            return Err(CoreError::Conflict(format!(
                "username '{username}' is already taken"
            )));
        }

        let password_hash = hash_password(&req.password, self.cfg.bcrypt_cost())?;
        let now = Utc::now();
        let doctor = Doctor {
            id: DocumentId::new(),
            full_name,
            username,
            password_hash,
            phone: validation::optional_text(req.phone),
            specialization: validation::optional_text(req.specialization),
            bio: validation::optional_text(req.bio),
            photo_url: validation::optional_text(req.photo_url),
            experience_years: req.experience_years,
            is_active: true,
            service_ids: Vec::new(),
            branch_ids: vec![branch_id.clone()],
            schedule: req.schedule,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };

        update_clinic(&self.store, clinic_id, |clinic| {
            if clinic.branches.is_empty() {
                return Err(CoreError::Conflict(
                    "branch required: add a branch before adding doctors".into(),
                ));
            }
            if clinic.branch(&branch_id).is_none() {
                return Err(CoreError::NotFound("branch not found".into()));
            }
            clinic.doctors.push(doctor.clone());
            Ok(())
        })?;
        tracing::info!("clinic {}: added doctor {}", clinic_id, doctor.id);
        Ok(doctor.to_view(clinic_id))
    }

    pub fn update_doctor(
        &self,
        clinic_id: &DocumentId,
        doctor_id: &DocumentId,
        req: UpdateDoctorReq,
    ) -> CoreResult<DoctorView> {
        let mut errors = FieldErrors::new();
        let username = match req.username.as_deref() {
            Some(u) => errors.check("username", validation::username(u)),
            None => None,
        };
        if let Some(password) = req.password.as_deref() {
            errors.check("password", validation::password(password));
        }
        let branch_ids = match req.branch_ids.as_deref() {
            Some(ids) if ids.is_empty() => {
                errors.add("branchIds", "at least one branch is required");
                None
            }
            Some(ids) => errors.check("branchIds", validation::document_ids(ids)),
            None => None,
        };
        let changes = ProfileChanges::validate(
            &mut errors,
            req.full_name,
            req.phone,
            req.specialization,
            req.bio,
            req.photo_url,
            req.experience_years,
        );
        errors.finish()?;

        if let Some(username) = &username {
            if username_taken(&self.store, LoginKind::Doctor, username, Some(doctor_id))? {
                return Err(CoreError::Conflict(format!(
                    "username '{username}' is already taken"
                )));
            }
        }
        let password_hash = match req.password.as_deref() {
            Some(p) => Some(hash_password(p, self.cfg.bcrypt_cost())?),
            None => None,
        };

        update_clinic(&self.store, clinic_id, |clinic| {
            if let Some(ids) = &branch_ids {
                if ids.iter().any(|id| clinic.branch(id).is_none()) {
                    return Err(CoreError::NotFound("branch not found".into()));
                }
            }
            let doctor = clinic.doctor_mut(doctor_id).ok_or_else(doctor_not_found)?;
            if let Some(username) = username {
                doctor.username = username;
            }
            if let Some(hash) = password_hash {
                doctor.password_hash = hash;
            }
            if let Some(ids) = branch_ids {
                doctor.branch_ids = ids;
            }
            changes.apply(doctor);
            doctor.updated_at = Utc::now();
            Ok(doctor.to_view(clinic_id))
        })
    }

    pub fn set_doctor_status(
        &self,
        clinic_id: &DocumentId,
        doctor_id: &DocumentId,
        is_active: bool,
    ) -> CoreResult<DoctorView> {
        update_clinic(&self.store, clinic_id, |clinic| {
            let doctor = clinic.doctor_mut(doctor_id).ok_or_else(doctor_not_found)?;
            doctor.is_active = is_active;
            doctor.updated_at = Utc::now();
            Ok(doctor.to_view(clinic_id))
        })
    }

    /// Removes a doctor and strips them from every service's `doctorIds`.
    pub fn remove_doctor(&self, clinic_id: &DocumentId, doctor_id: &DocumentId) -> CoreResult<()> {
        update_clinic(&self.store, clinic_id, |clinic| {
            let before = clinic.doctors.len();
            clinic.doctors.retain(|d| &d.id != doctor_id);
            if clinic.doctors.len() == before {
                return Err(doctor_not_found());
            }
            for service in &mut clinic.services {
                service.doctor_ids.retain(|id| id != doctor_id);
            }
            Ok(())
        })?;
        tracing::info!("clinic {}: removed doctor {}", clinic_id, doctor_id);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Doctor self-service
    // ------------------------------------------------------------------

    pub fn get_doctor(&self, clinic_id: &DocumentId, doctor_id: &DocumentId) -> CoreResult<DoctorView> {
        let clinic: Clinic = load_clinic(&self.store, clinic_id)?;
        clinic
            .doctor(doctor_id)
            .map(|d| d.to_view(clinic_id))
            .ok_or_else(doctor_not_found)
    }

    /// Profile-only update made by the doctor; branch and service assignments are untouched.
    pub fn update_doctor_profile(
        &self,
        clinic_id: &DocumentId,
        doctor_id: &DocumentId,
        req: UpdateDoctorProfileReq,
    ) -> CoreResult<DoctorView> {
        let mut errors = FieldErrors::new();
        let changes = ProfileChanges::validate(
            &mut errors,
            req.full_name,
            req.phone,
            req.specialization,
            req.bio,
            req.photo_url,
            req.experience_years,
        );
        errors.finish()?;

        update_clinic(&self.store, clinic_id, |clinic| {
            let doctor = clinic.doctor_mut(doctor_id).ok_or_else(doctor_not_found)?;
            changes.apply(doctor);
            doctor.updated_at = Utc::now();
            Ok(doctor.to_view(clinic_id))
        })
    }

    pub fn update_doctor_schedule(
        &self,
        clinic_id: &DocumentId,
        doctor_id: &DocumentId,
        schedule: Vec<WorkingDay>,
    ) -> CoreResult<DoctorView> {
        validation::weekly_schedule(&schedule).map_err(|msg| CoreError::validation("schedule", msg))?;

        update_clinic(&self.store, clinic_id, |clinic| {
            let doctor = clinic.doctor_mut(doctor_id).ok_or_else(doctor_not_found)?;
            doctor.schedule = schedule;
            doctor.updated_at = Utc::now();
            Ok(doctor.to_view(clinic_id))
        })
    }
}
