use super::ClinicService;
use crate::models::Branch;
use crate::repositories::shared::update_clinic;
use crate::validation;
use crate::{CoreError, CoreResult, FieldErrors};
use api_shared::{BranchView, CreateBranchReq, UpdateBranchReq};
use chrono::Utc;
use clinic_uuid::DocumentId;

fn branch_not_found() -> CoreError {
    CoreError::NotFound("branch not found".into())
}

impl ClinicService {
    /// Adds a branch, subject to the plan's `maxBranches`.
    pub fn add_branch(&self, clinic_id: &DocumentId, req: CreateBranchReq) -> CoreResult<BranchView> {
        let mut errors = FieldErrors::new();
        let name = errors.check("name", validation::required_text(&req.name));
        let address = errors.check("address", validation::required_text(&req.address));
        errors.check("location", validation::geo_point(&req.location));
        errors.check("workingHours", validation::weekly_schedule(&req.working_hours));
        let (Some(name), Some(address)) = (name, address) else {
            return Err(CoreError::Validation(errors));
        };
        errors.finish()?;

        let now = Utc::now();
        let branch = Branch {
            id: DocumentId::new(),
            name,
            address,
            phone: validation::optional_text(req.phone),
            location: req.location,
            working_hours: req.working_hours,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        update_clinic(&self.store, clinic_id, |clinic| {
            self.check_limit(clinic.branches.len(), clinic.plan.limits.max_branches, "branches")?;
            clinic.branches.push(branch.clone());
            Ok(())
        })?;
        tracing::info!("clinic {}: added branch {}", clinic_id, branch.id);
        Ok(branch.to_view())
    }

    pub fn update_branch(
        &self,
        clinic_id: &DocumentId,
        branch_id: &DocumentId,
        req: UpdateBranchReq,
    ) -> CoreResult<BranchView> {
        let mut errors = FieldErrors::new();
        let name = match req.name.as_deref() {
            Some(n) => errors.check("name", validation::required_text(n)),
            None => None,
        };
        let address = match req.address.as_deref() {
            Some(a) => errors.check("address", validation::required_text(a)),
            None => None,
        };
        if let Some(location) = &req.location {
            errors.check("location", validation::geo_point(location));
        }
        if let Some(hours) = &req.working_hours {
            errors.check("workingHours", validation::weekly_schedule(hours));
        }
        errors.finish()?;

        let phone = validation::patch_text(req.phone);
        update_clinic(&self.store, clinic_id, |clinic| {
            let branch = clinic.branch_mut(branch_id).ok_or_else(branch_not_found)?;
            if let Some(name) = name {
                branch.name = name;
            }
            if let Some(address) = address {
                branch.address = address;
            }
            phone.apply_to(&mut branch.phone);
            if let Some(location) = req.location {
                branch.location = location;
            }
            if let Some(hours) = req.working_hours {
                branch.working_hours = hours;
            }
            branch.updated_at = Utc::now();
            Ok(branch.to_view())
        })
    }

    pub fn set_branch_status(
        &self,
        clinic_id: &DocumentId,
        branch_id: &DocumentId,
        is_active: bool,
    ) -> CoreResult<BranchView> {
        update_clinic(&self.store, clinic_id, |clinic| {
            let branch = clinic.branch_mut(branch_id).ok_or_else(branch_not_found)?;
            branch.is_active = is_active;
            branch.updated_at = Utc::now();
            Ok(branch.to_view())
        })
    }

    /// Removes a branch and every reference to it from services and doctors.
    pub fn remove_branch(&self, clinic_id: &DocumentId, branch_id: &DocumentId) -> CoreResult<()> {
        update_clinic(&self.store, clinic_id, |clinic| {
            let before = clinic.branches.len();
            clinic.branches.retain(|b| &b.id != branch_id);
            if clinic.branches.len() == before {
                return Err(branch_not_found());
            }
            for service in &mut clinic.services {
                service.branch_ids.retain(|id| id != branch_id);
            }
            for doctor in &mut clinic.doctors {
                doctor.branch_ids.retain(|id| id != branch_id);
            }
            Ok(())
        })?;
        tracing::info!("clinic {}: removed branch {}", clinic_id, branch_id);
        Ok(())
    }
}
