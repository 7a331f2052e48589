//! Clinic aggregate management.
//!
//! A clinic is a single document with its owners, branches, doctors, services and categories
//! embedded. Every mutation of an embedded array goes through one atomic store update that
//! also recomputes `stats`, so `stats.<resource>Count == len(<resource>)` holds after every
//! successful write.
//!
//! Tenant and role checks happen at the HTTP boundary; the methods here take the clinic id
//! of the already-authorised caller.
//!
//! ## Cross-document consistency
//!
//! - Owner and doctor usernames are unique across all clinics. This is checked by scanning
//!   before writing, so two concurrent requests can race.
//! - Service ↔ doctor backlinks are written in the same update as the service itself (see
//!   [`backlinks`]).
//! - Categories are read, edited and written back whole; concurrent category edits can lose
//!   updates.

mod admins;
pub mod backlinks;
mod branches;
mod categories;
mod doctors;
mod logins;
mod public;
mod services;

pub use logins::{DoctorLogin, StaffLogin};

use crate::config::CoreConfig;
use crate::identity::hash_password;
use crate::models::{limits_for, Clinic, ClinicOwner};
use crate::repositories::shared::{
    load_clinic, mutate_clinic, unique_name_taken, username_taken, LoginKind,
};
use crate::store::DocumentStore;
use crate::validation;
use crate::{CoreError, CoreResult, FieldErrors};
use api_shared::{
    ClinicListQuery, ClinicStats, ClinicStatus, ClinicSummaryView, ClinicView, CreateClinicReq,
    OwnerRole, Plan, PlanTier, PlanUsageView, UpdateClinicReq,
};
use chrono::Utc;
use clinic_types::UniqueName;
use clinic_uuid::DocumentId;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct ClinicService {
    cfg: Arc<CoreConfig>,
    store: Arc<DocumentStore>,
}

impl ClinicService {
    pub fn new(cfg: Arc<CoreConfig>, store: Arc<DocumentStore>) -> Self {
        Self { cfg, store }
    }

    /// Fails with `Conflict` when adding one more item would exceed `max`, if limits are
    /// enforced.
    fn check_limit(&self, used: usize, max: u32, what: &str) -> CoreResult<()> {
        if !self.cfg.plan_limits_enforced() {
            return Ok(());
        }
        if used >= max as usize {
            return Err(CoreError::Conflict(format!(
                "plan limit reached: at most {max} {what}"
            )));
        }
        Ok(())
    }

    /// Creates a clinic with its first owner.
    ///
    /// # Errors
    ///
    /// - `Validation` for malformed input.
    /// - `Conflict` if the unique name is used by a non-deleted clinic or the owner user name
    ///   is used by any owner of any clinic. Nothing is written in either case.
    pub fn create_clinic(&self, req: CreateClinicReq) -> CoreResult<ClinicView> {
        let mut errors = FieldErrors::new();
        let display_name =
            errors.check("displayName", validation::required_text(&req.display_name));
        let unique_name = errors.check("uniqueName", UniqueName::new(&req.unique_name));
        let owner_user_name =
            errors.check("ownerUserName", validation::username(&req.owner_user_name));
        let owner_display_name = errors.check(
            "ownerDisplayName",
            validation::required_text(&req.owner_display_name),
        );
        errors.check("ownerPassword", validation::password(&req.owner_password));
        let (
            Some(display_name),
            Some(unique_name),
            Some(owner_user_name),
            Some(owner_display_name),
        ) = (display_name, unique_name, owner_user_name, owner_display_name)
        else {
            return Err(CoreError::Validation(errors));
        };
        errors.finish()?;

        if unique_name_taken(&self.store, unique_name.as_str(), None)? {
            return Err(CoreError::Conflict(format!(
                "clinic unique name '{}' is already taken",
                unique_name
            )));
        }
        if username_taken(&self.store, LoginKind::ClinicStaff, &owner_user_name, None)? {
            return Err(CoreError::Conflict(format!(
                "user name '{}' is already taken",
                owner_user_name
            )));
        }

        let password_hash = hash_password(&req.owner_password, self.cfg.bcrypt_cost())?;
        let now = Utc::now();
        let mut clinic = Clinic {
            id: DocumentId::new(),
            clinic_display_name: display_name,
            clinic_unique_name: unique_name.as_str().to_string(),
            status: ClinicStatus::Active,
            plan: Plan {
                tier: req.plan,
                limits: limits_for(req.plan),
            },
            description: None,
            phone: None,
            address: None,
            logo_url: None,
            owners: vec![ClinicOwner {
                id: DocumentId::new(),
                user_name: owner_user_name,
                display_name: owner_display_name,
                password_hash,
                role: OwnerRole::Owner,
                is_active: true,
                last_login_at: None,
                created_at: now,
            }],
            branches: Vec::new(),
            doctors: Vec::new(),
            services: Vec::new(),
            categories: Vec::new(),
            stats: ClinicStats::default(),
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        clinic.refresh_counts();

        self.store.insert(&clinic)?;
        tracing::info!("created clinic {} ({})", clinic.id, clinic.clinic_unique_name);
        Ok(clinic.to_view())
    }

    /// Lists clinics, newest first.
    pub fn list_clinics(&self, query: &ClinicListQuery) -> CoreResult<Vec<ClinicSummaryView>> {
        let search = query
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let mut clinics = self.store.find::<Clinic>(|clinic| {
            query.status.map_or(true, |status| clinic.status == status)
                && search.as_deref().map_or(true, |needle| {
                    clinic.clinic_display_name.to_lowercase().contains(needle)
                        || clinic.clinic_unique_name.contains(needle)
                })
        })?;
        clinics.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(clinics.iter().map(Clinic::to_summary).collect())
    }

    pub fn get_clinic(&self, clinic_id: &DocumentId) -> CoreResult<ClinicView> {
        Ok(load_clinic(&self.store, clinic_id)?.to_view())
    }

    /// `active → inactive`, recording `deletedAt`. Releases the unique name.
    pub fn stop_clinic(&self, clinic_id: &DocumentId) -> CoreResult<ClinicView> {
        let clinic = mutate_clinic(&self.store, clinic_id, |clinic| {
            if clinic.status != ClinicStatus::Active {
                return Err(CoreError::Conflict("clinic is not active".into()));
            }
            clinic.status = ClinicStatus::Inactive;
            clinic.deleted_at = Some(Utc::now());
            Ok(())
        })?;
        tracing::info!("stopped clinic {}", clinic_id);
        Ok(clinic.to_view())
    }

    /// `inactive → active`, clearing `deletedAt`.
    ///
    /// # Errors
    ///
    /// `Conflict` if another clinic took the unique name while this one was stopped.
    pub fn activate_clinic(&self, clinic_id: &DocumentId) -> CoreResult<ClinicView> {
        let current = load_clinic(&self.store, clinic_id)?;
        if current.status != ClinicStatus::Inactive {
            return Err(CoreError::Conflict("clinic is not inactive".into()));
        }
        if unique_name_taken(&self.store, &current.clinic_unique_name, Some(clinic_id))? {
            return Err(CoreError::Conflict(format!(
                "clinic unique name '{}' is already taken",
                current.clinic_unique_name
            )));
        }

        // The store's partial unique index re-checks the name inside the write.
        let clinic = mutate_clinic(&self.store, clinic_id, |clinic| {
            if clinic.status != ClinicStatus::Inactive {
                return Err(CoreError::Conflict("clinic is not inactive".into()));
            }
            clinic.status = ClinicStatus::Active;
            clinic.deleted_at = None;
            Ok(())
        })?;
        tracing::info!("activated clinic {}", clinic_id);
        Ok(clinic.to_view())
    }

    /// Switches the plan and rewrites the limits snapshot.
    pub fn change_plan(&self, clinic_id: &DocumentId, tier: PlanTier) -> CoreResult<ClinicView> {
        let clinic = mutate_clinic(&self.store, clinic_id, |clinic| {
            clinic.plan = Plan {
                tier,
                limits: limits_for(tier),
            };
            Ok(())
        })?;
        Ok(clinic.to_view())
    }

    /// Removes the clinic document. Its bookings are kept.
    pub fn delete_clinic(&self, clinic_id: &DocumentId) -> CoreResult<()> {
        if !self.store.delete::<Clinic>(clinic_id)? {
            return Err(CoreError::NotFound("clinic not found".into()));
        }
        tracing::info!("deleted clinic {}", clinic_id);
        Ok(())
    }

    pub fn update_profile(
        &self,
        clinic_id: &DocumentId,
        req: UpdateClinicReq,
    ) -> CoreResult<ClinicView> {
        let mut errors = FieldErrors::new();
        let display_name = match req.display_name.as_deref() {
            Some(name) => errors.check("displayName", validation::required_text(name)),
            None => None,
        };
        errors.finish()?;

        let description = validation::patch_text(req.description);
        let phone = validation::patch_text(req.phone);
        let address = validation::patch_text(req.address);
        let logo_url = validation::patch_text(req.logo_url);

        let clinic = mutate_clinic(&self.store, clinic_id, |clinic| {
            if let Some(name) = display_name {
                clinic.clinic_display_name = name;
            }
            description.apply_to(&mut clinic.description);
            phone.apply_to(&mut clinic.phone);
            address.apply_to(&mut clinic.address);
            logo_url.apply_to(&mut clinic.logo_url);
            Ok(())
        })?;
        Ok(clinic.to_view())
    }

    /// Current plan, its limits, and how much of them is used.
    pub fn plan_usage(&self, clinic_id: &DocumentId) -> CoreResult<PlanUsageView> {
        let clinic = load_clinic(&self.store, clinic_id)?;
        Ok(PlanUsageView {
            tier: clinic.plan.tier,
            limits: clinic.plan.limits,
            usage: clinic.stats,
            enforced: self.cfg.plan_limits_enforced(),
        })
    }
}
