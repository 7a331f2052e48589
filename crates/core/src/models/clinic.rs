//! The clinic aggregate: one document per tenant with all its resources embedded.

use crate::constants::{PRO_LIMITS, STARTER_LIMITS};
use crate::store::{Collection, Document};
use api_shared::{
    BranchView, CategoryView, ClinicStats, ClinicStatus, ClinicSummaryView, ClinicView,
    DoctorView, GeoPoint, OwnerRole, OwnerView, Plan, PlanLimits, PlanTier, PublicClinicView,
    PublicDoctorView, ServiceView, WorkingDay,
};
use chrono::{DateTime, Utc};
use clinic_uuid::DocumentId;
use serde::{Deserialize, Serialize};

/// Limits snapshot written onto a clinic when it is put on `tier`.
pub fn limits_for(tier: PlanTier) -> PlanLimits {
    match tier {
        PlanTier::Starter => STARTER_LIMITS,
        PlanTier::Pro => PRO_LIMITS,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clinic {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub clinic_display_name: String,
    pub clinic_unique_name: String,
    pub status: ClinicStatus,
    pub plan: Plan,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub owners: Vec<ClinicOwner>,
    #[serde(default)]
    pub branches: Vec<Branch>,
    #[serde(default)]
    pub doctors: Vec<Doctor>,
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub stats: ClinicStats,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Clinic {
    const COLLECTION: Collection = Collection::Clinics;

    fn id(&self) -> &DocumentId {
        &self.id
    }

    // Partial index: a stopped clinic releases its unique name.
    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        if self.deleted_at.is_some() {
            return Vec::new();
        }
        vec![("clinicUniqueName", self.clinic_unique_name.to_lowercase())]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicOwner {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub user_name: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: OwnerRole,
    pub is_active: bool,
    #[serde(default)]
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub location: GeoPoint,
    #[serde(default)]
    pub working_hours: Vec<WorkingDay>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub full_name: String,
    pub username: String,
    pub password_hash: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub experience_years: Option<u8>,
    pub is_active: bool,
    #[serde(default)]
    pub service_ids: Vec<DocumentId>,
    #[serde(default)]
    pub branch_ids: Vec<DocumentId>,
    #[serde(default)]
    pub schedule: Vec<WorkingDay>,
    #[serde(default)]
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_id: Option<DocumentId>,
    pub duration_minutes: u32,
    pub price: f64,
    pub is_active: bool,
    #[serde(default)]
    pub branch_ids: Vec<DocumentId>,
    #[serde(default)]
    pub doctor_ids: Vec<DocumentId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub name: String,
}

impl Clinic {
    pub fn is_active(&self) -> bool {
        self.status == ClinicStatus::Active
    }

    /// Recomputes the cached resource counts from the embedded arrays.
    ///
    /// `bookingsCount` lives outside the clinic document's arrays and is left alone.
    pub fn refresh_counts(&mut self) {
        self.stats.branches_count = count(self.branches.len());
        self.stats.services_count = count(self.services.len());
        self.stats.doctors_count = count(self.doctors.len());
        self.stats.admins_count = count(self.owners.len());
    }

    pub fn owner(&self, id: &DocumentId) -> Option<&ClinicOwner> {
        self.owners.iter().find(|o| &o.id == id)
    }

    pub fn owner_mut(&mut self, id: &DocumentId) -> Option<&mut ClinicOwner> {
        self.owners.iter_mut().find(|o| &o.id == id)
    }

    pub fn branch(&self, id: &DocumentId) -> Option<&Branch> {
        self.branches.iter().find(|b| &b.id == id)
    }

    pub fn branch_mut(&mut self, id: &DocumentId) -> Option<&mut Branch> {
        self.branches.iter_mut().find(|b| &b.id == id)
    }

    pub fn doctor(&self, id: &DocumentId) -> Option<&Doctor> {
        self.doctors.iter().find(|d| &d.id == id)
    }

    pub fn doctor_mut(&mut self, id: &DocumentId) -> Option<&mut Doctor> {
        self.doctors.iter_mut().find(|d| &d.id == id)
    }

    pub fn service(&self, id: &DocumentId) -> Option<&Service> {
        self.services.iter().find(|s| &s.id == id)
    }

    pub fn service_mut(&mut self, id: &DocumentId) -> Option<&mut Service> {
        self.services.iter_mut().find(|s| &s.id == id)
    }

    pub fn category(&self, id: &DocumentId) -> Option<&Category> {
        self.categories.iter().find(|c| &c.id == id)
    }

    pub fn to_view(&self) -> ClinicView {
        ClinicView {
            id: self.id.to_string(),
            clinic_display_name: self.clinic_display_name.clone(),
            clinic_unique_name: self.clinic_unique_name.clone(),
            status: self.status,
            plan: self.plan,
            description: self.description.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            logo_url: self.logo_url.clone(),
            owners: self.owners.iter().map(ClinicOwner::to_view).collect(),
            branches: self.branches.iter().map(Branch::to_view).collect(),
            doctors: self.doctors.iter().map(|d| d.to_view(&self.id)).collect(),
            services: self.services.iter().map(Service::to_view).collect(),
            categories: self.categories.iter().map(Category::to_view).collect(),
            stats: self.stats,
            deleted_at: self.deleted_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn to_summary(&self) -> ClinicSummaryView {
        ClinicSummaryView {
            id: self.id.to_string(),
            clinic_display_name: self.clinic_display_name.clone(),
            clinic_unique_name: self.clinic_unique_name.clone(),
            status: self.status,
            plan: self.plan,
            stats: self.stats,
            deleted_at: self.deleted_at,
            created_at: self.created_at,
        }
    }

    /// Patient-facing view: only active resources, no login names or hashes.
    pub fn to_public(&self) -> PublicClinicView {
        PublicClinicView {
            id: self.id.to_string(),
            clinic_display_name: self.clinic_display_name.clone(),
            clinic_unique_name: self.clinic_unique_name.clone(),
            description: self.description.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            logo_url: self.logo_url.clone(),
            branches: self
                .branches
                .iter()
                .filter(|b| b.is_active)
                .map(Branch::to_view)
                .collect(),
            services: self
                .services
                .iter()
                .filter(|s| s.is_active)
                .map(Service::to_view)
                .collect(),
            doctors: self
                .doctors
                .iter()
                .filter(|d| d.is_active)
                .map(Doctor::to_public_view)
                .collect(),
            categories: self.categories.iter().map(Category::to_view).collect(),
        }
    }
}

fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

fn ids_to_strings(ids: &[DocumentId]) -> Vec<String> {
    ids.iter().map(DocumentId::to_string).collect()
}

impl ClinicOwner {
    pub fn to_view(&self) -> OwnerView {
        OwnerView {
            id: self.id.to_string(),
            user_name: self.user_name.clone(),
            display_name: self.display_name.clone(),
            role: self.role,
            is_active: self.is_active,
            last_login_at: self.last_login_at,
            created_at: self.created_at,
        }
    }
}

impl Branch {
    pub fn to_view(&self) -> BranchView {
        BranchView {
            id: self.id.to_string(),
            name: self.name.clone(),
            address: self.address.clone(),
            phone: self.phone.clone(),
            location: self.location,
            working_hours: self.working_hours.clone(),
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl Doctor {
    pub fn to_view(&self, clinic_id: &DocumentId) -> DoctorView {
        DoctorView {
            id: self.id.to_string(),
            clinic_id: clinic_id.to_string(),
            full_name: self.full_name.clone(),
            username: self.username.clone(),
            phone: self.phone.clone(),
            specialization: self.specialization.clone(),
            bio: self.bio.clone(),
            photo_url: self.photo_url.clone(),
            experience_years: self.experience_years,
            is_active: self.is_active,
            service_ids: ids_to_strings(&self.service_ids),
            branch_ids: ids_to_strings(&self.branch_ids),
            schedule: self.schedule.clone(),
            last_login_at: self.last_login_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn to_public_view(&self) -> PublicDoctorView {
        PublicDoctorView {
            id: self.id.to_string(),
            full_name: self.full_name.clone(),
            specialization: self.specialization.clone(),
            bio: self.bio.clone(),
            photo_url: self.photo_url.clone(),
            experience_years: self.experience_years,
            service_ids: ids_to_strings(&self.service_ids),
            branch_ids: ids_to_strings(&self.branch_ids),
            schedule: self.schedule.clone(),
        }
    }
}

impl Service {
    pub fn to_view(&self) -> ServiceView {
        ServiceView {
            id: self.id.to_string(),
            name: self.name.clone(),
            description: self.description.clone(),
            category_id: self.category_id.as_ref().map(DocumentId::to_string),
            duration_minutes: self.duration_minutes,
            price: self.price,
            is_active: self.is_active,
            branch_ids: ids_to_strings(&self.branch_ids),
            doctor_ids: ids_to_strings(&self.doctor_ids),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl Category {
    pub fn to_view(&self) -> CategoryView {
        CategoryView {
            id: self.id.to_string(),
            name: self.name.clone(),
        }
    }
}
