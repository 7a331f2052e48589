use crate::dto::common::{
    ClinicStats, ClinicStatus, GeoPoint, OwnerRole, Plan, PlanLimits, PlanTier, WorkingDay,
};
use chrono::{DateTime, Utc};
use clinic_types::Patch;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// ============================================================================
// REQUESTS
// ============================================================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClinicReq {
    pub display_name: String,
    pub unique_name: String,
    pub owner_user_name: String,
    pub owner_display_name: String,
    pub owner_password: String,
    pub plan: PlanTier,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct ClinicListQuery {
    pub status: Option<ClinicStatus>,
    /// Case-insensitive match on display or unique name.
    pub search: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ChangePlanReq {
    pub plan: PlanTier,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClinicReq {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub description: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub phone: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub address: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub logo_url: Patch<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBranchReq {
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub location: GeoPoint,
    #[serde(default)]
    pub working_hours: Vec<WorkingDay>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBranchReq {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub phone: Patch<String>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub working_hours: Option<Vec<WorkingDay>>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDoctorReq {
    pub full_name: String,
    pub username: String,
    pub password: String,
    pub branch_id: String,
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
    #[serde(default)]
    pub schedule: Vec<WorkingDay>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDoctorReq {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub branch_ids: Option<Vec<String>>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub phone: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub specialization: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub bio: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub photo_url: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<u8>)]
    pub experience_years: Patch<u8>,
}

/// Fields a doctor may change on their own profile.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDoctorProfileReq {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub phone: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub specialization: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub bio: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub photo_url: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<u8>)]
    pub experience_years: Patch<u8>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateScheduleReq {
    pub schedule: Vec<WorkingDay>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceReq {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    pub duration_minutes: u32,
    pub price: f64,
    #[serde(default)]
    pub branch_ids: Vec<String>,
    #[serde(default)]
    pub doctor_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceReq {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub description: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub category_id: Patch<String>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub branch_ids: Option<Vec<String>>,
    #[serde(default)]
    pub doctor_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CategoryReq {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdminReq {
    pub user_name: String,
    pub display_name: String,
    pub password: String,
}

// ============================================================================
// VIEWS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnerView {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_name: String,
    pub display_name: String,
    pub role: OwnerRole,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BranchView {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub location: GeoPoint,
    pub working_hours: Vec<WorkingDay>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoctorView {
    #[serde(rename = "_id")]
    pub id: String,
    pub clinic_id: String,
    pub full_name: String,
    pub username: String,
    pub phone: Option<String>,
    pub specialization: Option<String>,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
    pub experience_years: Option<u8>,
    pub is_active: bool,
    pub service_ids: Vec<String>,
    pub branch_ids: Vec<String>,
    pub schedule: Vec<WorkingDay>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Doctor as shown to patients: no login name.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicDoctorView {
    #[serde(rename = "_id")]
    pub id: String,
    pub full_name: String,
    pub specialization: Option<String>,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
    pub experience_years: Option<u8>,
    pub service_ids: Vec<String>,
    pub branch_ids: Vec<String>,
    pub schedule: Vec<WorkingDay>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceView {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<String>,
    pub duration_minutes: u32,
    pub price: f64,
    pub is_active: bool,
    pub branch_ids: Vec<String>,
    pub doctor_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryView {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClinicView {
    #[serde(rename = "_id")]
    pub id: String,
    pub clinic_display_name: String,
    pub clinic_unique_name: String,
    pub status: ClinicStatus,
    pub plan: Plan,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub logo_url: Option<String>,
    pub owners: Vec<OwnerView>,
    pub branches: Vec<BranchView>,
    pub doctors: Vec<DoctorView>,
    pub services: Vec<ServiceView>,
    pub categories: Vec<CategoryView>,
    pub stats: ClinicStats,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row in the platform-admin clinic list.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClinicSummaryView {
    #[serde(rename = "_id")]
    pub id: String,
    pub clinic_display_name: String,
    pub clinic_unique_name: String,
    pub status: ClinicStatus,
    pub plan: Plan,
    pub stats: ClinicStats,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicClinicView {
    #[serde(rename = "_id")]
    pub id: String,
    pub clinic_display_name: String,
    pub clinic_unique_name: String,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub logo_url: Option<String>,
    pub branches: Vec<BranchView>,
    pub services: Vec<ServiceView>,
    pub doctors: Vec<PublicDoctorView>,
    pub categories: Vec<CategoryView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanUsageView {
    pub tier: PlanTier,
    pub limits: PlanLimits,
    pub usage: ClinicStats,
    /// Whether add operations reject requests beyond the limits.
    pub enforced: bool,
}
