use crate::auth::Role;
use crate::dto::clinic::DoctorView;
use crate::dto::common::{Language, OwnerRole};
use crate::dto::patient::PatientView;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AdminLoginReq {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClinicLoginReq {
    pub user_name: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DoctorLoginReq {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GoogleAuthReq {
    pub id_token: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhoneAuthReq {
    pub phone: String,
    #[serde(default)]
    pub preferred_language: Option<Language>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminView {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub role: Role,
    pub permissions: Vec<String>,
}

/// A clinic owner or admin as returned by the clinic login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClinicStaffView {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_name: String,
    pub display_name: String,
    pub role: OwnerRole,
    pub clinic_id: String,
    pub clinic_name: String,
}

/// The authenticated principal embedded in login responses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum PrincipalView {
    Admin(AdminView),
    ClinicStaff(ClinicStaffView),
    Doctor(DoctorView),
    Patient(PatientView),
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthRes {
    pub token: String,
    pub principal: PrincipalView,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    /// Only present on patient logins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub needs_profile: Option<bool>,
}
