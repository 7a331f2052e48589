use crate::dto::common::{AuthType, Gender, Language, PatientStatus};
use chrono::{DateTime, Utc};
use clinic_types::Patch;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientView {
    #[serde(rename = "_id")]
    pub id: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub full_name: String,
    pub age: Option<u8>,
    pub gender: Option<Gender>,
    pub preferred_language: Language,
    pub avatar_url: Option<String>,
    pub auth_type: AuthType,
    pub status: PatientStatus,
    /// True while `fullName` is empty.
    pub needs_profile: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteProfileReq {
    pub full_name: String,
    #[serde(default)]
    #[schema(value_type = Option<u8>)]
    pub age: Patch<u8>,
    #[serde(default)]
    #[schema(value_type = Option<Gender>)]
    pub gender: Patch<Gender>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub email: Patch<String>,
    /// Required when the account has no phone yet (Google-first accounts).
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub preferred_language: Option<Language>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileReq {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<u8>)]
    pub age: Patch<u8>,
    #[serde(default)]
    #[schema(value_type = Option<Gender>)]
    pub gender: Patch<Gender>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub email: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub avatar_url: Patch<String>,
    #[serde(default)]
    pub preferred_language: Option<Language>,
}
