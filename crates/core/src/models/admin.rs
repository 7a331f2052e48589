use crate::store::{Collection, Document};
use api_shared::{AdminView, Role};
use chrono::{DateTime, Utc};
use clinic_uuid::DocumentId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformAdmin {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub username: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
    pub permissions: Vec<String>,
    pub is_active: bool,
    #[serde(default)]
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Document for PlatformAdmin {
    const COLLECTION: Collection = Collection::PlatformAdmins;

    fn id(&self) -> &DocumentId {
        &self.id
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("username", self.username.to_lowercase())]
    }
}

impl PlatformAdmin {
    pub fn to_view(&self) -> AdminView {
        AdminView {
            id: self.id.to_string(),
            username: self.username.clone(),
            full_name: self.full_name.clone(),
            role: self.role,
            permissions: self.permissions.clone(),
        }
    }
}
