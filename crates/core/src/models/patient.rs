use crate::store::{Collection, Document};
use api_shared::{AuthType, Gender, Language, PatientStatus, PatientView};
use chrono::{DateTime, Utc};
use clinic_uuid::DocumentId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub google_id: Option<String>,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub age: Option<u8>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub preferred_language: Language,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub auth: PatientAuth,
    pub status: PatientStatus,
    #[serde(default)]
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// How the account was first created.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PatientAuth {
    #[serde(rename = "type")]
    pub auth_type: AuthType,
}

impl Document for Patient {
    const COLLECTION: Collection = Collection::Patients;

    fn id(&self) -> &DocumentId {
        &self.id
    }

    // All three indexes are sparse.
    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        let mut keys = Vec::new();
        if let Some(phone) = &self.phone {
            keys.push(("phone", phone.clone()));
        }
        if let Some(email) = &self.email {
            keys.push(("email", email.to_lowercase()));
        }
        if let Some(google_id) = &self.google_id {
            keys.push(("googleId", google_id.clone()));
        }
        keys
    }
}

impl Patient {
    pub fn new(auth_type: AuthType, language: Language, now: DateTime<Utc>) -> Self {
        Self {
            id: DocumentId::new(),
            phone: None,
            email: None,
            google_id: None,
            full_name: String::new(),
            age: None,
            gender: None,
            preferred_language: language,
            avatar_url: None,
            auth: PatientAuth { auth_type },
            status: PatientStatus::Active,
            last_login_at: Some(now),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == PatientStatus::Active
    }

    pub fn needs_profile(&self) -> bool {
        self.full_name.trim().is_empty()
    }

    pub fn to_view(&self) -> PatientView {
        PatientView {
            id: self.id.to_string(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            age: self.age,
            gender: self.gender,
            preferred_language: self.preferred_language,
            avatar_url: self.avatar_url.clone(),
            auth_type: self.auth.auth_type,
            status: self.status,
            needs_profile: self.needs_profile(),
            last_login_at: self.last_login_at,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_patient_needs_profile() {
        let patient = Patient::new(AuthType::Phone, Language::Ru, Utc::now());
        assert!(patient.needs_profile());
        assert!(patient.is_active());
        assert!(patient.unique_keys().is_empty());
    }

    #[test]
    fn test_unique_keys_only_for_present_values() {
        let mut patient = Patient::new(AuthType::Google, Language::Uz, Utc::now());
        patient.email = Some("A@Mail.com".into());
        patient.google_id = Some("g-1".into());
        let keys = patient.unique_keys();
        assert_eq!(
            keys,
            vec![
                ("email", "a@mail.com".to_string()),
                ("googleId", "g-1".to_string())
            ]
        );
    }

    #[test]
    fn test_auth_type_stored_under_type_key() {
        let patient = Patient::new(AuthType::Google, Language::En, Utc::now());
        let json = serde_json::to_value(&patient).unwrap();
        assert_eq!(json["auth"]["type"], "google");
        assert_eq!(json["preferredLanguage"], "en");
    }
}
