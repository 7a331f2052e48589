//! Signed bearer tokens.
//!
//! Staff tokens (platform admins, clinic owners/admins, doctors) and patient tokens are signed
//! with separate HS256 secrets. Both carry the fixed issuer [`TOKEN_ISSUER`] and expire after
//! the configured lifetime; there is no refresh.

use crate::config::CoreConfig;
use crate::constants::TOKEN_ISSUER;
use crate::{CoreError, CoreResult};
use api_shared::Role;
use chrono::{Duration, Utc};
use clinic_uuid::DocumentId;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinic_id: Option<String>,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKeys {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

pub struct TokenService {
    staff: SigningKeys,
    patient: SigningKeys,
    ttl: Duration,
    validation: Validation,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(cfg: &CoreConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Self {
            staff: SigningKeys::from_secret(cfg.jwt_secret()),
            patient: SigningKeys::from_secret(cfg.patient_jwt_secret()),
            ttl: cfg.token_ttl(),
            validation,
        }
    }

    /// Token lifetime in seconds, as reported to clients in `expiresIn`.
    pub fn ttl_secs(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Issues a staff token. Use [`TokenService::issue_patient`] for patients.
    pub fn issue(
        &self,
        subject: &DocumentId,
        role: Role,
        clinic_id: Option<&DocumentId>,
    ) -> CoreResult<String> {
        if role == Role::Patient {
            return Err(CoreError::BadRequest(
                "patient tokens are issued with issue_patient".into(),
            ));
        }
        self.sign(&self.staff, subject, role, clinic_id)
    }

    pub fn issue_patient(&self, patient_id: &DocumentId) -> CoreResult<String> {
        self.sign(&self.patient, patient_id, Role::Patient, None)
    }

    fn sign(
        &self,
        keys: &SigningKeys,
        subject: &DocumentId,
        role: Role,
        clinic_id: Option<&DocumentId>,
    ) -> CoreResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            role,
            clinic_id: clinic_id.map(DocumentId::to_string),
            iss: TOKEN_ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding).map_err(CoreError::TokenSign)
    }

    /// Verifies signature, issuer and expiry.
    ///
    /// A token verified with the staff key must carry a staff role and one verified with the
    /// patient key must carry the patient role.
    pub fn verify(&self, token: &str) -> CoreResult<Claims> {
        if let Ok(data) = decode::<Claims>(token, &self.staff.decoding, &self.validation) {
            if data.claims.role != Role::Patient {
                return Ok(data.claims);
            }
        }
        match decode::<Claims>(token, &self.patient.decoding, &self.validation) {
            Ok(data) if data.claims.role == Role::Patient => Ok(data.claims),
            Ok(_) => Err(CoreError::Unauthorized("invalid token".into())),
            Err(e) => {
                tracing::debug!("token rejected: {}", e);
                Err(CoreError::Unauthorized("invalid token".into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_cfg(patient_secret: Option<&str>) -> CoreConfig {
        CoreConfig::new(
            PathBuf::from("/tmp"),
            "staff-secret-0123456789".into(),
            patient_secret.map(str::to_string),
        )
        .expect("config should be valid")
    }

    #[test]
    fn test_issue_then_verify_staff_token() {
        let tokens = TokenService::new(&test_cfg(None));
        let doctor = DocumentId::new();
        let clinic = DocumentId::new();

        let token = tokens.issue(&doctor, Role::Doctor, Some(&clinic)).unwrap();
        let claims = tokens.verify(&token).unwrap();

        assert_eq!(claims.sub, doctor.to_string());
        assert_eq!(claims.role, Role::Doctor);
        assert_eq!(claims.clinic_id, Some(clinic.to_string()));
        assert_eq!(claims.iss, TOKEN_ISSUER);
        assert_eq!(claims.exp - claims.iat, tokens.ttl_secs());
    }

    #[test]
    fn test_patient_token_uses_its_own_secret() {
        let tokens = TokenService::new(&test_cfg(Some("patient-secret-0123456789")));
        let patient = DocumentId::new();

        let token = tokens.issue_patient(&patient).unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.role, Role::Patient);

        let other = TokenService::new(&test_cfg(Some("another-secret-0123456789")));
        assert!(matches!(
            other.verify(&token),
            Err(CoreError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_shared_secret_still_verifies_patient_tokens() {
        let tokens = TokenService::new(&test_cfg(None));
        let token = tokens.issue_patient(&DocumentId::new()).unwrap();
        assert_eq!(tokens.verify(&token).unwrap().role, Role::Patient);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let cfg = test_cfg(None).with_token_ttl(Duration::seconds(-600));
        let tokens = TokenService::new(&cfg);
        let token = tokens
            .issue(&DocumentId::new(), Role::SuperAdmin, None)
            .unwrap();
        assert!(matches!(
            tokens.verify(&token),
            Err(CoreError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_garbage_and_wrong_issuer_rejected() {
        let tokens = TokenService::new(&test_cfg(None));
        assert!(tokens.verify("not.a.token").is_err());

        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: DocumentId::new().to_string(),
            role: Role::SuperAdmin,
            clinic_id: None,
            iss: "someone-else".into(),
            iat: now,
            exp: now + 3600,
        };
        let forged = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"staff-secret-0123456789"),
        )
        .unwrap();
        assert!(tokens.verify(&forged).is_err());
    }

    #[test]
    fn test_issue_refuses_patient_role() {
        let tokens = TokenService::new(&test_cfg(None));
        assert!(tokens
            .issue(&DocumentId::new(), Role::Patient, None)
            .is_err());
    }
}
