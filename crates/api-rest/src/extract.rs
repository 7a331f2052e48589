//! Request extractors: JSON bodies and query strings whose rejections use the envelope, and
//! the authenticated principal in its per-role shapes.

use crate::error::ApiError;
use crate::state::AppState;
use api_shared::auth::bearer_token;
use api_shared::Role;
use axum::async_trait;
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use clinic_core::models::Patient;
use clinic_core::{CoreError, DocumentId, Principal};

/// `axum::Json` with malformed bodies reported as `VALIDATION_ERROR`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Query` with malformed query strings reported as `VALIDATION_ERROR`.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Parses an id taken from the URL path.
pub fn path_id(field: &str, raw: &str) -> Result<DocumentId, ApiError> {
    Ok(clinic_core::validation::parse_id(field, raw)?)
}

fn principal(parts: &Parts, state: &AppState) -> Result<Principal, ApiError> {
    let token = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
        .ok_or_else(|| CoreError::Unauthorized("missing bearer token".into()))?;
    let claims = state.tokens.verify(token)?;
    Ok(Principal::from_claims(&claims)?)
}

fn wrong_role(role: Role) -> ApiError {
    CoreError::Forbidden(format!("not available to role {role}")).into()
}

/// A platform administrator whose account is still enabled.
#[derive(Debug, Clone)]
pub struct AdminAuth {
    pub id: DocumentId,
}

#[async_trait]
impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        match principal(parts, state)? {
            Principal::PlatformAdmin { id } => {
                state.admins.require_active(&id)?;
                Ok(Self { id })
            }
            other => Err(wrong_role(other.role())),
        }
    }
}

/// An enabled clinic owner or admin of an active clinic; `clinic_id` is the tenant every
/// call is scoped to.
#[derive(Debug, Clone)]
pub struct ClinicStaffAuth {
    pub id: DocumentId,
    pub clinic_id: DocumentId,
    pub role: Role,
}

#[async_trait]
impl FromRequestParts<AppState> for ClinicStaffAuth {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        match principal(parts, state)? {
            Principal::ClinicStaff {
                id,
                clinic_id,
                role,
            } => {
                state.clinics.require_active_staff(&clinic_id, &id)?;
                Ok(Self {
                    id,
                    clinic_id,
                    role,
                })
            }
            other => Err(wrong_role(other.role())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DoctorAuth {
    pub id: DocumentId,
    pub clinic_id: DocumentId,
}

#[async_trait]
impl FromRequestParts<AppState> for DoctorAuth {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        match principal(parts, state)? {
            Principal::Doctor { id, clinic_id } => {
                state.clinics.require_active_doctor(&clinic_id, &id)?;
                Ok(Self { id, clinic_id })
            }
            other => Err(wrong_role(other.role())),
        }
    }
}

/// A patient, loaded and checked to be active.
#[derive(Debug, Clone)]
pub struct PatientAuth {
    pub patient: Patient,
}

#[async_trait]
impl FromRequestParts<AppState> for PatientAuth {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        match principal(parts, state)? {
            Principal::Patient { id } => Ok(Self {
                patient: state.patients.require_active(&id)?,
            }),
            other => Err(wrong_role(other.role())),
        }
    }
}
