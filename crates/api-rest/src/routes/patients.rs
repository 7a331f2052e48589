//! Patient profile endpoints.

use crate::error::{ok, ApiResult};
use crate::extract::{ApiJson, PatientAuth};
use crate::state::AppState;
use api_shared::{CompleteProfileReq, PatientView, UpdateProfileReq};
use axum::extract::State;

#[utoipa::path(
    get,
    path = "/patients/me",
    tag = "patients",
    security(("bearer" = [])),
    responses((status = 200, description = "The signed-in patient", body = PatientView))
)]
pub async fn get_me(auth: PatientAuth) -> ApiResult<PatientView> {
    ok(auth.patient.to_view())
}

#[utoipa::path(
    patch,
    path = "/patients/me",
    tag = "patients",
    request_body = UpdateProfileReq,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Profile updated", body = PatientView),
        (status = 409, description = "Email already used by another patient")
    )
)]
pub async fn update_me(
    State(state): State<AppState>,
    auth: PatientAuth,
    ApiJson(req): ApiJson<UpdateProfileReq>,
) -> ApiResult<PatientView> {
    ok(state.patients.update_profile(&auth.patient.id, req)?)
}

#[utoipa::path(
    post,
    path = "/patients/me/complete",
    tag = "patients",
    request_body = CompleteProfileReq,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Profile completed", body = PatientView),
        (status = 400, description = "Full name missing, or phone missing on a Google account"),
        (status = 409, description = "Phone or email already used by another patient")
    )
)]
pub async fn complete_profile(
    State(state): State<AppState>,
    auth: PatientAuth,
    ApiJson(req): ApiJson<CompleteProfileReq>,
) -> ApiResult<PatientView> {
    ok(state.patients.complete_profile(&auth.patient.id, req)?)
}
