//! Sign-in endpoints. None of these require a token; each returns a fresh one.

use crate::error::{ok, ApiResult};
use crate::extract::ApiJson;
use crate::state::AppState;
use api_shared::{
    AdminLoginReq, AuthRes, ClinicLoginReq, DoctorLoginReq, GoogleAuthReq, PhoneAuthReq,
    PrincipalView, Role,
};
use axum::extract::State;
use clinic_core::models::Patient;
use clinic_core::CoreError;

fn patient_auth_res(state: &AppState, patient: Patient) -> ApiResult<AuthRes> {
    let token = state.tokens.issue_patient(&patient.id)?;
    ok(AuthRes {
        token,
        needs_profile: Some(patient.needs_profile()),
        principal: PrincipalView::Patient(patient.to_view()),
        expires_in: state.tokens.ttl_secs(),
    })
}

#[utoipa::path(
    post,
    path = "/auth/loginAdmin",
    tag = "auth",
    request_body = AdminLoginReq,
    responses(
        (status = 200, description = "Signed in as platform administrator", body = AuthRes),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login_admin(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<AdminLoginReq>,
) -> ApiResult<AuthRes> {
    let admin = state.admins.login(&req.username, &req.password)?;
    let token = state.tokens.issue(&admin.id, Role::SuperAdmin, None)?;
    ok(AuthRes {
        token,
        principal: PrincipalView::Admin(admin.to_view()),
        expires_in: state.tokens.ttl_secs(),
        needs_profile: None,
    })
}

#[utoipa::path(
    post,
    path = "/clinics/login",
    tag = "auth",
    request_body = ClinicLoginReq,
    responses(
        (status = 200, description = "Signed in as clinic owner or admin", body = AuthRes),
        (status = 401, description = "Invalid credentials, disabled account or inactive clinic")
    )
)]
pub async fn login_clinic(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ClinicLoginReq>,
) -> ApiResult<AuthRes> {
    let login = state.clinics.login_staff(&req.user_name, &req.password)?;
    let token = state
        .tokens
        .issue(&login.staff_id, login.role, Some(&login.clinic_id))?;
    ok(AuthRes {
        token,
        principal: PrincipalView::ClinicStaff(login.view),
        expires_in: state.tokens.ttl_secs(),
        needs_profile: None,
    })
}

#[utoipa::path(
    post,
    path = "/clinics/doctors/login",
    tag = "auth",
    request_body = DoctorLoginReq,
    responses(
        (status = 200, description = "Signed in as doctor", body = AuthRes),
        (status = 401, description = "Invalid credentials, disabled account or inactive clinic")
    )
)]
pub async fn login_doctor(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<DoctorLoginReq>,
) -> ApiResult<AuthRes> {
    let login = state.clinics.login_doctor(&req.username, &req.password)?;
    let token = state
        .tokens
        .issue(&login.doctor_id, Role::Doctor, Some(&login.clinic_id))?;
    ok(AuthRes {
        token,
        principal: PrincipalView::Doctor(login.view),
        expires_in: state.tokens.ttl_secs(),
        needs_profile: None,
    })
}

#[utoipa::path(
    post,
    path = "/patients/auth/google",
    tag = "auth",
    request_body = GoogleAuthReq,
    responses(
        (status = 200, description = "Signed in as patient", body = AuthRes),
        (status = 400, description = "Google sign-in is not configured"),
        (status = 401, description = "Token rejected or account not active")
    )
)]
pub async fn patient_google(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<GoogleAuthReq>,
) -> ApiResult<AuthRes> {
    let verifier = state
        .google
        .clone()
        .ok_or_else(|| CoreError::BadRequest("Google sign-in is not configured".into()))?;
    let identity = verifier.verify(&req.id_token).await?;
    let patient = state.patients.auth_google(&identity)?;
    patient_auth_res(&state, patient)
}

#[utoipa::path(
    post,
    path = "/patients/auth/phone",
    tag = "auth",
    request_body = PhoneAuthReq,
    responses(
        (status = 200, description = "Signed in as patient", body = AuthRes),
        (status = 400, description = "Invalid phone number"),
        (status = 401, description = "Account not active")
    )
)]
pub async fn patient_phone(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<PhoneAuthReq>,
) -> ApiResult<AuthRes> {
    let patient = state
        .patients
        .auth_phone(&req.phone, req.preferred_language)?;
    patient_auth_res(&state, patient)
}
