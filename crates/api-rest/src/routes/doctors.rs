//! Doctor self-service.

use crate::error::{ok, ApiResult};
use crate::extract::{ApiJson, DoctorAuth};
use crate::state::AppState;
use api_shared::{BookingView, DoctorView, UpdateDoctorProfileReq, UpdateScheduleReq};
use axum::extract::State;

#[utoipa::path(
    get,
    path = "/clinics/doctors/me",
    tag = "doctors",
    security(("bearer" = [])),
    responses((status = 200, description = "The signed-in doctor", body = DoctorView))
)]
pub async fn get_me(State(state): State<AppState>, doctor: DoctorAuth) -> ApiResult<DoctorView> {
    ok(state.clinics.get_doctor(&doctor.clinic_id, &doctor.id)?)
}

#[utoipa::path(
    patch,
    path = "/clinics/doctors/me",
    tag = "doctors",
    request_body = UpdateDoctorProfileReq,
    security(("bearer" = [])),
    responses((status = 200, description = "Profile updated", body = DoctorView))
)]
pub async fn update_me(
    State(state): State<AppState>,
    doctor: DoctorAuth,
    ApiJson(req): ApiJson<UpdateDoctorProfileReq>,
) -> ApiResult<DoctorView> {
    ok(state
        .clinics
        .update_doctor_profile(&doctor.clinic_id, &doctor.id, req)?)
}

#[utoipa::path(
    patch,
    path = "/clinics/doctors/me/schedule",
    tag = "doctors",
    request_body = UpdateScheduleReq,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Weekly schedule replaced", body = DoctorView),
        (status = 400, description = "Bad time format or lunch break outside working hours")
    )
)]
pub async fn update_schedule(
    State(state): State<AppState>,
    doctor: DoctorAuth,
    ApiJson(req): ApiJson<UpdateScheduleReq>,
) -> ApiResult<DoctorView> {
    ok(state
        .clinics
        .update_doctor_schedule(&doctor.clinic_id, &doctor.id, req.schedule)?)
}

#[utoipa::path(
    get,
    path = "/clinics/doctors/me/bookings",
    tag = "doctors",
    security(("bearer" = [])),
    responses((status = 200, description = "Bookings assigned to the doctor", body = [BookingView]))
)]
pub async fn my_bookings(
    State(state): State<AppState>,
    doctor: DoctorAuth,
) -> ApiResult<Vec<BookingView>> {
    ok(state
        .bookings
        .list_doctor_bookings(&doctor.clinic_id, &doctor.id)?)
}
