//! Patient-facing booking endpoints.

use crate::error::{created, ok, ApiResult, CreatedResult};
use crate::extract::{path_id, ApiJson, ApiQuery, PatientAuth};
use crate::state::AppState;
use api_shared::{BookingListQuery, BookingView, CancelBookingReq, CreateBookingReq};
use axum::extract::{Path, State};
use chrono::Utc;

#[utoipa::path(
    post,
    path = "/bookings",
    tag = "bookings",
    request_body = CreateBookingReq,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Booking created as pending", body = BookingView),
        (status = 400, description = "Unknown or inactive service, branch or doctor"),
        (status = 404, description = "Clinic missing or not active")
    )
)]
pub async fn create_booking(
    State(state): State<AppState>,
    auth: PatientAuth,
    ApiJson(req): ApiJson<CreateBookingReq>,
) -> CreatedResult<BookingView> {
    created(state.bookings.create(&auth.patient.id, req)?)
}

#[utoipa::path(
    get,
    path = "/bookings/me",
    tag = "bookings",
    params(BookingListQuery),
    security(("bearer" = [])),
    responses((status = 200, description = "The patient's bookings, latest first", body = [BookingView]))
)]
pub async fn my_bookings(
    State(state): State<AppState>,
    auth: PatientAuth,
    ApiQuery(query): ApiQuery<BookingListQuery>,
) -> ApiResult<Vec<BookingView>> {
    ok(state.bookings.list_mine(&auth.patient.id, query.status)?)
}

#[utoipa::path(
    get,
    path = "/bookings/next-upcoming",
    tag = "bookings",
    security(("bearer" = [])),
    responses((status = 200, description = "Earliest future open booking, or null", body = Option<BookingView>))
)]
pub async fn next_upcoming(
    State(state): State<AppState>,
    auth: PatientAuth,
) -> ApiResult<Option<BookingView>> {
    ok(state.bookings.next_upcoming(&auth.patient.id, Utc::now())?)
}

#[utoipa::path(
    get,
    path = "/bookings/{id}",
    tag = "bookings",
    params(("id" = String, Path, description = "Booking id")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Booking", body = BookingView),
        (status = 404, description = "No such booking for this patient")
    )
)]
pub async fn get_booking(
    State(state): State<AppState>,
    auth: PatientAuth,
    Path(id): Path<String>,
) -> ApiResult<BookingView> {
    ok(state.bookings.get(&path_id("id", &id)?, &auth.patient.id)?)
}

#[utoipa::path(
    patch,
    path = "/bookings/{id}/cancel",
    tag = "bookings",
    params(("id" = String, Path, description = "Booking id")),
    request_body(content = CancelBookingReq, description = "Optional; the reason may be omitted"),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Booking cancelled", body = BookingView),
        (status = 404, description = "Not found, not owned, or no longer cancellable")
    )
)]
pub async fn cancel_booking(
    State(state): State<AppState>,
    auth: PatientAuth,
    Path(id): Path<String>,
    body: Option<ApiJson<CancelBookingReq>>,
) -> ApiResult<BookingView> {
    let req = body.map(|ApiJson(req)| req).unwrap_or_default();
    ok(state
        .bookings
        .cancel(&path_id("id", &id)?, &auth.patient.id, req.reason)?)
}
