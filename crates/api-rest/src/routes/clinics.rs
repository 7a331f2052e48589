//! Platform administrator tenant management.

use crate::error::{created, ok, ApiResult, CreatedResult};
use crate::extract::{path_id, AdminAuth, ApiJson, ApiQuery};
use crate::state::AppState;
use api_shared::{
    ChangePlanReq, ClinicListQuery, ClinicSummaryView, ClinicView, CreateClinicReq, MessageRes,
};
use axum::extract::{Path, State};

#[utoipa::path(
    post,
    path = "/clinics/create",
    tag = "clinics",
    request_body = CreateClinicReq,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Clinic created with its owner", body = ClinicView),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Unique name or owner user name already taken")
    )
)]
pub async fn create_clinic(
    State(state): State<AppState>,
    _admin: AdminAuth,
    ApiJson(req): ApiJson<CreateClinicReq>,
) -> CreatedResult<ClinicView> {
    created(state.clinics.create_clinic(req)?)
}

#[utoipa::path(
    get,
    path = "/clinics",
    tag = "clinics",
    params(ClinicListQuery),
    security(("bearer" = [])),
    responses((status = 200, description = "Clinics matching the filters", body = [ClinicSummaryView]))
)]
pub async fn list_clinics(
    State(state): State<AppState>,
    _admin: AdminAuth,
    ApiQuery(query): ApiQuery<ClinicListQuery>,
) -> ApiResult<Vec<ClinicSummaryView>> {
    ok(state.clinics.list_clinics(&query)?)
}

#[utoipa::path(
    get,
    path = "/clinics/{id}",
    tag = "clinics",
    params(("id" = String, Path, description = "Clinic id")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Clinic", body = ClinicView),
        (status = 404, description = "No such clinic")
    )
)]
pub async fn get_clinic(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
) -> ApiResult<ClinicView> {
    ok(state.clinics.get_clinic(&path_id("id", &id)?)?)
}

#[utoipa::path(
    patch,
    path = "/clinics/{id}/stop",
    tag = "clinics",
    params(("id" = String, Path, description = "Clinic id")),
    security(("bearer" = [])),
    responses((status = 200, description = "Clinic stopped and soft-deleted", body = ClinicView))
)]
pub async fn stop_clinic(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
) -> ApiResult<ClinicView> {
    ok(state.clinics.stop_clinic(&path_id("id", &id)?)?)
}

#[utoipa::path(
    patch,
    path = "/clinics/{id}/activate",
    tag = "clinics",
    params(("id" = String, Path, description = "Clinic id")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Clinic active again", body = ClinicView),
        (status = 409, description = "Unique name taken in the meantime")
    )
)]
pub async fn activate_clinic(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
) -> ApiResult<ClinicView> {
    ok(state.clinics.activate_clinic(&path_id("id", &id)?)?)
}

#[utoipa::path(
    patch,
    path = "/clinics/{id}/plan",
    tag = "clinics",
    params(("id" = String, Path, description = "Clinic id")),
    request_body = ChangePlanReq,
    security(("bearer" = [])),
    responses((status = 200, description = "Plan and limits replaced", body = ClinicView))
)]
pub async fn change_plan(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<ChangePlanReq>,
) -> ApiResult<ClinicView> {
    ok(state.clinics.change_plan(&path_id("id", &id)?, req.plan)?)
}

#[utoipa::path(
    delete,
    path = "/clinics/{id}",
    tag = "clinics",
    params(("id" = String, Path, description = "Clinic id")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Clinic removed", body = MessageRes),
        (status = 404, description = "No such clinic")
    )
)]
pub async fn delete_clinic(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
) -> ApiResult<MessageRes> {
    state.clinics.delete_clinic(&path_id("id", &id)?)?;
    ok(MessageRes::new("clinic deleted"))
}
