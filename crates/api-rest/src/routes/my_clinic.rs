//! Clinic owner and admin self-service. The tenant is always the one named in the token.

use crate::error::{created, ok, ApiResult, CreatedResult};
use crate::extract::{path_id, ApiJson, ApiQuery, ClinicStaffAuth};
use crate::state::AppState;
use api_shared::{
    BookingView, BranchView, CategoryReq, CategoryView, ClinicBookingQuery, ClinicView,
    CreateAdminReq, CreateBranchReq, CreateDoctorReq, CreateServiceReq, DoctorView, MessageRes,
    OwnerView, PlanUsageView, ServiceView, SetActiveReq, UpdateBookingStatusReq,
    UpdateBranchReq, UpdateClinicReq, UpdateDoctorReq, UpdateServiceReq,
};
use axum::extract::{Path, State};

#[utoipa::path(
    get,
    path = "/clinics/my-clinic",
    tag = "my-clinic",
    security(("bearer" = [])),
    responses((status = 200, description = "The caller's clinic", body = ClinicView))
)]
pub async fn get_my_clinic(
    State(state): State<AppState>,
    staff: ClinicStaffAuth,
) -> ApiResult<ClinicView> {
    ok(state.clinics.get_clinic(&staff.clinic_id)?)
}

#[utoipa::path(
    patch,
    path = "/clinics/my-clinic",
    tag = "my-clinic",
    request_body = UpdateClinicReq,
    security(("bearer" = [])),
    responses((status = 200, description = "Profile updated", body = ClinicView))
)]
pub async fn update_my_clinic(
    State(state): State<AppState>,
    staff: ClinicStaffAuth,
    ApiJson(req): ApiJson<UpdateClinicReq>,
) -> ApiResult<ClinicView> {
    ok(state.clinics.update_profile(&staff.clinic_id, req)?)
}

#[utoipa::path(
    get,
    path = "/clinics/my-clinic/plan",
    tag = "my-clinic",
    security(("bearer" = [])),
    responses((status = 200, description = "Plan limits and current usage", body = PlanUsageView))
)]
pub async fn plan_usage(
    State(state): State<AppState>,
    staff: ClinicStaffAuth,
) -> ApiResult<PlanUsageView> {
    ok(state.clinics.plan_usage(&staff.clinic_id)?)
}

// ---- branches ----

#[utoipa::path(
    post,
    path = "/clinics/my-clinic/branches",
    tag = "my-clinic",
    request_body = CreateBranchReq,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Branch added", body = BranchView),
        (status = 409, description = "Plan limit reached")
    )
)]
pub async fn add_branch(
    State(state): State<AppState>,
    staff: ClinicStaffAuth,
    ApiJson(req): ApiJson<CreateBranchReq>,
) -> CreatedResult<BranchView> {
    created(state.clinics.add_branch(&staff.clinic_id, req)?)
}

#[utoipa::path(
    patch,
    path = "/clinics/my-clinic/branches/{branchId}",
    tag = "my-clinic",
    params(("branchId" = String, Path, description = "Branch id")),
    request_body = UpdateBranchReq,
    security(("bearer" = [])),
    responses((status = 200, description = "Branch updated", body = BranchView))
)]
pub async fn update_branch(
    State(state): State<AppState>,
    staff: ClinicStaffAuth,
    Path(branch_id): Path<String>,
    ApiJson(req): ApiJson<UpdateBranchReq>,
) -> ApiResult<BranchView> {
    let branch_id = path_id("branchId", &branch_id)?;
    ok(state.clinics.update_branch(&staff.clinic_id, &branch_id, req)?)
}

#[utoipa::path(
    patch,
    path = "/clinics/my-clinic/branches/{branchId}/status",
    tag = "my-clinic",
    params(("branchId" = String, Path, description = "Branch id")),
    request_body = SetActiveReq,
    security(("bearer" = [])),
    responses((status = 200, description = "Branch status set", body = BranchView))
)]
pub async fn set_branch_status(
    State(state): State<AppState>,
    staff: ClinicStaffAuth,
    Path(branch_id): Path<String>,
    ApiJson(req): ApiJson<SetActiveReq>,
) -> ApiResult<BranchView> {
    let branch_id = path_id("branchId", &branch_id)?;
    ok(state
        .clinics
        .set_branch_status(&staff.clinic_id, &branch_id, req.is_active)?)
}

#[utoipa::path(
    delete,
    path = "/clinics/my-clinic/branches/{branchId}",
    tag = "my-clinic",
    params(("branchId" = String, Path, description = "Branch id")),
    security(("bearer" = [])),
    responses((status = 200, description = "Branch removed", body = MessageRes))
)]
pub async fn delete_branch(
    State(state): State<AppState>,
    staff: ClinicStaffAuth,
    Path(branch_id): Path<String>,
) -> ApiResult<MessageRes> {
    let branch_id = path_id("branchId", &branch_id)?;
    state.clinics.remove_branch(&staff.clinic_id, &branch_id)?;
    ok(MessageRes::new("branch deleted"))
}

// ---- doctors ----

#[utoipa::path(
    post,
    path = "/clinics/my-clinic/doctors",
    tag = "my-clinic",
    request_body = CreateDoctorReq,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Doctor added", body = DoctorView),
        (status = 404, description = "Branch is not part of this clinic"),
        (status = 409, description = "No branch yet, or username taken")
    )
)]
pub async fn add_doctor(
    State(state): State<AppState>,
    staff: ClinicStaffAuth,
    ApiJson(req): ApiJson<CreateDoctorReq>,
) -> CreatedResult<DoctorView> {
    created(state.clinics.add_doctor(&staff.clinic_id, req)?)
}

#[utoipa::path(
    patch,
    path = "/clinics/my-clinic/doctors/{doctorId}",
    tag = "my-clinic",
    params(("doctorId" = String, Path, description = "Doctor id")),
    request_body = UpdateDoctorReq,
    security(("bearer" = [])),
    responses((status = 200, description = "Doctor updated", body = DoctorView))
)]
pub async fn update_doctor(
    State(state): State<AppState>,
    staff: ClinicStaffAuth,
    Path(doctor_id): Path<String>,
    ApiJson(req): ApiJson<UpdateDoctorReq>,
) -> ApiResult<DoctorView> {
    let doctor_id = path_id("doctorId", &doctor_id)?;
    ok(state.clinics.update_doctor(&staff.clinic_id, &doctor_id, req)?)
}

#[utoipa::path(
    patch,
    path = "/clinics/my-clinic/doctors/{doctorId}/status",
    tag = "my-clinic",
    params(("doctorId" = String, Path, description = "Doctor id")),
    request_body = SetActiveReq,
    security(("bearer" = [])),
    responses((status = 200, description = "Doctor status set", body = DoctorView))
)]
pub async fn set_doctor_status(
    State(state): State<AppState>,
    staff: ClinicStaffAuth,
    Path(doctor_id): Path<String>,
    ApiJson(req): ApiJson<SetActiveReq>,
) -> ApiResult<DoctorView> {
    let doctor_id = path_id("doctorId", &doctor_id)?;
    ok(state
        .clinics
        .set_doctor_status(&staff.clinic_id, &doctor_id, req.is_active)?)
}

#[utoipa::path(
    delete,
    path = "/clinics/my-clinic/doctors/{doctorId}",
    tag = "my-clinic",
    params(("doctorId" = String, Path, description = "Doctor id")),
    security(("bearer" = [])),
    responses((status = 200, description = "Doctor removed", body = MessageRes))
)]
pub async fn delete_doctor(
    State(state): State<AppState>,
    staff: ClinicStaffAuth,
    Path(doctor_id): Path<String>,
) -> ApiResult<MessageRes> {
    let doctor_id = path_id("doctorId", &doctor_id)?;
    state.clinics.remove_doctor(&staff.clinic_id, &doctor_id)?;
    ok(MessageRes::new("doctor deleted"))
}

// ---- services ----

#[utoipa::path(
    post,
    path = "/clinics/my-clinic/services",
    tag = "my-clinic",
    request_body = CreateServiceReq,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Service added; doctors linked back", body = ServiceView),
        (status = 409, description = "Plan limit reached")
    )
)]
pub async fn add_service(
    State(state): State<AppState>,
    staff: ClinicStaffAuth,
    ApiJson(req): ApiJson<CreateServiceReq>,
) -> CreatedResult<ServiceView> {
    created(state.clinics.add_service(&staff.clinic_id, req)?)
}

#[utoipa::path(
    patch,
    path = "/clinics/my-clinic/services/{serviceId}",
    tag = "my-clinic",
    params(("serviceId" = String, Path, description = "Service id")),
    request_body = UpdateServiceReq,
    security(("bearer" = [])),
    responses((status = 200, description = "Service updated", body = ServiceView))
)]
pub async fn update_service(
    State(state): State<AppState>,
    staff: ClinicStaffAuth,
    Path(service_id): Path<String>,
    ApiJson(req): ApiJson<UpdateServiceReq>,
) -> ApiResult<ServiceView> {
    let service_id = path_id("serviceId", &service_id)?;
    ok(state.clinics.update_service(&staff.clinic_id, &service_id, req)?)
}

#[utoipa::path(
    delete,
    path = "/clinics/my-clinic/services/{serviceId}",
    tag = "my-clinic",
    params(("serviceId" = String, Path, description = "Service id")),
    security(("bearer" = [])),
    responses((status = 200, description = "Service removed", body = MessageRes))
)]
pub async fn delete_service(
    State(state): State<AppState>,
    staff: ClinicStaffAuth,
    Path(service_id): Path<String>,
) -> ApiResult<MessageRes> {
    let service_id = path_id("serviceId", &service_id)?;
    state.clinics.remove_service(&staff.clinic_id, &service_id)?;
    ok(MessageRes::new("service deleted"))
}

// ---- categories ----

#[utoipa::path(
    post,
    path = "/clinics/my-clinic/categories",
    tag = "my-clinic",
    request_body = CategoryReq,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Category added", body = CategoryView),
        (status = 409, description = "Name already used in this clinic")
    )
)]
pub async fn add_category(
    State(state): State<AppState>,
    staff: ClinicStaffAuth,
    ApiJson(req): ApiJson<CategoryReq>,
) -> CreatedResult<CategoryView> {
    created(state.clinics.add_category(&staff.clinic_id, &req.name)?)
}

#[utoipa::path(
    patch,
    path = "/clinics/my-clinic/categories/{categoryId}",
    tag = "my-clinic",
    params(("categoryId" = String, Path, description = "Category id")),
    request_body = CategoryReq,
    security(("bearer" = [])),
    responses((status = 200, description = "Category renamed", body = CategoryView))
)]
pub async fn update_category(
    State(state): State<AppState>,
    staff: ClinicStaffAuth,
    Path(category_id): Path<String>,
    ApiJson(req): ApiJson<CategoryReq>,
) -> ApiResult<CategoryView> {
    let category_id = path_id("categoryId", &category_id)?;
    ok(state
        .clinics
        .update_category(&staff.clinic_id, &category_id, &req.name)?)
}

#[utoipa::path(
    delete,
    path = "/clinics/my-clinic/categories/{categoryId}",
    tag = "my-clinic",
    params(("categoryId" = String, Path, description = "Category id")),
    security(("bearer" = [])),
    responses((status = 200, description = "Category removed", body = MessageRes))
)]
pub async fn delete_category(
    State(state): State<AppState>,
    staff: ClinicStaffAuth,
    Path(category_id): Path<String>,
) -> ApiResult<MessageRes> {
    let category_id = path_id("categoryId", &category_id)?;
    state.clinics.remove_category(&staff.clinic_id, &category_id)?;
    ok(MessageRes::new("category deleted"))
}

// ---- admins ----

#[utoipa::path(
    post,
    path = "/clinics/my-clinic/admins",
    tag = "my-clinic",
    request_body = CreateAdminReq,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Admin added", body = OwnerView),
        (status = 409, description = "Plan limit reached or user name taken")
    )
)]
pub async fn add_admin(
    State(state): State<AppState>,
    staff: ClinicStaffAuth,
    ApiJson(req): ApiJson<CreateAdminReq>,
) -> CreatedResult<OwnerView> {
    created(state.clinics.add_admin(&staff.clinic_id, req)?)
}

#[utoipa::path(
    patch,
    path = "/clinics/my-clinic/admins/{adminId}/status",
    tag = "my-clinic",
    params(("adminId" = String, Path, description = "Admin id")),
    request_body = SetActiveReq,
    security(("bearer" = [])),
    responses((status = 200, description = "Admin status set", body = OwnerView))
)]
pub async fn set_admin_status(
    State(state): State<AppState>,
    staff: ClinicStaffAuth,
    Path(admin_id): Path<String>,
    ApiJson(req): ApiJson<SetActiveReq>,
) -> ApiResult<OwnerView> {
    let admin_id = path_id("adminId", &admin_id)?;
    ok(state
        .clinics
        .set_admin_status(&staff.clinic_id, &admin_id, req.is_active)?)
}

#[utoipa::path(
    delete,
    path = "/clinics/my-clinic/admins/{adminId}",
    tag = "my-clinic",
    params(("adminId" = String, Path, description = "Admin id")),
    security(("bearer" = [])),
    responses((status = 200, description = "Admin removed", body = MessageRes))
)]
pub async fn delete_admin(
    State(state): State<AppState>,
    staff: ClinicStaffAuth,
    Path(admin_id): Path<String>,
) -> ApiResult<MessageRes> {
    let admin_id = path_id("adminId", &admin_id)?;
    state.clinics.remove_admin(&staff.clinic_id, &admin_id)?;
    ok(MessageRes::new("admin deleted"))
}

// ---- bookings ----

#[utoipa::path(
    get,
    path = "/clinics/my-clinic/bookings",
    tag = "my-clinic",
    params(ClinicBookingQuery),
    security(("bearer" = [])),
    responses((status = 200, description = "Clinic bookings, latest first", body = [BookingView]))
)]
pub async fn list_bookings(
    State(state): State<AppState>,
    staff: ClinicStaffAuth,
    ApiQuery(query): ApiQuery<ClinicBookingQuery>,
) -> ApiResult<Vec<BookingView>> {
    let doctor_id = query
        .doctor_id
        .as_deref()
        .map(|d| path_id("doctorId", d))
        .transpose()?;
    ok(state
        .bookings
        .list_clinic_bookings(&staff.clinic_id, query.status, doctor_id.as_ref())?)
}

#[utoipa::path(
    patch,
    path = "/clinics/my-clinic/bookings/{bookingId}/status",
    tag = "my-clinic",
    params(("bookingId" = String, Path, description = "Booking id")),
    request_body = UpdateBookingStatusReq,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Booking moved to the new status", body = BookingView),
        (status = 409, description = "Transition not allowed")
    )
)]
pub async fn update_booking_status(
    State(state): State<AppState>,
    staff: ClinicStaffAuth,
    Path(booking_id): Path<String>,
    ApiJson(req): ApiJson<UpdateBookingStatusReq>,
) -> ApiResult<BookingView> {
    let booking_id = path_id("bookingId", &booking_id)?;
    ok(state
        .bookings
        .update_status(&staff.clinic_id, &booking_id, req)?)
}
