//! Unauthenticated clinic directory.

use crate::error::{ok, ApiResult};
use crate::state::AppState;
use api_shared::PublicClinicView;
use axum::extract::{Path, State};

#[utoipa::path(
    get,
    path = "/public/clinics",
    tag = "public",
    responses((status = 200, description = "Active clinics", body = [PublicClinicView]))
)]
pub async fn list_clinics(State(state): State<AppState>) -> ApiResult<Vec<PublicClinicView>> {
    ok(state.clinics.list_public_clinics()?)
}

#[utoipa::path(
    get,
    path = "/public/clinics/{uniqueName}",
    tag = "public",
    params(("uniqueName" = String, Path, description = "Clinic unique name")),
    responses(
        (status = 200, description = "Active clinic with its active resources", body = PublicClinicView),
        (status = 404, description = "No active clinic with that name")
    )
)]
pub async fn get_clinic(
    State(state): State<AppState>,
    Path(unique_name): Path<String>,
) -> ApiResult<PublicClinicView> {
    ok(state.clinics.get_public_clinic(&unique_name)?)
}
