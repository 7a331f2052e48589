use crate::error::{ok, ApiResult};
use api_shared::{HealthRes, HealthService};

/// Health check endpoint
///
/// Returns the current health status of the REST API service.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Health check response", body = HealthRes))
)]
pub async fn health() -> ApiResult<HealthRes> {
    ok(HealthService::check_health())
}
