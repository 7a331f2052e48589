//! HTTP routes, grouped by the principal they serve.

pub mod auth;
pub mod bookings;
pub mod clinics;
pub mod doctors;
pub mod health;
pub mod my_clinic;
pub mod patients;
pub mod public;

use crate::docs::ApiDoc;
use crate::error::ApiError;
use crate::state::AppState;
use axum::routing::{delete, get, patch, post};
use axum::Router;
use clinic_core::CoreError;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

async fn not_found() -> ApiError {
    CoreError::NotFound("route not found".into()).into()
}

/// Builds the complete application router.
pub fn router(state: AppState) -> Router {
    let my_clinic = Router::new()
        .route(
            "/",
            get(my_clinic::get_my_clinic).patch(my_clinic::update_my_clinic),
        )
        .route("/plan", get(my_clinic::plan_usage))
        .route("/branches", post(my_clinic::add_branch))
        .route(
            "/branches/:branch_id",
            patch(my_clinic::update_branch).delete(my_clinic::delete_branch),
        )
        .route(
            "/branches/:branch_id/status",
            patch(my_clinic::set_branch_status),
        )
        .route("/doctors", post(my_clinic::add_doctor))
        .route(
            "/doctors/:doctor_id",
            patch(my_clinic::update_doctor).delete(my_clinic::delete_doctor),
        )
        .route(
            "/doctors/:doctor_id/status",
            patch(my_clinic::set_doctor_status),
        )
        .route("/services", post(my_clinic::add_service))
        .route(
            "/services/:service_id",
            patch(my_clinic::update_service).delete(my_clinic::delete_service),
        )
        .route("/categories", post(my_clinic::add_category))
        .route(
            "/categories/:category_id",
            patch(my_clinic::update_category).delete(my_clinic::delete_category),
        )
        .route("/admins", post(my_clinic::add_admin))
        .route("/admins/:admin_id", delete(my_clinic::delete_admin))
        .route("/admins/:admin_id/status", patch(my_clinic::set_admin_status))
        .route("/bookings", get(my_clinic::list_bookings))
        .route(
            "/bookings/:booking_id/status",
            patch(my_clinic::update_booking_status),
        );

    Router::new()
        .route("/health", get(health::health))
        .route("/auth/loginAdmin", post(auth::login_admin))
        .route("/clinics/login", post(auth::login_clinic))
        .route("/clinics/doctors/login", post(auth::login_doctor))
        .route("/patients/auth/google", post(auth::patient_google))
        .route("/patients/auth/phone", post(auth::patient_phone))
        .route("/clinics/create", post(clinics::create_clinic))
        .route("/clinics", get(clinics::list_clinics))
        .route(
            "/clinics/:id",
            get(clinics::get_clinic).delete(clinics::delete_clinic),
        )
        .route("/clinics/:id/stop", patch(clinics::stop_clinic))
        .route("/clinics/:id/activate", patch(clinics::activate_clinic))
        .route("/clinics/:id/plan", patch(clinics::change_plan))
        .nest("/clinics/my-clinic", my_clinic)
        .route(
            "/clinics/doctors/me",
            get(doctors::get_me).patch(doctors::update_me),
        )
        .route("/clinics/doctors/me/schedule", patch(doctors::update_schedule))
        .route("/clinics/doctors/me/bookings", get(doctors::my_bookings))
        .route("/public/clinics", get(public::list_clinics))
        .route("/public/clinics/:unique_name", get(public::get_clinic))
        .route("/bookings", post(bookings::create_booking))
        .route("/bookings/me", get(bookings::my_bookings))
        .route("/bookings/next-upcoming", get(bookings::next_upcoming))
        .route("/bookings/:id", get(bookings::get_booking))
        .route("/bookings/:id/cancel", patch(bookings::cancel_booking))
        .route(
            "/patients/me",
            get(patients::get_me).patch(patients::update_me),
        )
        .route("/patients/me/complete", post(patients::complete_profile))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
