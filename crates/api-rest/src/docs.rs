//! OpenAPI document served at `/api-docs/openapi.json`.

use crate::routes::{auth, bookings, clinics, doctors, health, my_clinic, patients, public};
use api_shared::*;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(title = "Clinic booking API"),
    paths(
        health::health,
        auth::login_admin,
        auth::login_clinic,
        auth::login_doctor,
        auth::patient_google,
        auth::patient_phone,
        clinics::create_clinic,
        clinics::list_clinics,
        clinics::get_clinic,
        clinics::stop_clinic,
        clinics::activate_clinic,
        clinics::change_plan,
        clinics::delete_clinic,
        my_clinic::get_my_clinic,
        my_clinic::update_my_clinic,
        my_clinic::plan_usage,
        my_clinic::add_branch,
        my_clinic::update_branch,
        my_clinic::set_branch_status,
        my_clinic::delete_branch,
        my_clinic::add_doctor,
        my_clinic::update_doctor,
        my_clinic::set_doctor_status,
        my_clinic::delete_doctor,
        my_clinic::add_service,
        my_clinic::update_service,
        my_clinic::delete_service,
        my_clinic::add_category,
        my_clinic::update_category,
        my_clinic::delete_category,
        my_clinic::add_admin,
        my_clinic::set_admin_status,
        my_clinic::delete_admin,
        my_clinic::list_bookings,
        my_clinic::update_booking_status,
        doctors::get_me,
        doctors::update_me,
        doctors::update_schedule,
        doctors::my_bookings,
        public::list_clinics,
        public::get_clinic,
        bookings::create_booking,
        bookings::my_bookings,
        bookings::next_upcoming,
        bookings::get_booking,
        bookings::cancel_booking,
        patients::get_me,
        patients::update_me,
        patients::complete_profile,
    ),
    components(schemas(
        HealthRes,
        ErrorCode,
        Role,
        MessageRes,
        SetActiveReq,
        AdminLoginReq,
        ClinicLoginReq,
        DoctorLoginReq,
        GoogleAuthReq,
        PhoneAuthReq,
        AdminView,
        ClinicStaffView,
        PrincipalView,
        AuthRes,
        CreateClinicReq,
        ChangePlanReq,
        UpdateClinicReq,
        CreateBranchReq,
        UpdateBranchReq,
        CreateDoctorReq,
        UpdateDoctorReq,
        UpdateDoctorProfileReq,
        UpdateScheduleReq,
        CreateServiceReq,
        UpdateServiceReq,
        CategoryReq,
        CreateAdminReq,
        OwnerView,
        BranchView,
        DoctorView,
        PublicDoctorView,
        ServiceView,
        CategoryView,
        ClinicView,
        ClinicSummaryView,
        PublicClinicView,
        PlanUsageView,
        CreateBookingReq,
        CancelBookingReq,
        UpdateBookingStatusReq,
        CancellationView,
        BookingView,
        PatientView,
        CompleteProfileReq,
        UpdateProfileReq,
        Weekday,
        LunchBreak,
        WorkingDay,
        GeoPoint,
        PlanTier,
        PlanLimits,
        Plan,
        ClinicStatus,
        ClinicStats,
        OwnerRole,
        BookingStatus,
        CancelledBy,
        Language,
        Gender,
        PatientStatus,
        AuthType,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Sign-in for every principal"),
        (name = "clinics", description = "Platform administrator tenant management"),
        (name = "my-clinic", description = "Clinic owner and admin self-service"),
        (name = "doctors", description = "Doctor self-service"),
        (name = "public", description = "Public clinic directory"),
        (name = "bookings", description = "Patient bookings"),
        (name = "patients", description = "Patient profile"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` scheme referenced by `security(("bearer" = []))`.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
