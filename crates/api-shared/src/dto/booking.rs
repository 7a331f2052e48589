use crate::dto::common::{BookingStatus, CancelledBy};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingReq {
    pub clinic_id: String,
    pub service_id: String,
    #[serde(default)]
    pub branch_id: Option<String>,
    #[serde(default)]
    pub doctor_id: Option<String>,
    /// `YYYY-MM-DD`
    pub scheduled_date: String,
    /// `HH:MM`
    pub scheduled_time: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookingListQuery {
    pub status: Option<BookingStatus>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct ClinicBookingQuery {
    pub status: Option<BookingStatus>,
    pub doctor_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CancelBookingReq {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateBookingStatusReq {
    pub status: BookingStatus,
    /// Final price when completing; defaults to the service price.
    #[serde(default)]
    pub price: Option<f64>,
    /// Cancellation reason when cancelling.
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancellationView {
    pub by: CancelledBy,
    pub reason: Option<String>,
    pub cancelled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingView {
    #[serde(rename = "_id")]
    pub id: String,
    pub clinic_id: String,
    pub clinic_name: Option<String>,
    pub branch_id: Option<String>,
    pub branch_name: Option<String>,
    pub service_id: String,
    pub service_name: Option<String>,
    pub doctor_id: Option<String>,
    pub doctor_name: Option<String>,
    pub patient_id: String,
    pub scheduled_date: String,
    pub scheduled_time: String,
    pub scheduled_at: DateTime<Utc>,
    pub status: BookingStatus,
    pub price: Option<f64>,
    pub cancel: Option<CancellationView>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
