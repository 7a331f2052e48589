use crate::models::Clinic;
use crate::store::{Collection, Document};
use api_shared::{BookingStatus, BookingView, CancellationView, CancelledBy};
use chrono::{DateTime, Utc};
use clinic_uuid::DocumentId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub clinic_id: DocumentId,
    #[serde(default)]
    pub branch_id: Option<DocumentId>,
    pub service_id: DocumentId,
    #[serde(default)]
    pub doctor_id: Option<DocumentId>,
    pub patient_id: DocumentId,
    pub scheduled_date: String,
    pub scheduled_time: String,
    /// Fixed at creation from date and time; never recomputed.
    pub scheduled_at: DateTime<Utc>,
    pub status: BookingStatus,
    /// Null until the booking is completed.
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub cancel: Option<Cancellation>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cancellation {
    pub by: CancelledBy,
    #[serde(default)]
    pub reason: Option<String>,
    pub cancelled_at: DateTime<Utc>,
}

impl Document for Booking {
    const COLLECTION: Collection = Collection::Bookings;

    fn id(&self) -> &DocumentId {
        &self.id
    }
}

impl Booking {
    /// Moves the booking to `cancelled`, recording who cancelled and when.
    pub fn cancel(&mut self, by: CancelledBy, reason: Option<String>, now: DateTime<Utc>) {
        self.status = BookingStatus::Cancelled;
        self.cancel = Some(Cancellation {
            by,
            reason,
            cancelled_at: now,
        });
        self.updated_at = now;
    }

    /// Builds the API view, filling display names from `clinic` when it is available.
    pub fn to_view(&self, clinic: Option<&Clinic>) -> BookingView {
        let branch = clinic.zip(self.branch_id.as_ref()).and_then(|(c, id)| c.branch(id));
        let service = clinic.and_then(|c| c.service(&self.service_id));
        let doctor = clinic.zip(self.doctor_id.as_ref()).and_then(|(c, id)| c.doctor(id));

        BookingView {
            id: self.id.to_string(),
            clinic_id: self.clinic_id.to_string(),
            clinic_name: clinic.map(|c| c.clinic_display_name.clone()),
            branch_id: self.branch_id.as_ref().map(DocumentId::to_string),
            branch_name: branch.map(|b| b.name.clone()),
            service_id: self.service_id.to_string(),
            service_name: service.map(|s| s.name.clone()),
            doctor_id: self.doctor_id.as_ref().map(DocumentId::to_string),
            doctor_name: doctor.map(|d| d.full_name.clone()),
            patient_id: self.patient_id.to_string(),
            scheduled_date: self.scheduled_date.clone(),
            scheduled_time: self.scheduled_time.clone(),
            scheduled_at: self.scheduled_at,
            status: self.status,
            price: self.price,
            cancel: self.cancel.as_ref().map(|c| CancellationView {
                by: c.by,
                reason: c.reason.clone(),
                cancelled_at: c.cancelled_at,
            }),
            notes: self.notes.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
