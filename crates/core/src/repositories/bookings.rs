//! Booking lifecycle.
//!
//! Bookings are standalone documents referencing a clinic and, inside it, a service and
//! optionally a branch and doctor. Status moves along
//! `pending → confirmed → completed` with `cancelled` reachable from either open state.
//!
//! Patients only ever see their own bookings: reads and cancellation of a booking owned by
//! someone else report `NotFound`, never `Forbidden`.

use crate::config::CoreConfig;
use crate::constants::COUNTER_WRITE_ATTEMPTS;
use crate::models::{Booking, Clinic};
use crate::repositories::shared::{load_clinic, update_clinic, with_retries};
use crate::store::DocumentStore;
use crate::validation;
use crate::{CoreError, CoreResult, FieldErrors};
use api_shared::{BookingStatus, BookingView, CancelledBy, CreateBookingReq, UpdateBookingStatusReq};
use chrono::{DateTime, Utc};
use clinic_uuid::DocumentId;
use std::collections::BTreeMap;
use std::sync::Arc;

fn booking_not_found() -> CoreError {
    CoreError::NotFound("booking not found".into())
}

#[derive(Clone, Debug)]
pub struct BookingService {
    cfg: Arc<CoreConfig>,
    store: Arc<DocumentStore>,
}

impl BookingService {
    pub fn new(cfg: Arc<CoreConfig>, store: Arc<DocumentStore>) -> Self {
        Self { cfg, store }
    }

    /// Creates a `pending` booking for `patient_id`.
    ///
    /// `scheduledAt` is derived once from the date and time, read in the configured booking
    /// offset. There is no slot or double-booking check.
    ///
    /// # Errors
    ///
    /// - `Validation` for malformed ids, date or time, or when the service, branch or doctor
    ///   is not an active part of the clinic.
    /// - `NotFound` if the clinic does not exist or is not active.
    pub fn create(&self, patient_id: &DocumentId, req: CreateBookingReq) -> CoreResult<BookingView> {
        let mut errors = FieldErrors::new();
        let clinic_id = errors.check("clinicId", validation::document_id(&req.clinic_id));
        let service_id = errors.check("serviceId", validation::document_id(&req.service_id));
        let branch_id = req
            .branch_id
            .as_deref()
            .and_then(|b| errors.check("branchId", validation::document_id(b)));
        let doctor_id = req
            .doctor_id
            .as_deref()
            .and_then(|d| errors.check("doctorId", validation::document_id(d)));
        let date = errors.check("scheduledDate", validation::calendar_date(&req.scheduled_date));
        let time = errors.check("scheduledTime", validation::time_of_day(&req.scheduled_time));
        let (Some(clinic_id), Some(service_id), Some(date), Some(time)) =
            (clinic_id, service_id, date, time)
        else {
            return Err(CoreError::Validation(errors));
        };
        errors.finish()?;

        let clinic = self
            .store
            .get::<Clinic>(&clinic_id)?
            .filter(Clinic::is_active)
            .ok_or_else(|| CoreError::NotFound("clinic not found".into()))?;

        let mut errors = FieldErrors::new();
        if !clinic.service(&service_id).is_some_and(|s| s.is_active) {
            errors.add("serviceId", "service is not offered by this clinic");
        }
        if let Some(branch_id) = &branch_id {
            if !clinic.branch(branch_id).is_some_and(|b| b.is_active) {
                errors.add("branchId", "branch does not belong to this clinic");
            }
        }
        if let Some(doctor_id) = &doctor_id {
            if !clinic.doctor(doctor_id).is_some_and(|d| d.is_active) {
                errors.add("doctorId", "doctor does not belong to this clinic");
            }
        }
        errors.finish()?;

        let scheduled_at = date
            .and_time(time)
            .and_local_timezone(self.cfg.booking_utc_offset())
            .single()
            .ok_or_else(|| CoreError::validation("scheduledTime", "time does not exist"))?
            .with_timezone(&Utc);

        let now = Utc::now();
        let booking = Booking {
            id: DocumentId::new(),
            clinic_id: clinic_id.clone(),
            branch_id,
            service_id,
            doctor_id,
            patient_id: patient_id.clone(),
            scheduled_date: date.format("%Y-%m-%d").to_string(),
            scheduled_time: time.format("%H:%M").to_string(),
            scheduled_at,
            status: BookingStatus::Pending,
            price: None,
            cancel: None,
            notes: validation::optional_text(req.notes),
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        self.store.insert(&booking)?;
        tracing::info!("booking {} created for clinic {}", booking.id, clinic_id);

        let counted = with_retries("bookings counter", COUNTER_WRITE_ATTEMPTS, || {
            update_clinic(&self.store, &clinic_id, |c| {
                c.stats.bookings_count += 1;
                Ok(())
            })
        });
        if let Err(e) = counted {
            tracing::error!("clinic {}: bookings counter not incremented: {}", clinic_id, e);
        }

        Ok(booking.to_view(Some(&clinic)))
    }

    /// Enriches bookings with display names, loading each distinct clinic once.
    fn to_views(&self, bookings: Vec<Booking>) -> CoreResult<Vec<BookingView>> {
        let mut clinics: BTreeMap<DocumentId, Option<Clinic>> = BTreeMap::new();
        for booking in &bookings {
            if !clinics.contains_key(&booking.clinic_id) {
                let clinic = self.store.get::<Clinic>(&booking.clinic_id)?;
                clinics.insert(booking.clinic_id.clone(), clinic);
            }
        }
        Ok(bookings
            .iter()
            .map(|b| b.to_view(clinics.get(&b.clinic_id).and_then(Option::as_ref)))
            .collect())
    }

    fn sorted_newest_first(mut bookings: Vec<Booking>) -> Vec<Booking> {
        bookings.sort_by(|a, b| b.scheduled_at.cmp(&a.scheduled_at).then_with(|| a.id.cmp(&b.id)));
        bookings
    }

    pub fn list_mine(
        &self,
        patient_id: &DocumentId,
        status: Option<BookingStatus>,
    ) -> CoreResult<Vec<BookingView>> {
        let bookings = self.store.find::<Booking>(|b| {
            &b.patient_id == patient_id
                && b.deleted_at.is_none()
                && status.map_or(true, |s| b.status == s)
        })?;
        self.to_views(Self::sorted_newest_first(bookings))
    }

    pub fn get(&self, booking_id: &DocumentId, patient_id: &DocumentId) -> CoreResult<BookingView> {
        let booking = self
            .store
            .get::<Booking>(booking_id)?
            .filter(|b| &b.patient_id == patient_id && b.deleted_at.is_none())
            .ok_or_else(booking_not_found)?;
        let clinic = self.store.get::<Clinic>(&booking.clinic_id)?;
        Ok(booking.to_view(clinic.as_ref()))
    }

    /// The soonest open booking at or after `now`; ties go to the smaller id.
    pub fn next_upcoming(
        &self,
        patient_id: &DocumentId,
        now: DateTime<Utc>,
    ) -> CoreResult<Option<BookingView>> {
        let next = self
            .store
            .find::<Booking>(|b| {
                &b.patient_id == patient_id
                    && b.deleted_at.is_none()
                    && b.status.is_open()
                    && b.scheduled_at >= now
            })?
            .into_iter()
            .min_by(|a, b| a.scheduled_at.cmp(&b.scheduled_at).then_with(|| a.id.cmp(&b.id)));

        match next {
            Some(booking) => {
                let clinic = self.store.get::<Clinic>(&booking.clinic_id)?;
                Ok(Some(booking.to_view(clinic.as_ref())))
            }
            None => Ok(None),
        }
    }

    /// Cancels one of the patient's own open bookings.
    ///
    /// Missing, foreign and already-terminal bookings are all reported as `NotFound`.
    pub fn cancel(
        &self,
        booking_id: &DocumentId,
        patient_id: &DocumentId,
        reason: Option<String>,
    ) -> CoreResult<BookingView> {
        let reason = validation::optional_text(reason);
        let booking = self
            .store
            .update::<Booking, Booking>(booking_id, |b| {
                if &b.patient_id != patient_id || b.deleted_at.is_some() || !b.status.is_open() {
                    return Err(booking_not_found());
                }
                b.cancel(CancelledBy::Patient, reason, Utc::now());
                Ok(b.clone())
            })?
            .ok_or_else(booking_not_found)?;
        tracing::info!("booking {} cancelled by patient", booking.id);

        let clinic = self.store.get::<Clinic>(&booking.clinic_id)?;
        Ok(booking.to_view(clinic.as_ref()))
    }

    pub fn list_clinic_bookings(
        &self,
        clinic_id: &DocumentId,
        status: Option<BookingStatus>,
        doctor_id: Option<&DocumentId>,
    ) -> CoreResult<Vec<BookingView>> {
        let clinic = load_clinic(&self.store, clinic_id)?;
        let bookings = self.store.find::<Booking>(|b| {
            &b.clinic_id == clinic_id
                && b.deleted_at.is_none()
                && status.map_or(true, |s| b.status == s)
                && doctor_id.map_or(true, |d| b.doctor_id.as_ref() == Some(d))
        })?;
        Ok(Self::sorted_newest_first(bookings)
            .iter()
            .map(|b| b.to_view(Some(&clinic)))
            .collect())
    }

    pub fn list_doctor_bookings(
        &self,
        clinic_id: &DocumentId,
        doctor_id: &DocumentId,
    ) -> CoreResult<Vec<BookingView>> {
        self.list_clinic_bookings(clinic_id, None, Some(doctor_id))
    }

    /// Moves a clinic's booking along the status machine.
    ///
    /// Completing records the final price, defaulting to the service's current price.
    /// Cancelling records the clinic as the canceller.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the booking does not belong to `clinic_id`.
    /// - `Conflict` if the transition is not allowed from the current status.
    pub fn update_status(
        &self,
        clinic_id: &DocumentId,
        booking_id: &DocumentId,
        req: UpdateBookingStatusReq,
    ) -> CoreResult<BookingView> {
        let price = req
            .price
            .map(validation::price)
            .transpose()
            .map_err(|e| CoreError::validation("price", e))?;
        let reason = validation::optional_text(req.reason);
        let clinic = load_clinic(&self.store, clinic_id)?;

        let booking = self
            .store
            .update::<Booking, Booking>(booking_id, |b| {
                if &b.clinic_id != clinic_id || b.deleted_at.is_some() {
                    return Err(booking_not_found());
                }
                if !b.status.can_transition_to(req.status) {
                    return Err(CoreError::Conflict(format!(
                        "cannot move booking from {:?} to {:?}",
                        b.status, req.status
                    )));
                }
                let now = Utc::now();
                match req.status {
                    BookingStatus::Cancelled => b.cancel(CancelledBy::Clinic, reason, now),
                    next => {
                        if next == BookingStatus::Completed {
                            b.price = price.or_else(|| clinic.service(&b.service_id).map(|s| s.price));
                        }
                        b.status = next;
                        b.updated_at = now;
                    }
                }
                Ok(b.clone())
            })?
            .ok_or_else(booking_not_found)?;
        tracing::info!("clinic {}: booking {} is now {:?}", clinic_id, booking.id, booking.status);
        Ok(booking.to_view(Some(&clinic)))
    }
}
