//! Patient identity: phone and Google sign-in, profile completion and edits.
//!
//! Phone, e-mail and Google subject are each sparse unique keys on the patients
//! collection. Sign-in is find-or-create; when two first contacts race, the losing insert
//! fails on the unique key and the lookup is retried once.

use crate::identity::GoogleIdentity;
use crate::models::Patient;
use crate::store::DocumentStore;
use crate::validation;
use crate::{CoreError, CoreResult, FieldErrors};
use api_shared::{AuthType, CompleteProfileReq, Language, PatientView, UpdateProfileReq};
use chrono::Utc;
use clinic_types::PhoneNumber;
use clinic_uuid::DocumentId;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct PatientService {
    store: Arc<DocumentStore>,
}

fn inactive() -> CoreError {
    CoreError::Unauthorized("patient account is not active".into())
}

impl PatientService {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Refreshes `lastLoginAt` on an active patient.
    fn record_login(&self, patient: Patient) -> CoreResult<Patient> {
        if !patient.is_active() {
            return Err(inactive());
        }
        self.store
            .update::<Patient, Patient>(&patient.id, |p| {
                p.last_login_at = Some(Utc::now());
                Ok(p.clone())
            })?
            .ok_or_else(inactive)
    }

    /// Inserts `fresh`, or returns `None` if a concurrent sign-in claimed one of its unique
    /// keys first.
    fn insert_new(&self, fresh: Patient) -> CoreResult<Option<Patient>> {
        match self.store.insert(&fresh) {
            Ok(()) => {
                tracing::info!("patient {} registered via {:?}", fresh.id, fresh.auth.auth_type);
                Ok(Some(fresh))
            }
            Err(CoreError::Conflict(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Signs a patient in by phone number, creating the account on first contact.
    ///
    /// Repeating the call with the same phone returns the same patient.
    pub fn auth_phone(&self, phone: &str, language: Option<Language>) -> CoreResult<Patient> {
        let phone = PhoneNumber::parse(phone)
            .map_err(|e| CoreError::validation("phone", e.to_string()))?
            .as_str()
            .to_string();

        for _ in 0..2 {
            let existing = self
                .store
                .find_one::<Patient>(|p| p.phone.as_deref() == Some(phone.as_str()))?;
            if let Some(existing) = existing {
                return self.record_login(existing);
            }
            let mut fresh = Patient::new(AuthType::Phone, language.unwrap_or_default(), Utc::now());
            fresh.phone = Some(phone.clone());
            if let Some(created) = self.insert_new(fresh)? {
                return Ok(created);
            }
        }
        Err(CoreError::Conflict("phone sign-in raced; try again".into()))
    }

    /// Signs a patient in with an already verified Google identity.
    ///
    /// Resolution order: Google subject, then verified e-mail (the subject is linked to that
    /// account), then a new account. New accounts start with an empty `fullName`.
    pub fn auth_google(&self, identity: &GoogleIdentity) -> CoreResult<Patient> {
        let verified_email = identity
            .email
            .as_deref()
            .filter(|_| identity.email_verified)
            .map(str::to_lowercase);

        for _ in 0..2 {
            if let Some(existing) = self
                .store
                .find_one::<Patient>(|p| p.google_id.as_deref() == Some(identity.subject.as_str()))?
            {
                return self.record_login(existing);
            }

            if let Some(email) = &verified_email {
                let by_email = self
                    .store
                    .find_one::<Patient>(|p| p.email.as_deref() == Some(email.as_str()))?;
                if let Some(existing) = by_email {
                    if !existing.is_active() {
                        return Err(inactive());
                    }
                    let linked = self
                        .store
                        .update::<Patient, Patient>(&existing.id, |p| {
                            p.google_id = Some(identity.subject.clone());
                            if p.avatar_url.is_none() {
                                p.avatar_url = identity.picture.clone();
                            }
                            p.last_login_at = Some(Utc::now());
                            p.updated_at = Utc::now();
                            Ok(p.clone())
                        })?
                        .ok_or_else(inactive)?;
                    tracing::info!("patient {} linked to a Google account", linked.id);
                    return Ok(linked);
                }
            }

            let mut fresh = Patient::new(AuthType::Google, Language::default(), Utc::now());
            fresh.google_id = Some(identity.subject.clone());
            fresh.email = verified_email.clone();
            fresh.avatar_url = identity.picture.clone();
            if let Some(created) = self.insert_new(fresh)? {
                return Ok(created);
            }
        }
        Err(CoreError::Conflict("Google sign-in raced; try again".into()))
    }

    /// Loads the patient behind a token, rejecting blocked or deleted accounts.
    pub fn require_active(&self, patient_id: &DocumentId) -> CoreResult<Patient> {
        self.store
            .get::<Patient>(patient_id)?
            .filter(Patient::is_active)
            .ok_or_else(inactive)
    }

    pub fn get_me(&self, patient_id: &DocumentId) -> CoreResult<PatientView> {
        Ok(self.require_active(patient_id)?.to_view())
    }

    /// Fills in the profile after first sign-in. `fullName` is required, and so is `phone`
    /// when the account does not have one yet.
    pub fn complete_profile(
        &self,
        patient_id: &DocumentId,
        req: CompleteProfileReq,
    ) -> CoreResult<PatientView> {
        let mut errors = FieldErrors::new();
        let full_name = errors.check("fullName", validation::required_text(&req.full_name));
        let age = errors.check("age", req.age.try_map(validation::age));
        let email = errors.check("email", req.email.try_map(|e| validation::email(&e)));
        let phone = match req.phone.as_deref() {
            Some(p) => errors
                .check("phone", PhoneNumber::parse(p))
                .map(|p| Some(p.as_str().to_string())),
            None => Some(None),
        };
        let (Some(full_name), Some(age), Some(email), Some(phone)) = (full_name, age, email, phone)
        else {
            return Err(CoreError::Validation(errors));
        };
        errors.finish()?;

        let patient = self
            .store
            .update::<Patient, Patient>(patient_id, |p| {
                if !p.is_active() {
                    return Err(inactive());
                }
                if p.phone.is_none() && phone.is_none() {
                    return Err(CoreError::validation("phone", "phone is required"));
                }
                p.full_name = full_name;
                if phone.is_some() {
                    p.phone = phone;
                }
                age.apply_to(&mut p.age);
                req.gender.apply_to(&mut p.gender);
                email.apply_to(&mut p.email);
                if let Some(language) = req.preferred_language {
                    p.preferred_language = language;
                }
                p.updated_at = Utc::now();
                Ok(p.clone())
            })?
            .ok_or_else(inactive)?;
        Ok(patient.to_view())
    }

    /// Partial profile edit. Omitted fields stay, `null` clears, a value replaces.
    pub fn update_profile(
        &self,
        patient_id: &DocumentId,
        req: UpdateProfileReq,
    ) -> CoreResult<PatientView> {
        let mut errors = FieldErrors::new();
        let full_name = match req.full_name.as_deref() {
            Some(name) => errors.check("fullName", validation::required_text(name)).map(Some),
            None => Some(None),
        };
        let age = errors.check("age", req.age.try_map(validation::age));
        let email = errors.check("email", req.email.try_map(|e| validation::email(&e)));
        let (Some(full_name), Some(age), Some(email)) = (full_name, age, email) else {
            return Err(CoreError::Validation(errors));
        };
        errors.finish()?;

        let patient = self
            .store
            .update::<Patient, Patient>(patient_id, |p| {
                if !p.is_active() {
                    return Err(inactive());
                }
                if let Some(name) = full_name {
                    p.full_name = name;
                }
                age.apply_to(&mut p.age);
                req.gender.apply_to(&mut p.gender);
                email.apply_to(&mut p.email);
                req.avatar_url.apply_to(&mut p.avatar_url);
                if let Some(language) = req.preferred_language {
                    p.preferred_language = language;
                }
                p.updated_at = Utc::now();
                Ok(p.clone())
            })?
            .ok_or_else(inactive)?;
        Ok(patient.to_view())
    }
}
