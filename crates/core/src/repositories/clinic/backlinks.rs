//! Service ↔ doctor backlinks.
//!
//! A service lists the doctors who perform it (`doctorIds`) and each doctor lists their
//! services (`serviceIds`). For every service `S` and doctor `D` of a clinic:
//! `D ∈ S.doctorIds ⟺ S ∈ D.serviceIds`.
//!
//! Both sides live in the clinic document, so the doctor side is reconciled from the change
//! in `doctorIds` by [`ServiceDoctorDelta`] inside the same atomic update that writes the
//! service. Applying a delta is idempotent.

use crate::models::Clinic;
use clinic_uuid::DocumentId;

/// Doctors gained and lost by one service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceDoctorDelta {
    pub added: Vec<DocumentId>,
    pub removed: Vec<DocumentId>,
}

impl ServiceDoctorDelta {
    pub fn compute(old: &[DocumentId], new: &[DocumentId]) -> Self {
        Self {
            added: new.iter().filter(|id| !old.contains(id)).cloned().collect(),
            removed: old.iter().filter(|id| !new.contains(id)).cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Adds `service_id` to each added doctor and removes it from each removed doctor.
    ///
    /// Set semantics: applying the same delta twice leaves the clinic unchanged. Doctors
    /// that no longer exist are skipped, and nothing is added for a service the clinic no
    /// longer has.
    pub fn apply(&self, clinic: &mut Clinic, service_id: &DocumentId) {
        let service_exists = clinic.service(service_id).is_some();
        for doctor in &mut clinic.doctors {
            if service_exists
                && self.added.contains(&doctor.id)
                && !doctor.service_ids.contains(service_id)
            {
                doctor.service_ids.push(service_id.clone());
            }
            if self.removed.contains(&doctor.id) {
                doctor.service_ids.retain(|id| id != service_id);
            }
        }
    }
}

/// Checks the backlink invariant over a whole clinic.
#[cfg(test)]
pub(crate) fn backlinks_consistent(clinic: &Clinic) -> bool {
    let forward = clinic.services.iter().all(|s| {
        s.doctor_ids.iter().all(|d| {
            clinic
                .doctor(d)
                .is_some_and(|doctor| doctor.service_ids.contains(&s.id))
        })
    });
    let backward = clinic.doctors.iter().all(|d| {
        d.service_ids.iter().all(|s| {
            clinic
                .service(s)
                .is_some_and(|service| service.doctor_ids.contains(&d.id))
        })
    });
    forward && backward
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_delta() {
        let a = DocumentId::new();
        let b = DocumentId::new();
        let c = DocumentId::new();

        let delta = ServiceDoctorDelta::compute(&[a.clone(), b.clone()], &[b.clone(), c.clone()]);
        assert_eq!(delta.added, vec![c]);
        assert_eq!(delta.removed, vec![a]);

        assert!(ServiceDoctorDelta::compute(&[b.clone()], &[b]).is_empty());
    }
}
