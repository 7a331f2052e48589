use super::backlinks::ServiceDoctorDelta;
use super::ClinicService;
use crate::models::{Clinic, Service};
use crate::repositories::shared::update_clinic;
use crate::validation;
use crate::{CoreError, CoreResult, FieldErrors};
use api_shared::{CreateServiceReq, ServiceView, UpdateServiceReq};
use chrono::Utc;
use clinic_types::Patch;
use clinic_uuid::DocumentId;

fn service_not_found() -> CoreError {
    CoreError::NotFound("service not found".into())
}

/// Checks that every referenced branch, doctor and category belongs to `clinic`.
fn check_references(
    clinic: &Clinic,
    branch_ids: Option<&[DocumentId]>,
    doctor_ids: Option<&[DocumentId]>,
    category_id: Option<&DocumentId>,
) -> CoreResult<()> {
    let mut errors = FieldErrors::new();
    if branch_ids.is_some_and(|ids| ids.iter().any(|id| clinic.branch(id).is_none())) {
        errors.add("branchIds", "unknown branch for this clinic");
    }
    if doctor_ids.is_some_and(|ids| ids.iter().any(|id| clinic.doctor(id).is_none())) {
        errors.add("doctorIds", "unknown doctor for this clinic");
    }
    if category_id.is_some_and(|id| clinic.category(id).is_none()) {
        errors.add("categoryId", "unknown category for this clinic");
    }
    errors.finish()
}

impl ClinicService {
    /// Adds a service, subject to the plan's `maxServices`, and links it from each of its
    /// doctors in the same write.
    pub fn add_service(&self, clinic_id: &DocumentId, req: CreateServiceReq) -> CoreResult<ServiceView> {
        let mut errors = FieldErrors::new();
        let name = errors.check("name", validation::required_text(&req.name));
        errors.check("durationMinutes", validation::duration_minutes(req.duration_minutes));
        errors.check("price", validation::price(req.price));
        let branch_ids = errors.check("branchIds", validation::document_ids(&req.branch_ids));
        let doctor_ids = errors.check("doctorIds", validation::document_ids(&req.doctor_ids));
        let category_id = match req.category_id.as_deref().map(str::trim) {
            Some("") | None => Some(None),
            Some(raw) => errors
                .check("categoryId", validation::document_id(raw))
                .map(Some),
        };
        let (Some(name), Some(branch_ids), Some(doctor_ids), Some(category_id)) =
            (name, branch_ids, doctor_ids, category_id)
        else {
            return Err(CoreError::Validation(errors));
        };
        errors.finish()?;

        let now = Utc::now();
        let service = Service {
            id: DocumentId::new(),
            name,
            description: validation::optional_text(req.description),
            category_id,
            duration_minutes: req.duration_minutes,
            price: req.price,
            is_active: true,
            branch_ids,
            doctor_ids,
            created_at: now,
            updated_at: now,
        };

        update_clinic(&self.store, clinic_id, |clinic| {
            self.check_limit(clinic.services.len(), clinic.plan.limits.max_services, "services")?;
            check_references(
                clinic,
                Some(service.branch_ids.as_slice()),
                Some(service.doctor_ids.as_slice()),
                service.category_id.as_ref(),
            )?;
            clinic.services.push(service.clone());
            ServiceDoctorDelta::compute(&[], &service.doctor_ids).apply(clinic, &service.id);
            Ok(())
        })?;
        tracing::info!("clinic {}: added service {}", clinic_id, service.id);
        Ok(service.to_view())
    }

    /// Partial update. A change to `doctorIds` is propagated to the affected doctors in the
    /// same write.
    pub fn update_service(
        &self,
        clinic_id: &DocumentId,
        service_id: &DocumentId,
        req: UpdateServiceReq,
    ) -> CoreResult<ServiceView> {
        let mut errors = FieldErrors::new();
        let name = match req.name.as_deref() {
            Some(n) => errors.check("name", validation::required_text(n)),
            None => None,
        };
        if let Some(minutes) = req.duration_minutes {
            errors.check("durationMinutes", validation::duration_minutes(minutes));
        }
        if let Some(price) = req.price {
            errors.check("price", validation::price(price));
        }
        let branch_ids = match req.branch_ids.as_deref() {
            Some(ids) => errors.check("branchIds", validation::document_ids(ids)),
            None => None,
        };
        let doctor_ids = match req.doctor_ids.as_deref() {
            Some(ids) => errors.check("doctorIds", validation::document_ids(ids)),
            None => None,
        };
        let category_id = match req.category_id {
            Patch::Absent => Patch::Absent,
            Patch::Null => Patch::Null,
            Patch::Value(raw) => match errors.check("categoryId", validation::document_id(&raw)) {
                Some(id) => Patch::Value(id),
                None => Patch::Absent,
            },
        };
        errors.finish()?;

        let description = validation::patch_text(req.description);
        update_clinic(&self.store, clinic_id, |clinic| {
            let category_ref = match &category_id {
                Patch::Value(id) => Some(id),
                _ => None,
            };
            check_references(
                clinic,
                branch_ids.as_deref(),
                doctor_ids.as_deref(),
                category_ref,
            )?;

            let service = clinic.service_mut(service_id).ok_or_else(service_not_found)?;
            let old_doctors = service.doctor_ids.clone();
            if let Some(name) = name {
                service.name = name;
            }
            description.apply_to(&mut service.description);
            category_id.apply_to(&mut service.category_id);
            if let Some(minutes) = req.duration_minutes {
                service.duration_minutes = minutes;
            }
            if let Some(price) = req.price {
                service.price = price;
            }
            if let Some(active) = req.is_active {
                service.is_active = active;
            }
            if let Some(ids) = branch_ids {
                service.branch_ids = ids;
            }
            if let Some(ids) = doctor_ids {
                service.doctor_ids = ids;
            }
            service.updated_at = Utc::now();

            let view = service.to_view();
            ServiceDoctorDelta::compute(&old_doctors, &service.doctor_ids).apply(clinic, service_id);
            Ok(view)
        })
    }

    /// Removes a service and strips it from every doctor's `serviceIds`.
    pub fn remove_service(&self, clinic_id: &DocumentId, service_id: &DocumentId) -> CoreResult<()> {
        update_clinic(&self.store, clinic_id, |clinic| {
            let before = clinic.services.len();
            clinic.services.retain(|s| &s.id != service_id);
            if clinic.services.len() == before {
                return Err(service_not_found());
            }
            for doctor in &mut clinic.doctors {
                doctor.service_ids.retain(|id| id != service_id);
            }
            Ok(())
        })?;
        tracing::info!("clinic {}: removed service {}", clinic_id, service_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::backlinks::{backlinks_consistent, ServiceDoctorDelta};
    use crate::repositories::shared::update_clinic;
    use super::super::test_support::*;
    use crate::models::Clinic;
    use crate::CoreError;
    use api_shared::{CreateServiceReq, PlanTier, UpdateServiceReq};
    use clinic_uuid::DocumentId;
    use tempfile::TempDir;

    fn service_req(name: &str, doctor_ids: Vec<String>) -> CreateServiceReq {
        CreateServiceReq {
            name: name.into(),
            description: None,
            category_id: None,
            duration_minutes: 30,
            price: 100_000.0,
            branch_ids: Vec::new(),
            doctor_ids,
        }
    }

    struct Fixture {
        _temp_dir: TempDir,
        service: super::ClinicService,
        store: std::sync::Arc<crate::store::DocumentStore>,
        cid: DocumentId,
        branch_id: String,
    }

    fn fixture(plan: PlanTier) -> Fixture {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let (service, store) = test_service(temp_dir.path());
        let cid = clinic_id(
            &service
                .create_clinic(create_req("city-clinic", "owner1", plan))
                .unwrap(),
        );
        let branch_id = service.add_branch(&cid, branch_req("Main")).unwrap().id;
        Fixture {
            _temp_dir: temp_dir,
            service,
            store,
            cid,
            branch_id,
        }
    }

    impl Fixture {
        fn clinic(&self) -> Clinic {
            self.store.get(&self.cid).unwrap().unwrap()
        }

        fn doctor(&self, username: &str) -> String {
            self.service
                .add_doctor(&self.cid, doctor_req(username, &self.branch_id))
                .unwrap()
                .id
        }
    }

    #[test]
    fn test_add_service_links_doctors_both_ways() {
        let f = fixture(PlanTier::Pro);
        let d1 = f.doctor("doc1");
        let d2 = f.doctor("doc2");

        let svc = f
            .service
            .add_service(&f.cid, service_req("Checkup", vec![d1.clone(), d2.clone()]))
            .unwrap();

        let clinic = f.clinic();
        assert!(backlinks_consistent(&clinic));
        assert_eq!(
            clinic.doctor(&id(&d1)).unwrap().service_ids,
            vec![id(&svc.id)]
        );
        assert_eq!(clinic.stats.services_count, 1);
        assert_counts_match(&clinic);
    }

    #[test]
    fn test_update_service_moves_backlinks() {
        // Scenario: doctorIds [D1, D2] -> [D2, D3].
        let f = fixture(PlanTier::Pro);
        let d1 = f.doctor("doc1");
        let d2 = f.doctor("doc2");
        let d3 = f.doctor("doc3");
        let svc = f
            .service
            .add_service(&f.cid, service_req("Checkup", vec![d1.clone(), d2.clone()]))
            .unwrap();
        let sid = id(&svc.id);

        let req = UpdateServiceReq {
            doctor_ids: Some(vec![d2.clone(), d3.clone()]),
            ..Default::default()
        };
        let updated = f.service.update_service(&f.cid, &sid, req).unwrap();
        assert_eq!(updated.doctor_ids, vec![d2.clone(), d3.clone()]);

        let clinic = f.clinic();
        assert!(!clinic.doctor(&id(&d1)).unwrap().service_ids.contains(&sid));
        assert!(clinic.doctor(&id(&d2)).unwrap().service_ids.contains(&sid));
        assert!(clinic.doctor(&id(&d3)).unwrap().service_ids.contains(&sid));
        assert!(backlinks_consistent(&clinic));
    }

    #[test]
    fn test_remove_doctor_and_service_keep_backlinks_consistent() {
        let f = fixture(PlanTier::Pro);
        let d1 = f.doctor("doc1");
        let d2 = f.doctor("doc2");
        let s1 = f
            .service
            .add_service(&f.cid, service_req("A", vec![d1.clone(), d2.clone()]))
            .unwrap();
        f.service
            .add_service(&f.cid, service_req("B", vec![d1.clone()]))
            .unwrap();

        f.service.remove_doctor(&f.cid, &id(&d1)).unwrap();
        let clinic = f.clinic();
        assert!(backlinks_consistent(&clinic));
        assert_counts_match(&clinic);

        f.service.remove_service(&f.cid, &id(&s1.id)).unwrap();
        let clinic = f.clinic();
        assert!(clinic.doctor(&id(&d2)).unwrap().service_ids.is_empty());
        assert!(backlinks_consistent(&clinic));
        assert_counts_match(&clinic);
    }

    #[test]
    fn test_stale_delta_does_not_relink_removed_service() {
        let f = fixture(PlanTier::Pro);
        let d1 = f.doctor("doc1");
        let svc = f
            .service
            .add_service(&f.cid, service_req("Checkup", vec![d1.clone()]))
            .unwrap();
        let sid = id(&svc.id);
        f.service.remove_service(&f.cid, &sid).unwrap();

        // A delta computed before the removal arrives afterwards.
        let delta = ServiceDoctorDelta::compute(&[], &[id(&d1)]);
        update_clinic(&f.store, &f.cid, |clinic| {
            delta.apply(clinic, &sid);
            Ok(())
        })
        .unwrap();

        let clinic = f.clinic();
        assert!(clinic.doctor(&id(&d1)).unwrap().service_ids.is_empty());
        assert!(backlinks_consistent(&clinic));
    }

    #[test]
    fn test_add_service_rejects_unknown_references() {
        let f = fixture(PlanTier::Pro);
        let err = f
            .service
            .add_service(
                &f.cid,
                service_req("Checkup", vec![DocumentId::new().to_string()]),
            )
            .unwrap_err();
        match err {
            CoreError::Validation(fields) => assert!(fields.get("doctorIds").is_some()),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(f.clinic().services.is_empty());
    }

    #[test]
    fn test_starter_plan_service_limit() {
        let f = fixture(PlanTier::Starter);
        for i in 0..5 {
            f.service
                .add_service(&f.cid, service_req(&format!("S{i}"), Vec::new()))
                .unwrap();
        }
        let err = f
            .service
            .add_service(&f.cid, service_req("S5", Vec::new()))
            .unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
        assert_eq!(f.clinic().stats.services_count, 5);
    }

    #[test]
    fn test_remove_branch_strips_service_branch_ids() {
        let f = fixture(PlanTier::Pro);
        let mut req = service_req("Checkup", Vec::new());
        req.branch_ids = vec![f.branch_id.clone()];
        let svc = f.service.add_service(&f.cid, req).unwrap();

        f.service.remove_branch(&f.cid, &id(&f.branch_id)).unwrap();
        let clinic = f.clinic();
        assert!(clinic.service(&id(&svc.id)).unwrap().branch_ids.is_empty());
        assert_eq!(clinic.stats.branches_count, 0);
    }
}
