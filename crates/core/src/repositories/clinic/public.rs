use super::ClinicService;
use crate::models::Clinic;
use crate::{CoreError, CoreResult};
use api_shared::PublicClinicView;

impl ClinicService {
    /// Active clinics for the patient app, sorted by display name.
    pub fn list_public_clinics(&self) -> CoreResult<Vec<PublicClinicView>> {
        let mut clinics = self.store.find::<Clinic>(Clinic::is_active)?;
        clinics.sort_by_key(|c| c.clinic_display_name.to_lowercase());
        Ok(clinics.iter().map(Clinic::to_public).collect())
    }

    pub fn get_public_clinic(&self, unique_name: &str) -> CoreResult<PublicClinicView> {
        let wanted = unique_name.trim().to_lowercase();
        self.store
            .find_one::<Clinic>(|c| c.is_active() && c.clinic_unique_name == wanted)?
            .map(|c| c.to_public())
            .ok_or_else(|| CoreError::NotFound("clinic not found".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::CoreError;
    use api_shared::PlanTier;
    use tempfile::TempDir;

    #[test]
    fn test_public_catalog_hides_inactive() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let (service, _store) = test_service(temp_dir.path());
        let cid = clinic_id(
            &service
                .create_clinic(create_req("city-clinic", "owner1", PlanTier::Pro))
                .unwrap(),
        );
        service
            .create_clinic(create_req("other-clinic", "owner2", PlanTier::Pro))
            .unwrap();
        let main = service.add_branch(&cid, branch_req("Main")).unwrap();
        let closed = service.add_branch(&cid, branch_req("Closed")).unwrap();
        service.set_branch_status(&cid, &id(&closed.id), false).unwrap();
        service.add_doctor(&cid, doctor_req("drwho", &main.id)).unwrap();

        let public = service.get_public_clinic("City-Clinic").unwrap();
        assert_eq!(public.branches.len(), 1);
        assert_eq!(public.doctors.len(), 1);
        let json = serde_json::to_string(&public).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("drwho"));

        service.stop_clinic(&cid).unwrap();
        assert_eq!(service.list_public_clinics().unwrap().len(), 1);
        assert!(matches!(
            service.get_public_clinic("city-clinic"),
            Err(CoreError::NotFound(_))
        ));
    }
}
