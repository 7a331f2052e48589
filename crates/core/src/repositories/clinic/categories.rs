use super::ClinicService;
use crate::models::Category;
use crate::repositories::shared::{load_clinic, update_clinic};
use crate::validation;
use crate::{CoreError, CoreResult};
use api_shared::CategoryView;
use clinic_uuid::DocumentId;

fn category_not_found() -> CoreError {
    CoreError::NotFound("category not found".into())
}

fn validated_name(name: &str) -> CoreResult<String> {
    validation::required_text(name).map_err(|e| CoreError::validation("name", e.to_string()))
}

fn ensure_name_free(categories: &[Category], name: &str, except: Option<&DocumentId>) -> CoreResult<()> {
    let wanted = name.to_lowercase();
    if categories
        .iter()
        .any(|c| Some(&c.id) != except && c.name.to_lowercase() == wanted)
    {
        return Err(CoreError::Conflict(format!("category '{name}' already exists")));
    }
    Ok(())
}

// Categories are loaded, edited in memory and written back as a whole list. A concurrent
// category edit between the read and the write is overwritten.
impl ClinicService {
    fn write_categories(&self, clinic_id: &DocumentId, categories: Vec<Category>) -> CoreResult<()> {
        update_clinic(&self.store, clinic_id, |clinic| {
            clinic.categories = categories;
            Ok(())
        })
    }

    pub fn add_category(&self, clinic_id: &DocumentId, name: &str) -> CoreResult<CategoryView> {
        let name = validated_name(name)?;
        let mut categories = load_clinic(&self.store, clinic_id)?.categories;
        ensure_name_free(&categories, &name, None)?;

        let category = Category {
            id: DocumentId::new(),
            name,
        };
        categories.push(category.clone());
        self.write_categories(clinic_id, categories)?;
        Ok(category.to_view())
    }

    pub fn update_category(
        &self,
        clinic_id: &DocumentId,
        category_id: &DocumentId,
        name: &str,
    ) -> CoreResult<CategoryView> {
        let name = validated_name(name)?;
        let mut categories = load_clinic(&self.store, clinic_id)?.categories;
        ensure_name_free(&categories, &name, Some(category_id))?;

        let category = categories
            .iter_mut()
            .find(|c| &c.id == category_id)
            .ok_or_else(category_not_found)?;
        category.name = name;
        let view = category.to_view();
        self.write_categories(clinic_id, categories)?;
        Ok(view)
    }

    /// Removes a category; services that referenced it become uncategorised.
    pub fn remove_category(&self, clinic_id: &DocumentId, category_id: &DocumentId) -> CoreResult<()> {
        let mut categories = load_clinic(&self.store, clinic_id)?.categories;
        let before = categories.len();
        categories.retain(|c| &c.id != category_id);
        if categories.len() == before {
            return Err(category_not_found());
        }

        update_clinic(&self.store, clinic_id, |clinic| {
            clinic.categories = categories;
            for service in &mut clinic.services {
                if service.category_id.as_ref() == Some(category_id) {
                    service.category_id = None;
                }
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::models::Clinic;
    use crate::CoreError;
    use api_shared::{CreateServiceReq, PlanTier};
    use tempfile::TempDir;

    #[test]
    fn test_category_lifecycle_clears_service_reference() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let (service, store) = test_service(temp_dir.path());
        let cid = clinic_id(
            &service
                .create_clinic(create_req("city-clinic", "owner1", PlanTier::Pro))
                .unwrap(),
        );

        let cat = service.add_category(&cid, "Dental").unwrap();
        assert!(matches!(
            service.add_category(&cid, "dental"),
            Err(CoreError::Conflict(_))
        ));

        let renamed = service
            .update_category(&cid, &id(&cat.id), "Dentistry")
            .unwrap();
        assert_eq!(renamed.name, "Dentistry");

        let svc = service
            .add_service(
                &cid,
                CreateServiceReq {
                    name: "Cleaning".into(),
                    description: None,
                    category_id: Some(cat.id.clone()),
                    duration_minutes: 45,
                    price: 50.0,
                    branch_ids: Vec::new(),
                    doctor_ids: Vec::new(),
                },
            )
            .unwrap();
        assert_eq!(svc.category_id.as_deref(), Some(cat.id.as_str()));

        service.remove_category(&cid, &id(&cat.id)).unwrap();
        let stored: Clinic = store.get(&cid).unwrap().unwrap();
        assert!(stored.categories.is_empty());
        assert!(stored.service(&id(&svc.id)).unwrap().category_id.is_none());

        assert!(matches!(
            service.remove_category(&cid, &id(&cat.id)),
            Err(CoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_blank_category_name_is_validation_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let (service, _store) = test_service(temp_dir.path());
        let cid = clinic_id(
            &service
                .create_clinic(create_req("city-clinic", "owner1", PlanTier::Pro))
                .unwrap(),
        );
        assert!(matches!(
            service.add_category(&cid, "   "),
            Err(CoreError::Validation(_))
        ));
    }
}
