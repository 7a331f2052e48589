use crate::identity::Claims;
use crate::{CoreError, CoreResult};
use api_shared::Role;
use clinic_uuid::DocumentId;

/// The authenticated caller, resolved once from verified token claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    PlatformAdmin {
        id: DocumentId,
    },
    /// A clinic owner or admin.
    ClinicStaff {
        id: DocumentId,
        clinic_id: DocumentId,
        role: Role,
    },
    Doctor {
        id: DocumentId,
        clinic_id: DocumentId,
    },
    Patient {
        id: DocumentId,
    },
}

impl Principal {
    pub fn from_claims(claims: &Claims) -> CoreResult<Self> {
        let invalid = || CoreError::Unauthorized("invalid token".into());
        let id = DocumentId::parse(&claims.sub).map_err(|_| invalid())?;
        let clinic_id = || {
            claims
                .clinic_id
                .as_deref()
                .and_then(|c| DocumentId::parse(c).ok())
                .ok_or_else(invalid)
        };

        Ok(match claims.role {
            Role::SuperAdmin => Principal::PlatformAdmin { id },
            Role::ClinicOwner | Role::ClinicAdmin => Principal::ClinicStaff {
                id,
                clinic_id: clinic_id()?,
                role: claims.role,
            },
            Role::Doctor => Principal::Doctor {
                id,
                clinic_id: clinic_id()?,
            },
            Role::Patient => Principal::Patient { id },
        })
    }

    pub fn id(&self) -> &DocumentId {
        match self {
            Principal::PlatformAdmin { id }
            | Principal::ClinicStaff { id, .. }
            | Principal::Doctor { id, .. }
            | Principal::Patient { id } => id,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Principal::PlatformAdmin { .. } => Role::SuperAdmin,
            Principal::ClinicStaff { role, .. } => *role,
            Principal::Doctor { .. } => Role::Doctor,
            Principal::Patient { .. } => Role::Patient,
        }
    }
}
