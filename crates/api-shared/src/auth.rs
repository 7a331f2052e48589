use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Role carried in every issued token.
///
/// These are the only role values the platform ever produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    ClinicOwner,
    ClinicAdmin,
    Doctor,
    Patient,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::ClinicOwner => "clinic_owner",
            Role::ClinicAdmin => "clinic_admin",
            Role::Doctor => "doctor",
            Role::Patient => "patient",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
///
/// Returns `None` if the scheme is not `Bearer` or the token part is empty.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
