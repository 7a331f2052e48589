use crate::{CoreError, CoreResult};

pub fn hash_password(plain: &str, cost: u32) -> CoreResult<String> {
    bcrypt::hash(plain, cost).map_err(CoreError::PasswordHash)
}

/// Returns false for a wrong password and for a malformed stored hash.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    match bcrypt::verify(plain, hash) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!("stored password hash could not be checked: {}", e);
            false
        }
    }
}
