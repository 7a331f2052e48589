use std::collections::BTreeMap;

/// Per-field validation messages, keyed by the camelCase field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Records the error of `result` under `field` and returns the value on success.
    pub fn check<T, E: std::fmt::Display>(
        &mut self,
        field: &str,
        result: Result<T, E>,
    ) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                self.add(field, e.to_string());
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.0
    }

    /// `Ok(())` if nothing was recorded, otherwise [`CoreError::Validation`].
    pub fn finish(self) -> CoreResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation(self))
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("validation failed: {0}")]
    Validation(FieldErrors),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to read document: {0}")]
    StorageRead(std::io::Error),
    #[error("failed to write document: {0}")]
    StorageWrite(std::io::Error),
    #[error("failed to serialize document: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize document: {0}")]
    Deserialization(serde_json::Error),
    #[error("failed to hash password: {0}")]
    PasswordHash(bcrypt::BcryptError),
    #[error("failed to sign token: {0}")]
    TokenSign(jsonwebtoken::errors::Error),
    #[error("failed to fetch Google signing keys: {0}")]
    GoogleKeys(reqwest::Error),
}

impl CoreError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.add(field, message);
        CoreError::Validation(errors)
    }

    /// True for failures that are the server's fault rather than the caller's.
    pub fn is_internal(&self) -> bool {
        !matches!(
            self,
            CoreError::Validation(_)
                | CoreError::BadRequest(_)
                | CoreError::Unauthorized(_)
                | CoreError::Forbidden(_)
                | CoreError::NotFound(_)
                | CoreError::Conflict(_)
        )
    }
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_errors_keep_first_message_per_field() {
        let mut errors = FieldErrors::new();
        errors.add("phone", "Text cannot be empty");
        errors.add("phone", "second message");
        errors.add("age", "too old");

        assert_eq!(errors.get("phone"), Some("Text cannot be empty"));
        assert_eq!(errors.to_string(), "age: too old; phone: Text cannot be empty");
    }

    #[test]
    fn test_finish_returns_validation_error_when_not_empty() {
        assert!(FieldErrors::new().finish().is_ok());

        let mut errors = FieldErrors::new();
        let parsed: Option<u8> = errors.check("age", "x".parse::<u8>());
        assert!(parsed.is_none());
        assert!(matches!(errors.finish(), Err(CoreError::Validation(_))));
    }

    #[test]
    fn test_is_internal_classification() {
        assert!(!CoreError::NotFound("booking".into()).is_internal());
        assert!(!CoreError::validation("name", "required").is_internal());
        assert!(CoreError::InvalidConfig("x".into()).is_internal());
    }
}
