//! Internal implementation of document identifiers.

use crate::{UuidError, UuidResult};
use std::path::{Path, PathBuf};
use std::{fmt, str::FromStr};

/// Re-exported for convenience.
pub use ::uuid::Uuid;

/// Canonical document identifier (32 lowercase hex characters, no hyphens).
///
/// Once constructed, the contained UUID is guaranteed to be in canonical form, so it can be
/// used both as a wire identifier and to derive a sharded storage path.
///
/// # Construction
/// - [`DocumentId::new`] generates a fresh identifier.
/// - [`DocumentId::parse`] validates an externally supplied identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(Uuid);

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentId {
    /// Generates a new random (v4) identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Validates and parses an identifier that must already be in canonical form.
    ///
    /// Hyphenated or uppercase forms are rejected rather than normalised, so that one
    /// document can only ever be addressed by one string.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if `input` is not in canonical form.
    pub fn parse(input: &str) -> UuidResult<Self> {
        if !Self::is_canonical(input) {
            return Err(UuidError::InvalidInput(format!(
                "id must be 32 lowercase hex characters without hyphens, got: '{}'",
                input
            )));
        }
        Uuid::parse_str(input)
            .map(Self)
            .map_err(|e| UuidError::InvalidInput(e.to_string()))
    }

    /// Returns true if `input` is exactly 32 characters of `0-9a-f`.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 32
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    /// Returns `parent_dir/<s1>/<s2>/` where `s1`/`s2` are the first two pairs of hex
    /// characters of this id.
    pub fn shard_dir(&self, parent_dir: &Path) -> PathBuf {
        let canonical = self.0.simple().to_string();
        parent_dir.join(&canonical[0..2]).join(&canonical[2..4])
    }

    /// Returns the sharded path of the JSON file holding this document.
    pub fn sharded_file(&self, parent_dir: &Path) -> PathBuf {
        self.shard_dir(parent_dir).join(format!("{}.json", self))
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for DocumentId {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentId::parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for DocumentId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for DocumentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DocumentId::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_generates_canonical_id() {
        let id = DocumentId::new();
        let canonical = id.to_string();

        assert_eq!(canonical.len(), 32);
        assert!(DocumentId::is_canonical(&canonical));
    }

    #[test]
    fn test_parse_valid_canonical_id() {
        let canonical = "550e8400e29b41d4a716446655440000";
        let id = DocumentId::parse(canonical).expect("canonical id should parse");
        assert_eq!(id.to_string(), canonical);
    }

    #[test]
    fn test_parse_rejects_hyphenated_id() {
        let err = DocumentId::parse("550e8400-e29b-41d4-a716-446655440000")
            .expect_err("hyphenated id should be rejected");
        match err {
            UuidError::InvalidInput(msg) => assert!(msg.contains("32 lowercase hex characters")),
        }
    }

    #[test]
    fn test_parse_rejects_uppercase_id() {
        assert!(DocumentId::parse("550E8400E29B41D4A716446655440000").is_err());
    }

    #[test]
    fn test_parse_rejects_wrong_length_and_characters() {
        assert!(DocumentId::parse("550e8400").is_err());
        assert!(DocumentId::parse("550e8400e29b41d4a716446655440000aa").is_err());
        assert!(DocumentId::parse("550e8400e29b41d4a71644665544zzzz").is_err());
        assert!(DocumentId::parse("").is_err());
    }

    #[test]
    fn test_sharded_file_structure() {
        let id = DocumentId::parse("550e8400e29b41d4a716446655440000").unwrap();
        let path = id.sharded_file(Path::new("/data/clinics"));

        assert_eq!(
            path,
            PathBuf::from("/data/clinics/55/0e/550e8400e29b41d4a716446655440000.json")
        );
    }

    #[test]
    fn test_from_str_matches_parse() {
        let parsed: DocumentId = "550e8400e29b41d4a716446655440000".parse().unwrap();
        assert_eq!(parsed.to_string(), "550e8400e29b41d4a716446655440000");
        assert!("not-an-id".parse::<DocumentId>().is_err());
    }

    #[test]
    fn test_serde_uses_canonical_string() {
        let id = DocumentId::parse("550e8400e29b41d4a716446655440000").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"550e8400e29b41d4a716446655440000\"");

        let back: DocumentId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        let err = serde_json::from_str::<DocumentId>("\"550e8400-e29b-41d4-a716-446655440000\"");
        assert!(err.is_err(), "non-canonical ids must not deserialise");
    }
}
