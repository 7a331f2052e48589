//! Validated value types shared across the platform crates.

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// The input is longer than the type allows
    #[error("Text exceeds maximum length of {0} characters")]
    TooLong(usize),
    /// The input is shorter than the type allows
    #[error("Text must be at least {0} characters")]
    TooShort(usize),
    /// The input contains characters the type does not allow
    #[error("Text contains invalid characters: {0}")]
    InvalidCharacters(&'static str),
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, an error is returned.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A clinic's globally unique, slug-like name (e.g. `city-clinic`).
///
/// Input is trimmed and lowercased. After normalisation the value must be 3–64 characters of
/// `a-z`, `0-9` and `-`, and must not start or end with `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UniqueName(String);

impl UniqueName {
    pub const MIN_LEN: usize = 3;
    pub const MAX_LEN: usize = 64;

    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let normalised = input.as_ref().trim().to_lowercase();
        if normalised.is_empty() {
            return Err(TextError::Empty);
        }
        if normalised.len() < Self::MIN_LEN {
            return Err(TextError::TooShort(Self::MIN_LEN));
        }
        if normalised.len() > Self::MAX_LEN {
            return Err(TextError::TooLong(Self::MAX_LEN));
        }
        let ok = normalised
            .bytes()
            .all(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'-'));
        if !ok || normalised.starts_with('-') || normalised.ends_with('-') {
            return Err(TextError::InvalidCharacters(
                "only a-z, 0-9 and inner '-' are allowed",
            ));
        }
        Ok(Self(normalised))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UniqueName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A phone number normalised to `+` followed by 9–15 digits.
///
/// Spaces, dashes and parentheses are stripped; a missing leading `+` is added.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn parse(input: impl AsRef<str>) -> Result<Self, TextError> {
        let raw = input.as_ref().trim();
        if raw.is_empty() {
            return Err(TextError::Empty);
        }
        let digits_part = raw.strip_prefix('+').unwrap_or(raw);
        let mut digits = String::with_capacity(digits_part.len());
        for c in digits_part.chars() {
            match c {
                '0'..='9' => digits.push(c),
                ' ' | '-' | '(' | ')' => {}
                _ => return Err(TextError::InvalidCharacters("phone must contain only digits")),
            }
        }
        if digits.len() < 9 {
            return Err(TextError::TooShort(9));
        }
        if digits.len() > 15 {
            return Err(TextError::TooLong(15));
        }
        Ok(Self(format!("+{digits}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tri-state value for partial updates: the field was omitted, explicitly `null`, or set.
///
/// Use together with `#[serde(default)]` on the containing field so that an omitted key
/// deserialises to [`Patch::Absent`]:
///
/// ```
/// # use clinic_types::Patch;
/// #[derive(serde::Deserialize)]
/// struct Update {
///     #[serde(default)]
///     age: Patch<u8>,
/// }
///
/// let omitted: Update = serde_json::from_str("{}").unwrap();
/// let cleared: Update = serde_json::from_str(r#"{"age":null}"#).unwrap();
/// let set: Update = serde_json::from_str(r#"{"age":30}"#).unwrap();
/// assert_eq!(omitted.age, Patch::Absent);
/// assert_eq!(cleared.age, Patch::Null);
/// assert_eq!(set.age, Patch::Value(30));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    #[default]
    Absent,
    Null,
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    pub fn as_ref(&self) -> Patch<&T> {
        match self {
            Patch::Absent => Patch::Absent,
            Patch::Null => Patch::Null,
            Patch::Value(v) => Patch::Value(v),
        }
    }

    /// Maps the contained value, leaving `Absent`/`Null` untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Patch<U> {
        match self {
            Patch::Absent => Patch::Absent,
            Patch::Null => Patch::Null,
            Patch::Value(v) => Patch::Value(f(v)),
        }
    }

    /// Fallible variant of [`Patch::map`].
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<Patch<U>, E> {
        Ok(match self {
            Patch::Absent => Patch::Absent,
            Patch::Null => Patch::Null,
            Patch::Value(v) => Patch::Value(f(v)?),
        })
    }

    /// Applies the patch to an optional target: `Absent` keeps it, `Null` clears it.
    pub fn apply_to(self, target: &mut Option<T>) {
        match self {
            Patch::Absent => {}
            Patch::Null => *target = None,
            Patch::Value(v) => *target = Some(v),
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        }
    }
}

impl<'de, T> serde::Deserialize<'de> for Patch<T>
where
    T: serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

impl<T> serde::Serialize for Patch<T>
where
    T: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Patch::Value(v) => serializer.serialize_some(v),
            Patch::Absent | Patch::Null => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_text_trims_and_rejects_blank() {
        assert_eq!(NonEmptyText::new("  City Clinic ").unwrap().as_str(), "City Clinic");
        assert_eq!(NonEmptyText::new("   "), Err(TextError::Empty));
    }

    #[test]
    fn test_unique_name_normalises_case() {
        let name = UniqueName::new(" City-Clinic ").unwrap();
        assert_eq!(name.as_str(), "city-clinic");
    }

    #[test]
    fn test_unique_name_rejects_bad_input() {
        assert_eq!(UniqueName::new(""), Err(TextError::Empty));
        assert_eq!(UniqueName::new("ab"), Err(TextError::TooShort(3)));
        assert!(matches!(
            UniqueName::new("city clinic"),
            Err(TextError::InvalidCharacters(_))
        ));
        assert!(matches!(
            UniqueName::new("-city"),
            Err(TextError::InvalidCharacters(_))
        ));
        assert_eq!(UniqueName::new("a".repeat(65)), Err(TextError::TooLong(64)));
    }

    #[test]
    fn test_phone_number_normalises_formatting() {
        let phone = PhoneNumber::parse("+998 (90) 123-45-67").unwrap();
        assert_eq!(phone.as_str(), "+998901234567");
        assert_eq!(PhoneNumber::parse("998901234567").unwrap(), phone);
    }

    #[test]
    fn test_phone_number_rejects_letters_and_short_numbers() {
        assert!(matches!(
            PhoneNumber::parse("+998abc"),
            Err(TextError::InvalidCharacters(_))
        ));
        assert_eq!(PhoneNumber::parse("+1234"), Err(TextError::TooShort(9)));
    }

    #[derive(serde::Deserialize)]
    struct NameUpdate {
        #[serde(default)]
        nickname: Patch<String>,
    }

    #[test]
    fn test_patch_distinguishes_omitted_null_and_value() {
        let omitted: NameUpdate = serde_json::from_str("{}").unwrap();
        let null: NameUpdate = serde_json::from_str(r#"{"nickname":null}"#).unwrap();
        let value: NameUpdate = serde_json::from_str(r#"{"nickname":"Jo"}"#).unwrap();

        assert_eq!(omitted.nickname, Patch::Absent);
        assert_eq!(null.nickname, Patch::Null);
        assert_eq!(value.nickname, Patch::Value("Jo".to_string()));
    }

    #[test]
    fn test_patch_apply_to_option() {
        let mut target = Some(5);
        Patch::Absent.apply_to(&mut target);
        assert_eq!(target, Some(5));
        Patch::Value(7).apply_to(&mut target);
        assert_eq!(target, Some(7));
        Patch::Null.apply_to(&mut target);
        assert_eq!(target, None);
    }
}
