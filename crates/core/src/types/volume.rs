//! Google Books volume identifier.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`VolumeId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum VolumeIdError {
    /// The input string is empty.
    #[error("volume id cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("volume id must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside `[A-Za-z0-9_-]`.
    #[error("volume id contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// A Google Books volume id, used as the natural key of a book.
///
/// ## Constraints
///
/// - Length: 1-64 characters
/// - Characters: ASCII letters, digits, `_` and `-`
///
/// The character set keeps the id safe to embed in a catalog URL path and in
/// a cache key without escaping.
///
/// ## Examples
///
/// ```
/// use violet_pages_core::VolumeId;
///
/// assert!(VolumeId::parse("zyTCAlFPjgYC").is_ok());
/// assert!(VolumeId::parse("").is_err());
/// assert!(VolumeId::parse("../etc").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct VolumeId(String);

impl VolumeId {
    /// Maximum length of a volume id.
    pub const MAX_LENGTH: usize = 64;

    /// Parse a `VolumeId` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 64 characters, or
    /// contains a character outside `[A-Za-z0-9_-]`.
    pub fn parse(s: &str) -> Result<Self, VolumeIdError> {
        if s.is_empty() {
            return Err(VolumeIdError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(VolumeIdError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if let Some(c) = s
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
        {
            return Err(VolumeIdError::InvalidCharacter(c));
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the volume id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `VolumeId` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for VolumeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for VolumeId {
    type Err = VolumeIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for VolumeId {
    type Error = VolumeIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<VolumeId> for String {
    fn from(id: VolumeId) -> Self {
        id.0
    }
}

impl AsRef<str> for VolumeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for VolumeId {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for VolumeId {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for VolumeId {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_ids() {
        assert!(VolumeId::parse("zyTCAlFPjgYC").is_ok());
        assert!(VolumeId::parse("abc_DEF-123").is_ok());
        assert!(VolumeId::parse(&"a".repeat(64)).is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(VolumeId::parse(""), Err(VolumeIdError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        assert!(matches!(
            VolumeId::parse(&"a".repeat(65)),
            Err(VolumeIdError::TooLong { max: 64 })
        ));
    }

    #[test]
    fn test_parse_rejects_path_characters() {
        assert_eq!(
            VolumeId::parse("abc/def"),
            Err(VolumeIdError::InvalidCharacter('/'))
        );
        assert_eq!(
            VolumeId::parse("abc def"),
            Err(VolumeIdError::InvalidCharacter(' '))
        );
    }

    #[test]
    fn test_deserialize_validates() {
        let id: VolumeId = serde_json::from_str("\"zyTCAlFPjgYC\"").unwrap();
        assert_eq!(id.as_str(), "zyTCAlFPjgYC");
        assert!(serde_json::from_str::<VolumeId>("\"bad id\"").is_err());
    }

    #[test]
    fn test_serialize_as_string() {
        let id = VolumeId::parse("zyTCAlFPjgYC").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"zyTCAlFPjgYC\"");
    }
}
