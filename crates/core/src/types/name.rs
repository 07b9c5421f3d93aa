//! User-chosen names with length limits.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`ListName`] or [`DisplayName`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// The input is empty after trimming.
    #[error("name cannot be empty")]
    Empty,
    /// The input is longer than allowed.
    #[error("name must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length in characters.
        max: usize,
    },
}

fn parse_bounded(s: &str, max: usize) -> Result<String, NameError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(NameError::Empty);
    }
    if trimmed.chars().count() > max {
        return Err(NameError::TooLong { max });
    }
    Ok(trimmed.to_owned())
}

macro_rules! bounded_name {
    ($(#[$meta:meta])* $name:ident, $max:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Maximum length in characters.
            pub const MAX_LENGTH: usize = $max;

            /// Parse from a string, trimming surrounding whitespace.
            ///
            /// # Errors
            ///
            /// Returns an error if the trimmed input is empty or longer than
            /// [`Self::MAX_LENGTH`] characters.
            pub fn parse(s: &str) -> Result<Self, NameError> {
                parse_bounded(s, Self::MAX_LENGTH).map(Self)
            }

            /// Returns the name as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the name and returns its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = NameError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$name> for String {
            fn from(name: $name) -> Self {
                name.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

bounded_name!(
    /// Name of a reading list, unique per owner. 1-25 characters.
    ListName,
    25
);

bounded_name!(
    /// Public display name chosen during onboarding. 1-13 characters.
    DisplayName,
    13
);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_list_name_limits() {
        assert!(ListName::parse("Summer reads").is_ok());
        assert!(ListName::parse(&"x".repeat(25)).is_ok());
        assert_eq!(
            ListName::parse(&"x".repeat(26)),
            Err(NameError::TooLong { max: 25 })
        );
    }

    #[test]
    fn test_display_name_limits() {
        assert!(DisplayName::parse("Ada").is_ok());
        assert!(DisplayName::parse(&"y".repeat(13)).is_ok());
        assert_eq!(
            DisplayName::parse(&"y".repeat(14)),
            Err(NameError::TooLong { max: 13 })
        );
    }

    #[test]
    fn test_blank_names_rejected() {
        assert_eq!(ListName::parse(""), Err(NameError::Empty));
        assert_eq!(DisplayName::parse("   "), Err(NameError::Empty));
    }

    #[test]
    fn test_names_are_trimmed() {
        let name = ListName::parse("  To read  ").unwrap();
        assert_eq!(name.as_str(), "To read");
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 13 two-byte characters
        assert!(DisplayName::parse(&"é".repeat(13)).is_ok());
    }

    #[test]
    fn test_deserialize_validates() {
        let name: ListName = serde_json::from_str("\"Favourites\"").unwrap();
        assert_eq!(name.to_string(), "Favourites");
        assert!(serde_json::from_str::<DisplayName>("\"\"").is_err());
    }
}
