//! Email address type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input string is empty.
    #[error("email cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input does not contain exactly one @ symbol.
    #[error("email must contain exactly one @ symbol")]
    MissingAtSymbol,
    /// The local part (before @) is empty.
    #[error("email local part cannot be empty")]
    EmptyLocalPart,
    /// The domain part (after @) is empty.
    #[error("email domain cannot be empty")]
    EmptyDomain,
    /// The address contains whitespace.
    #[error("email cannot contain whitespace")]
    Whitespace,
}

/// A normalized email address.
///
/// Emails are the login identifier, and lookups are case-insensitive, so the
/// stored form is always trimmed and lower-cased. [`Email::parse`] performs
/// that normalization before validating.
///
/// ## Constraints
///
/// - Length: 1-254 characters (RFC 5321 limit)
/// - Exactly one @ symbol with a non-empty local part and domain
/// - No interior whitespace
///
/// ## Examples
///
/// ```
/// use tienda_core::Email;
///
/// let email = Email::parse("  Admin@Tienda.COM ").unwrap();
/// assert_eq!(email.as_str(), "admin@tienda.com");
///
/// assert!(Email::parse("").is_err());
/// assert!(Email::parse("no-at-symbol").is_err());
/// assert!(Email::parse("@domain.com").is_err());
/// assert!(Email::parse("user@").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse and normalize an `Email` from user input.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input:
    /// - Is empty
    /// - Is longer than 254 characters
    /// - Does not contain exactly one @ symbol
    /// - Has an empty local part or domain
    /// - Contains whitespace
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let normalized = s.trim().to_lowercase();

        if normalized.is_empty() {
            return Err(EmailError::Empty);
        }

        if normalized.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if normalized.chars().any(char::is_whitespace) {
            return Err(EmailError::Whitespace);
        }

        let (local, domain) = normalized
            .split_once('@')
            .ok_or(EmailError::MissingAtSymbol)?;

        if domain.contains('@') {
            return Err(EmailError::MissingAtSymbol);
        }

        if local.is_empty() {
            return Err(EmailError::EmptyLocalPart);
        }

        if domain.is_empty() {
            return Err(EmailError::EmptyDomain);
        }

        Ok(Self(normalized))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Email` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Email {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Email {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Email {
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
    fn test_parse_valid_emails() {
        assert!(Email::parse("user@example.com").is_ok());
        assert!(Email::parse("user.name+tag@example.co.uk").is_ok());
        assert!(Email::parse("a@b.c").is_ok());
    }

    #[test]
    fn test_parse_normalizes_case_and_whitespace() {
        let email = Email::parse("  Admin@Tienda.COM\n").unwrap();
        assert_eq!(email.as_str(), "admin@tienda.com");
        assert_eq!(email, Email::parse("admin@tienda.com").unwrap());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Email::parse(""), Err(EmailError::Empty));
        assert_eq!(Email::parse("   "), Err(EmailError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(matches!(
            Email::parse(&long),
            Err(EmailError::TooLong { .. })
        ));
    }

    #[test]
    fn test_parse_at_symbol_count() {
        assert_eq!(
            Email::parse("no-at-symbol"),
            Err(EmailError::MissingAtSymbol)
        );
        assert_eq!(Email::parse("a@b@c.com"), Err(EmailError::MissingAtSymbol));
    }

    #[test]
    fn test_parse_empty_parts() {
        assert_eq!(Email::parse("@domain.com"), Err(EmailError::EmptyLocalPart));
        assert_eq!(Email::parse("user@"), Err(EmailError::EmptyDomain));
    }

    #[test]
    fn test_parse_interior_whitespace() {
        assert_eq!(
            Email::parse("first last@example.com"),
            Err(EmailError::Whitespace)
        );
    }

    #[test]
    fn test_display() {
        let email = Email::parse("user@example.com").unwrap();
        assert_eq!(email.to_string(), "user@example.com");
    }

    #[test]
    fn test_serde_is_transparent() {
        let email = Email::parse("user@example.com").unwrap();
        assert_eq!(
            serde_json::to_string(&email).unwrap(),
            "\"user@example.com\""
        );
    }
}
