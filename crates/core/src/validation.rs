//! Request validation helpers.
//!
//! Request payloads arrive with every field optional so a missing field can be
//! reported with a readable message instead of a deserializer error. Each
//! request type has a `validate` method that turns it into a fully-typed
//! value or a [`ValidationError`].

use rust_decimal::Decimal;

/// A client-facing validation failure.
///
/// The message is returned verbatim in the 400 response body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(String);

impl ValidationError {
    /// Create a validation error with a client-facing message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// The client-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Trim a text field, treating blank input as absent.
#[must_use]
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == v.len() {
            Some(v)
        } else {
            Some(trimmed.to_owned())
        }
    })
}

/// Validate an optional replacement for a required text field.
///
/// `None` means "leave unchanged"; a blank string is rejected because the
/// field may not be cleared.
pub fn optional_non_blank(
    value: Option<String>,
    field: &str,
) -> Result<Option<String>, ValidationError> {
    match value {
        None => Ok(None),
        Some(v) => non_blank(Some(v))
            .map(Some)
            .ok_or_else(|| ValidationError::new(format!("{field} cannot be empty"))),
    }
}

/// Reject negative monetary amounts.
pub fn non_negative(amount: Decimal, field: &str) -> Result<Decimal, ValidationError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ValidationError::new(format!("{field} cannot be negative")));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some("   ".into())), None);
        assert_eq!(non_blank(Some("  shirt ".into())), Some("shirt".into()));
        assert_eq!(non_blank(Some("shirt".into())), Some("shirt".into()));
    }

    #[test]
    fn test_optional_non_blank() {
        assert_eq!(optional_non_blank(None, "Name"), Ok(None));
        assert_eq!(
            optional_non_blank(Some(" x ".into()), "Name"),
            Ok(Some("x".into()))
        );
        assert_eq!(
            optional_non_blank(Some(String::new()), "Name"),
            Err(ValidationError::new("Name cannot be empty"))
        );
    }

    #[test]
    fn test_non_negative() {
        assert!(non_negative(Decimal::new(-1, 0), "Price").is_err());
        assert!(non_negative(Decimal::ZERO, "Price").is_ok());
        assert!(non_negative(Decimal::new(8900, 2), "Price").is_ok());
    }
}
