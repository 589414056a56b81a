//! Field-level form validation.
//!
//! Forms are checked locally and synchronously before anything is sent to
//! the remote service. A failed check never aborts the request; it yields a
//! [`FieldErrors`] map that the page renders next to each input.

use std::collections::BTreeMap;

use crate::Email;

/// Per-field validation messages, first failure wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    /// Create an empty error set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for `field` unless it already has one.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    /// Message recorded for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Whether `field` failed validation.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate `(field, message)` pairs in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// `Ok(value)` if nothing was recorded, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns the collected errors when at least one check failed.
    pub fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

/// A form that can be checked into a validated value.
pub trait Validate {
    /// The validated, ready-to-submit value.
    type Output;

    /// Run every field check.
    ///
    /// # Errors
    ///
    /// Returns one message per failing field.
    fn validate(&self) -> Result<Self::Output, FieldErrors>;
}

/// Number of characters, not bytes.
fn char_len(value: &str) -> usize {
    value.chars().count()
}

/// Require a non-blank value.
pub fn require(errors: &mut FieldErrors, field: &'static str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.add(field, message);
    }
}

/// Require at most `max` characters.
pub fn max_len(errors: &mut FieldErrors, field: &'static str, value: &str, max: usize, message: &str) {
    if char_len(value) > max {
        errors.add(field, message);
    }
}

/// Require at least `min` characters.
pub fn min_len(errors: &mut FieldErrors, field: &'static str, value: &str, min: usize, message: &str) {
    if char_len(value) < min {
        errors.add(field, message);
    }
}

/// Require an email-shaped value, returning the parsed address when valid.
pub fn email(
    errors: &mut FieldErrors,
    field: &'static str,
    value: &str,
    message: &str,
) -> Option<Email> {
    match Email::parse(value) {
        Ok(email) => Some(email),
        Err(_) => {
            errors.add(field, message);
            None
        }
    }
}

/// Require `value` to equal `other` (confirm-password style checks).
pub fn matches(errors: &mut FieldErrors, field: &'static str, value: &str, other: &str, message: &str) {
    if value != other {
        errors.add(field, message);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_first_message_wins() {
        let mut errors = FieldErrors::new();
        errors.add("name", "first");
        errors.add("name", "second");
        assert_eq!(errors.get("name"), Some("first"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_require_treats_whitespace_as_blank() {
        let mut errors = FieldErrors::new();
        require(&mut errors, "name", "   ", "Name is required");
        assert!(errors.has("name"));
    }

    #[test]
    fn test_max_len_counts_chars() {
        let mut errors = FieldErrors::new();
        // 4 chars, 8 bytes
        max_len(&mut errors, "name", "éééé", 4, "too long");
        assert!(errors.is_empty());
        max_len(&mut errors, "name", "ééééé", 4, "too long");
        assert!(errors.has("name"));
    }

    #[test]
    fn test_min_len() {
        let mut errors = FieldErrors::new();
        min_len(&mut errors, "password", "12345", 6, "short");
        assert_eq!(errors.get("password"), Some("short"));
    }

    #[test]
    fn test_email_returns_parsed_value() {
        let mut errors = FieldErrors::new();
        let parsed = email(&mut errors, "email", "user@example.com", "bad");
        assert_eq!(parsed.unwrap().as_str(), "user@example.com");
        assert!(email(&mut errors, "email", "nope", "bad").is_none());
        assert_eq!(errors.get("email"), Some("bad"));
    }

    #[test]
    fn test_matches() {
        let mut errors = FieldErrors::new();
        matches(&mut errors, "confirm", "abc", "abd", "Passwords don't match");
        assert_eq!(errors.get("confirm"), Some("Passwords don't match"));
    }

    #[test]
    fn test_finish() {
        assert_eq!(FieldErrors::new().finish(|| 7).unwrap(), 7);

        let mut errors = FieldErrors::new();
        errors.add("x", "bad");
        assert!(errors.finish(|| 7).is_err());
    }
}
