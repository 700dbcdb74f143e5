//! Field-level error messages shared by every form.

use std::collections::BTreeMap;

/// Map from a form field's wire name to a human-readable error.
///
/// Only invalid or missing fields have an entry. Validators return this as a
/// value; it is rendered next to the offending inputs, never raised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, &'static str>);

impl FieldErrors {
    /// Create an empty error map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for a field, replacing any previous one.
    pub fn insert(&mut self, field: &'static str, message: &'static str) {
        self.0.insert(field, message);
    }

    /// The error recorded for a field, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&'static str> {
        self.0.get(field).copied()
    }

    /// Whether a field has an error.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Whether the form is free of errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with an error.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate `(field, message)` pairs in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.0.iter().map(|(field, message)| (*field, *message))
    }

    /// Error messages only, in field-name order.
    #[must_use]
    pub fn messages(&self) -> Vec<&'static str> {
        self.0.values().copied().collect()
    }

    /// The subset of errors whose field is in `fields`.
    #[must_use]
    pub fn restricted_to(&self, fields: &[&str]) -> Self {
        Self(
            self.0
                .iter()
                .filter(|(field, _)| fields.contains(*field))
                .map(|(field, message)| (*field, *message))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut errors = FieldErrors::new();
        assert!(errors.is_empty());

        errors.insert("email", "Valid email is required");
        assert_eq!(errors.get("email"), Some("Valid email is required"));
        assert!(errors.contains("email"));
        assert!(!errors.contains("mobile"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_restricted_to() {
        let mut errors = FieldErrors::new();
        errors.insert("email", "Valid email is required");
        errors.insert("fullName", "Full Name is required");

        let subset = errors.restricted_to(&["fullName", "dob"]);
        assert_eq!(subset.len(), 1);
        assert_eq!(subset.get("fullName"), Some("Full Name is required"));
    }
}
