//! Registration validator.

use crate::fields::FieldErrors;
use crate::registration::draft::{DocumentSlot, Field, RegistrationDraft};
use crate::types::{Email, MobileNumber};

/// Validate a draft, returning an entry for every invalid or missing field.
///
/// Keys are the form's wire names; document errors use the bare slot key
/// (`voterIdCard`, `aadharCard`). Age counts as missing when it is zero,
/// so a voter born in the current year cannot pass.
#[must_use]
pub fn validate(draft: &RegistrationDraft) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if draft.display(Field::FullName).is_empty() {
        errors.insert("fullName", "Full Name is required");
    }
    if draft.display(Field::Dob).is_empty() {
        errors.insert("dob", "Date of Birth is required");
    }
    if matches!(draft.age(), None | Some(0)) {
        errors.insert("age", "Age is required");
    }
    if draft.display(Field::Gender).is_empty() {
        errors.insert("gender", "Gender is required");
    }
    if MobileNumber::parse(draft.display(Field::Mobile)).is_err() {
        errors.insert("mobile", "Valid mobile number is required");
    }
    if Email::parse(draft.display(Field::Email)).is_err() {
        errors.insert("email", "Valid email is required");
    }
    if secrecy::ExposeSecret::expose_secret(draft.password()).is_empty() {
        errors.insert("password", "Password is required");
    }
    if !draft.passwords_match() {
        errors.insert("confirmPassword", "Passwords do not match");
    }
    if draft.documents().get(DocumentSlot::VoterIdCard).is_none() {
        errors.insert("voterIdCard", "Voter ID Card is required");
    }
    if draft.documents().get(DocumentSlot::AadharCard).is_none() {
        errors.insert("aadharCard", "Aadhar Card is required");
    }

    errors
}
