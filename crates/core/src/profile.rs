//! Profile actions: password change and edit requests.

use crate::fields::FieldErrors;

/// Raw change-password form input.
#[derive(Debug, Clone, Default)]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

impl PasswordChange {
    /// Validate before anything is sent to the voter API.
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.old_password.is_empty() {
            errors.insert("oldPassword", "Old password is required");
        }
        if self.new_password.is_empty() {
            errors.insert("newPassword", "New password is required");
        } else if self.new_password != self.confirm_new_password {
            errors.insert("confirmNewPassword", "New passwords do not match.");
        }
        errors
    }
}

/// Raw profile edit request. Approval happens outside the portal.
#[derive(Debug, Clone, Default)]
pub struct EditRequest {
    pub full_name: String,
    pub address: String,
    pub edit_reason: String,
    pub additional_notes: String,
}

impl EditRequest {
    /// A request must say what to change and why.
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.full_name.trim().is_empty() && self.address.trim().is_empty() {
            errors.insert("fullName", "Enter a new name or address");
        }
        if self.edit_reason.trim().is_empty() {
            errors.insert("editReason", "Reason for edit is required");
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(old: &str, new: &str, confirm: &str) -> PasswordChange {
        PasswordChange {
            old_password: old.to_string(),
            new_password: new.to_string(),
            confirm_new_password: confirm.to_string(),
        }
    }

    #[test]
    fn test_matching_passwords_pass() {
        assert!(change("old", "n3w-pass", "n3w-pass").validate().is_empty());
    }

    #[test]
    fn test_mismatched_new_passwords() {
        let errors = change("old", "n3w-pass", "n3w-pas").validate();
        assert_eq!(errors.get("confirmNewPassword"), Some("New passwords do not match."));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_blank_password_change() {
        let errors = change("", "", "").validate();
        assert!(errors.contains("oldPassword"));
        assert!(errors.contains("newPassword"));
        assert!(!errors.contains("confirmNewPassword"));
    }

    #[test]
    fn test_edit_request_needs_change_and_reason() {
        let errors = EditRequest::default().validate();
        assert!(errors.contains("fullName"));
        assert!(errors.contains("editReason"));

        let request = EditRequest {
            address: "14 MG Road, Pune".to_string(),
            edit_reason: "Moved house".to_string(),
            ..EditRequest::default()
        };
        assert!(request.validate().is_empty());
    }
}
