//! Password strength indicator.
//!
//! Informational only: a weak password never blocks registration.

/// Coarse password strength by length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordStrength {
    Weak,
    Medium,
    Strong,
}

impl PasswordStrength {
    /// Rate a password. Returns `None` for an empty password.
    ///
    /// Fewer than 6 characters is weak, 6 to 9 medium, 10 or more strong.
    #[must_use]
    pub fn of(password: &str) -> Option<Self> {
        match password.chars().count() {
            0 => None,
            1..=5 => Some(Self::Weak),
            6..=9 => Some(Self::Medium),
            _ => Some(Self::Strong),
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Weak => "Weak",
            Self::Medium => "Medium",
            Self::Strong => "Strong",
        }
    }
}

impl std::fmt::Display for PasswordStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries() {
        assert_eq!(PasswordStrength::of(""), None);
        assert_eq!(PasswordStrength::of("abcde"), Some(PasswordStrength::Weak));
        assert_eq!(PasswordStrength::of("abcdef"), Some(PasswordStrength::Medium));
        assert_eq!(
            PasswordStrength::of("abcdefghi"),
            Some(PasswordStrength::Medium)
        );
        assert_eq!(
            PasswordStrength::of("abcdefghij"),
            Some(PasswordStrength::Strong)
        );
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        // Five characters, ten bytes.
        assert_eq!(PasswordStrength::of("ééééé"), Some(PasswordStrength::Weak));
    }
}
