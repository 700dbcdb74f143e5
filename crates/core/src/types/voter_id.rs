//! Voter ID type.
//!
//! A voter ID is whatever the voter (or a scanned QR code) asserts. It is not
//! checked against any registry and carries no checksum.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`VoterId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum VoterIdError {
    /// The input is empty or only whitespace.
    #[error("voter ID cannot be empty")]
    Empty,
}

/// A user-asserted voter ID, trimmed of surrounding whitespace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct VoterId(String);

impl VoterId {
    /// Parse a `VoterId`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`VoterIdError::Empty`] if nothing is left after trimming.
    pub fn parse(s: &str) -> Result<Self, VoterIdError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(VoterIdError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the voter ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VoterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_whitespace() {
        let id = VoterId::parse("  V123456789\n").unwrap();
        assert_eq!(id.as_str(), "V123456789");
    }

    #[test]
    fn test_rejects_blank() {
        assert_eq!(VoterId::parse(""), Err(VoterIdError::Empty));
        assert_eq!(VoterId::parse("   "), Err(VoterIdError::Empty));
    }
}
