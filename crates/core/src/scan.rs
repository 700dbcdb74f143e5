//! Scanned-voter lock state.
//!
//! An officer scans a voter's QR code (decoded in the browser, plaintext
//! voter ID) and may then lock or unlock that voter.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{VoterId, VoterIdError};

/// Whether a scanned voter is locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockState {
    #[default]
    Unlocked,
    Locked,
}

/// Action an officer can take on a scanned voter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockAction {
    Lock,
    Unlock,
}

impl LockAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lock => "lock",
            Self::Unlock => "unlock",
        }
    }

    /// Confirmation shown after the action succeeds.
    #[must_use]
    pub const fn success_message(self) -> &'static str {
        match self {
            Self::Lock => "Lock successful!",
            Self::Unlock => "Unlock successful!",
        }
    }
}

/// A lock or unlock that would not change anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LockError {
    #[error("Voter is already locked")]
    AlreadyLocked,
    #[error("Voter is already unlocked")]
    AlreadyUnlocked,
}

impl LockState {
    /// Apply an action, refusing no-op transitions.
    ///
    /// # Errors
    ///
    /// Returns [`LockError`] when locking a locked voter or unlocking an
    /// unlocked one.
    pub const fn apply(self, action: LockAction) -> Result<Self, LockError> {
        match (self, action) {
            (Self::Unlocked, LockAction::Lock) => Ok(Self::Locked),
            (Self::Locked, LockAction::Unlock) => Ok(Self::Unlocked),
            (Self::Locked, LockAction::Lock) => Err(LockError::AlreadyLocked),
            (Self::Unlocked, LockAction::Unlock) => Err(LockError::AlreadyUnlocked),
        }
    }

    #[must_use]
    pub const fn is_locked(self) -> bool {
        matches!(self, Self::Locked)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unlocked => "Voter is Unlocked",
            Self::Locked => "Voter is Locked",
        }
    }
}

/// The voter currently on the officer's screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub voter_id: VoterId,
    pub state: LockState,
}

impl ScanResult {
    /// Build a result from decoded QR text. New scans start unlocked.
    ///
    /// # Errors
    ///
    /// Returns [`VoterIdError::Empty`] when the code decoded to blank text.
    pub fn from_scan(text: &str) -> Result<Self, VoterIdError> {
        Ok(Self {
            voter_id: VoterId::parse(text)?,
            state: LockState::Unlocked,
        })
    }

    /// Apply an action in place.
    ///
    /// # Errors
    ///
    /// See [`LockState::apply`].
    pub fn apply(&mut self, action: LockAction) -> Result<LockState, LockError> {
        self.state = self.state.apply(action)?;
        Ok(self.state)
    }
}
