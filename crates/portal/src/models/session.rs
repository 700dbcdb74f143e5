//! Session-related types.
//!
//! Everything the portal remembers about a browser lives in the session
//! under one of the [`keys`].

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Login state of a voter.
///
/// Handlers receive this explicitly (see `RequireSession`) instead of
/// looking a token up from ambient storage.
#[derive(Clone, Serialize, Deserialize)]
pub struct SessionContext {
    pub voter_id: String,
    pub display_name: String,
    pub access_token: String,
    pub authenticated_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl SessionContext {
    #[must_use]
    pub fn new(
        voter_id: impl Into<String>,
        display_name: impl Into<String>,
        access_token: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            voter_id: voter_id.into(),
            display_name: display_name.into(),
            access_token: access_token.into(),
            authenticated_at: now,
            last_activity: now,
        }
    }

    /// Whether more than `timeout` has passed since the last activity.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        let Ok(timeout) = chrono::Duration::from_std(timeout) else {
            return false;
        };
        now - self.last_activity > timeout
    }

    /// Record activity at `now`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity = self.last_activity.max(now);
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("voter_id", &self.voter_id)
            .field("display_name", &self.display_name)
            .field("access_token", &"[REDACTED]")
            .field("authenticated_at", &self.authenticated_at)
            .field("last_activity", &self.last_activity)
            .finish()
    }
}

/// Severity of a one-shot page message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashKind {
    Success,
    Error,
}

/// A message shown once on the next page render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.kind, FlashKind::Error)
    }
}

/// Session keys.
pub mod keys {
    /// The logged-in voter's [`super::SessionContext`].
    pub const SESSION_CONTEXT: &str = "session_context";

    /// ID of the registration wizard owned by this session.
    pub const DRAFT_ID: &str = "draft_id";

    /// Last OTP request, for the resend cooldown.
    pub const OTP_COOLDOWN: &str = "otp_cooldown";

    /// Voter currently shown on the scanner page.
    pub const SCAN_RESULT: &str = "scan_result";

    /// One-shot message for the next page.
    pub const FLASH: &str = "flash";

    /// Set once the voter has filed a profile edit request.
    pub const EDIT_REQUESTED: &str = "edit_requested";
}
