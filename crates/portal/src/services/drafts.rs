//! In-memory store of registration wizards.
//!
//! Each browser session owns at most one wizard, addressed by a [`DraftId`]
//! kept in the session. Wizards are held behind a `tokio` mutex so field
//! updates and the submit hand-off never interleave, and are evicted after
//! a period of inactivity.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use qrvotify_core::registration::{StepGate, Wizard};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Upper bound on concurrently open drafts.
const MAX_DRAFTS: u64 = 10_000;

/// Identifier of a wizard in the [`DraftStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DraftId(Uuid);

impl DraftId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DraftId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DraftId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A wizard shared between the requests of one session.
pub type SharedWizard = Arc<Mutex<Wizard>>;

/// Wizards keyed by draft ID with time-to-idle expiry.
#[derive(Clone)]
pub struct DraftStore {
    wizards: Cache<DraftId, SharedWizard>,
    gate: StepGate,
}

impl DraftStore {
    /// Create a store whose drafts expire after `idle` without access.
    #[must_use]
    pub fn new(idle: Duration, gate: StepGate) -> Self {
        let wizards = Cache::builder()
            .max_capacity(MAX_DRAFTS)
            .time_to_idle(idle)
            .build();
        Self { wizards, gate }
    }

    /// Look up an existing wizard.
    pub async fn get(&self, id: DraftId) -> Option<SharedWizard> {
        self.wizards.get(&id).await
    }

    /// The wizard for `id`, or a fresh one under a new ID when `id` is
    /// missing or expired.
    pub async fn get_or_create(&self, id: Option<DraftId>) -> (DraftId, SharedWizard) {
        if let Some(id) = id
            && let Some(wizard) = self.wizards.get(&id).await
        {
            return (id, wizard);
        }

        let id = DraftId::new();
        let wizard = Arc::new(Mutex::new(Wizard::new(self.gate)));
        self.wizards.insert(id, Arc::clone(&wizard)).await;
        tracing::debug!(draft_id = %id, "Started registration draft");
        (id, wizard)
    }

    /// Drop a wizard, e.g. after a successful submit.
    pub async fn discard(&self, id: DraftId) {
        self.wizards.invalidate(&id).await;
    }
}
