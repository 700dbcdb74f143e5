//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::PortalConfig;
use crate::services::{ApiError, DraftStore, VoterApiClient};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the voter API client, the draft store and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: PortalConfig,
    api: VoterApiClient,
    drafts: DraftStore,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the voter API client cannot be built.
    pub fn new(config: PortalConfig) -> Result<Self, ApiError> {
        let api = VoterApiClient::new(&config.api)?;
        let drafts = DraftStore::new(config.draft_idle_timeout, config.step_gate);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                drafts,
            }),
        })
    }

    /// Get a reference to the portal configuration.
    #[must_use]
    pub fn config(&self) -> &PortalConfig {
        &self.inner.config
    }

    /// Get a reference to the voter API client.
    #[must_use]
    pub fn api(&self) -> &VoterApiClient {
        &self.inner.api
    }

    /// Get a reference to the registration draft store.
    #[must_use]
    pub fn drafts(&self) -> &DraftStore {
        &self.inner.drafts
    }
}
