//! Session middleware configuration.
//!
//! Sessions live in a bounded moka cache: they hold only a draft ID, the
//! login context and short-lived page state, none of which must survive a
//! restart. Records are evicted once their expiry date passes, and the
//! least-used ones go first when the cache is full.

use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_moka_store::MokaStore;

use crate::config::PortalConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "qv_session";

/// Most sessions held at once.
const MAX_SESSIONS: u64 = 100_000;

/// Create the session layer with a bounded in-memory store.
///
/// The cookie outlives a draft's idle window; login expiry is enforced
/// separately by the session context.
#[must_use]
pub fn create_session_layer(config: &PortalConfig) -> SessionManagerLayer<MokaStore> {
    let inactivity = config.draft_idle_timeout.max(config.session_timeout);
    let seconds = i64::try_from(inactivity.as_secs()).unwrap_or(i64::MAX);

    SessionManagerLayer::new(MokaStore::new(Some(MAX_SESSIONS)))
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(seconds),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Request, header},
        routing::get,
    };
    use tower::ServiceExt;
    use tower_sessions::Session;

    use super::*;
    use crate::config::tests::test_config;

    #[tokio::test]
    async fn test_session_cookie_attributes() {
        let app = Router::new()
            .route(
                "/",
                get(|session: Session| async move {
                    session.insert("seen", true).await.unwrap();
                    "ok"
                }),
            )
            .layer(create_session_layer(&test_config()));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();

        assert!(cookie.starts_with("qv_session="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=1800"));
        assert!(!cookie.contains("Secure"));
    }
}
