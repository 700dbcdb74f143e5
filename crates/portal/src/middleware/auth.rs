//! Login session extractors.
//!
//! The voter's [`SessionContext`] is read from the session and handed to
//! handlers explicitly. Contexts idle for longer than the configured timeout
//! are treated as logged out.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tower_sessions::Session;

use crate::models::{SessionContext, session_keys};
use crate::state::AppState;

/// Extractor that requires a live login.
///
/// Missing contexts redirect to `/login`; expired ones are removed and
/// redirect to `/login?expired=1`. Live contexts are touched, extending the
/// inactivity window.
///
/// # Example
///
/// ```rust,ignore
/// async fn profile(RequireSession(voter): RequireSession) -> impl IntoResponse {
///     format!("Hello, {}!", voter.display_name)
/// }
/// ```
pub struct RequireSession(pub SessionContext);

/// Why a [`RequireSession`] extraction failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRejection {
    /// Nobody is logged in.
    RedirectToLogin,
    /// The login timed out.
    Expired,
    /// The session layer is missing or its store failed.
    Unavailable,
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Expired => Redirect::to("/login?expired=1").into_response(),
            Self::Unavailable => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireSession {
    type Rejection = SessionRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(SessionRejection::Unavailable)?;

        let mut context: SessionContext = session
            .get(session_keys::SESSION_CONTEXT)
            .await
            .map_err(|_| SessionRejection::Unavailable)?
            .ok_or(SessionRejection::RedirectToLogin)?;

        let now = Utc::now();
        if context.is_expired(now, state.config().session_timeout) {
            tracing::info!(voter_id = %context.voter_id, "Session expired");
            if let Err(e) = clear_session_context(session).await {
                tracing::warn!(error = %e, "Failed to clear expired session context");
            }
            return Err(SessionRejection::Expired);
        }

        context.touch(now);
        set_session_context(session, &context)
            .await
            .map_err(|_| SessionRejection::Unavailable)?;

        Ok(Self(context))
    }
}

/// Extractor that optionally gets the live login, for navigation.
///
/// Expired contexts read as `None`; they are not touched.
pub struct OptionalSession(pub Option<SessionContext>);

impl FromRequestParts<AppState> for OptionalSession {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let context = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<SessionContext>(session_keys::SESSION_CONTEXT)
                .await
                .ok()
                .flatten()
                .filter(|context| !context.is_expired(Utc::now(), state.config().session_timeout)),
            None => None,
        };

        Ok(Self(context))
    }
}

/// Store the login context in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_session_context(
    session: &Session,
    context: &SessionContext,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::SESSION_CONTEXT, context).await
}

/// Remove the login context from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_session_context(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<SessionContext>(session_keys::SESSION_CONTEXT)
        .await?;
    Ok(())
}
