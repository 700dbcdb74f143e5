//! HTTP route handlers for the portal.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page (election countdowns)
//! GET  /health                 - Health check
//!
//! # Login
//! GET  /login                  - Login page (?method=voterId|mobile, ?expired=1)
//! POST /login                  - Login action (rate limited)
//! POST /login/otp              - Request a one-time password (rate limited)
//! POST /logout                 - Logout action
//!
//! # Registration
//! GET  /create-user            - Wizard at its current step
//! POST /create-user            - Step inputs + action=next|back|submit
//!
//! # Profile (requires login)
//! GET  /profile                - Voter profile and ID card
//! GET  /profile/card.svg       - Download the ID card
//! POST /profile/password       - Change password
//! POST /profile/edit-request   - Request a profile edit (multipart)
//!
//! # Officers
//! GET  /find-officer           - Election officers (?location=)
//!
//! # Scanner
//! GET  /scan-qr                - Scanner / scanned voter
//! POST /scan-qr                - Record decoded QR text
//! POST /scan-qr/lock           - Lock scanned voter
//! POST /scan-qr/unlock         - Unlock scanned voter
//! POST /scan-qr/reset          - Scan another code
//! ```

pub mod home;
pub mod login;
pub mod officers;
pub mod profile;
pub mod register;
pub mod scan;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::config::PortalConfig;
use crate::middleware::login_rate_limiter;
use crate::state::AppState;

/// Create the login routes router.
pub fn login_routes(trust_proxy_headers: bool) -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            get(login::login_page)
                .merge(post(login::login).layer(login_rate_limiter(trust_proxy_headers))),
        )
        .route(
            "/login/otp",
            post(login::request_otp).layer(login_rate_limiter(trust_proxy_headers)),
        )
        .route("/logout", post(login::logout))
}

/// Create the registration wizard router.
pub fn register_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new().route(
        "/create-user",
        get(register::show)
            .post(register::update)
            .layer(DefaultBodyLimit::max(max_upload_bytes)),
    )
}

/// Create the profile routes router.
pub fn profile_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(profile::show))
        .route("/card.svg", get(profile::download_card))
        .route("/password", post(profile::change_password))
        .route(
            "/edit-request",
            post(profile::request_edit).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
}

/// Create the scanner routes router.
pub fn scan_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(scan::show).post(scan::record))
        .route("/lock", post(scan::lock))
        .route("/unlock", post(scan::unlock))
        .route("/reset", post(scan::reset))
}

/// Create all routes for the portal.
pub fn routes(config: &PortalConfig) -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/find-officer", get(officers::find_officer))
        .nest("/profile", profile_routes(config.max_upload_bytes))
        .merge(login_routes(config.trust_proxy_headers))
        .merge(register_routes(config.max_upload_bytes))
        .nest("/scan-qr", scan_routes())
}
