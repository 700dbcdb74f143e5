//! Login, OTP and logout route handlers.
//!
//! Credentials are checked by the voter API. A successful login stores an
//! explicit [`SessionContext`] in the session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use qrvotify_core::FieldErrors;
use qrvotify_core::login::{LoginInput, LoginMethod, OtpCooldown, check_mobile, validate_login};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalSession, clear_session_context, set_session_context};
use crate::models::{Flash, SessionContext, session_keys};
use crate::services::LoginRequest;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub method: LoginMethod,
    #[serde(rename = "voterId")]
    pub voter_id: String,
    pub password: String,
    pub mobile: String,
    pub otp: String,
    #[serde(rename = "g-recaptcha-response")]
    pub captcha_token: String,
}

impl From<LoginForm> for LoginInput {
    fn from(form: LoginForm) -> Self {
        Self {
            method: form.method,
            voter_id: form.voter_id,
            password: form.password,
            mobile: form.mobile,
            otp: form.otp,
            captcha_token: form.captcha_token,
        }
    }
}

/// OTP request form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OtpForm {
    pub mobile: String,
}

/// Query parameters of the login page.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginQuery {
    pub method: Option<LoginMethod>,
    pub expired: Option<u8>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub current_voter: Option<String>,
    pub method: LoginMethod,
    pub expired: bool,
    pub errors: FieldErrors,
    pub error: Option<String>,
    pub flash: Option<Flash>,
    pub voter_id: String,
    pub mobile: String,
    /// Seconds until another OTP may be requested.
    pub otp_wait_secs: i64,
    pub otp_requested: bool,
    pub recaptcha_site_key: Option<String>,
}

impl LoginTemplate {
    fn new(state: &AppState, current_voter: Option<String>, method: LoginMethod) -> Self {
        Self {
            current_voter,
            method,
            expired: false,
            errors: FieldErrors::new(),
            error: None,
            flash: None,
            voter_id: String::new(),
            mobile: String::new(),
            otp_wait_secs: 0,
            otp_requested: false,
            recaptcha_site_key: state.config().recaptcha_site_key.clone(),
        }
    }

    /// Fill in the OTP state remembered in the session.
    fn with_cooldown(mut self, cooldown: Option<&OtpCooldown>) -> Self {
        if let Some(cooldown) = cooldown {
            self.otp_wait_secs = cooldown.remaining_secs(Utc::now());
            self.otp_requested = true;
            if self.mobile.is_empty() {
                self.mobile = cooldown.mobile.as_str().to_string();
            }
        }
        self
    }

    fn is_mobile(&self) -> bool {
        self.method == LoginMethod::Mobile
    }

    fn field_error(&self, field: &str) -> Option<&str> {
        self.errors.get(field)
    }
}

// =============================================================================
// Routes
// =============================================================================

async fn otp_cooldown(session: &Session) -> Result<Option<OtpCooldown>> {
    Ok(session.get(session_keys::OTP_COOLDOWN).await?)
}

/// Display the login page.
#[instrument(skip(state, session, voter))]
pub async fn login_page(
    State(state): State<AppState>,
    session: Session,
    OptionalSession(voter): OptionalSession,
    Query(query): Query<LoginQuery>,
) -> Result<impl IntoResponse> {
    let cooldown = otp_cooldown(&session).await?;
    let flash = session.remove::<Flash>(session_keys::FLASH).await?;

    let mut page = LoginTemplate::new(
        &state,
        voter.map(|v| v.display_name),
        query.method.unwrap_or_default(),
    )
    .with_cooldown(cooldown.as_ref());
    page.expired = query.expired == Some(1);
    page.flash = flash;

    Ok(page)
}

/// Handle login form submission.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let cooldown = otp_cooldown(&session).await?;
    let input = LoginInput::from(form);

    let captcha_required = state.config().recaptcha_site_key.is_some();
    let requested_for = cooldown.as_ref().map(|c| c.mobile.as_str());
    let errors = validate_login(&input, captcha_required, requested_for);

    let mut page = LoginTemplate::new(&state, None, input.method);
    page.voter_id.clone_from(&input.voter_id);
    page.mobile.clone_from(&input.mobile);
    let page = page.with_cooldown(cooldown.as_ref());

    if !errors.is_empty() {
        return Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            LoginTemplate { errors, ..page },
        )
            .into_response());
    }

    let request = login_request(&input, captcha_required);
    let response = match state.api().login(&request).await {
        Ok(response) => response,
        Err(e) if e.is_unauthorized() => {
            tracing::info!("Login rejected");
            return Ok((
                StatusCode::UNAUTHORIZED,
                LoginTemplate {
                    error: Some("Invalid credentials".to_string()),
                    ..page
                },
            )
                .into_response());
        }
        Err(e) => {
            tracing::error!(error = %e, "Login service call failed");
            return Ok((
                StatusCode::BAD_GATEWAY,
                LoginTemplate {
                    error: Some("Login service unavailable".to_string()),
                    ..page
                },
            )
                .into_response());
        }
    };

    let voter_id = response.voter_id.unwrap_or_else(|| match input.method {
        LoginMethod::VoterId => input.voter_id.trim().to_string(),
        LoginMethod::Mobile => input.mobile.clone(),
    });
    let display_name = response.name.unwrap_or_else(|| voter_id.clone());
    let context = SessionContext::new(voter_id, display_name, response.token, Utc::now());

    // New identity, new session ID
    session.cycle_id().await?;
    set_session_context(&session, &context).await?;
    session
        .remove::<OtpCooldown>(session_keys::OTP_COOLDOWN)
        .await?;
    set_sentry_user(&context.voter_id);
    tracing::info!(voter_id = %context.voter_id, "Voter logged in");

    Ok(Redirect::to("/profile").into_response())
}

fn login_request(input: &LoginInput, captcha_required: bool) -> LoginRequest {
    let captcha_token = captcha_required.then(|| input.captcha_token.clone());
    match input.method {
        LoginMethod::VoterId => LoginRequest {
            method: LoginMethod::VoterId,
            voter_id: Some(input.voter_id.trim().to_string()),
            password: Some(input.password.clone()),
            mobile: None,
            otp: None,
            captcha_token,
        },
        LoginMethod::Mobile => LoginRequest {
            method: LoginMethod::Mobile,
            voter_id: None,
            password: None,
            mobile: Some(input.mobile.clone()),
            otp: Some(input.otp.trim().to_string()),
            captcha_token,
        },
    }
}

/// Request a one-time password by text message.
///
/// Refused while the previous request is still cooling down.
#[instrument(skip_all)]
pub async fn request_otp(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<OtpForm>,
) -> Result<Response> {
    let cooldown = otp_cooldown(&session).await?;
    let mut page = LoginTemplate::new(&state, None, LoginMethod::Mobile);
    page.mobile.clone_from(&form.mobile);
    let page = page.with_cooldown(cooldown.as_ref());

    let mobile = match check_mobile(&form.mobile) {
        Ok(mobile) => mobile,
        Err(message) => {
            let mut errors = FieldErrors::new();
            errors.insert("mobile", message);
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                LoginTemplate { errors, ..page },
            )
                .into_response());
        }
    };

    let now = Utc::now();
    if let Some(active) = cooldown.as_ref().filter(|c| c.is_active(now)) {
        let wait = active.remaining_secs(now);
        return Ok((
            StatusCode::TOO_MANY_REQUESTS,
            LoginTemplate {
                error: Some(format!("Please wait {wait}s before requesting another OTP")),
                ..page
            },
        )
            .into_response());
    }

    if let Err(e) = state.api().request_otp(&mobile).await {
        tracing::error!(error = %e, "OTP request failed");
        return Ok((
            StatusCode::BAD_GATEWAY,
            LoginTemplate {
                error: Some("Login service unavailable".to_string()),
                ..page
            },
        )
            .into_response());
    }

    let message = format!("OTP sent to {}", mobile.masked());
    session
        .insert(session_keys::OTP_COOLDOWN, OtpCooldown::new(mobile, now))
        .await?;
    session
        .insert(session_keys::FLASH, Flash::success(message))
        .await?;

    Ok(Redirect::to("/login?method=mobile").into_response())
}

/// Log the voter out.
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_session_context(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/"))
}
