//! Voter profile route handlers.
//!
//! The profile shows the voter's ID card with its QR code. Password changes
//! and edit requests are forwarded to the voter API with the voter's own
//! access token; their outcome comes back as a flash message.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
};
use qrvotify_core::profile::{EditRequest, PasswordChange};
use qrvotify_core::registration::Attachment;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::RequireSession;
use crate::models::{Flash, session_keys};
use crate::services::{ApiError, card};
use crate::state::AppState;

const PASSWORD_CHANGED: &str = "Password changed successfully.";
const PASSWORD_REFUSED: &str = "Password change was refused. Check your old password.";
const EDIT_SUBMITTED: &str = "Edit request has been submitted.";
const SERVICE_UNAVAILABLE: &str = "Profile service unavailable. Please try again.";

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub current_voter: Option<String>,
    pub voter_id: String,
    pub display_name: String,
    pub signed_in_at: String,
    pub qr_svg: String,
    pub edit_requested: bool,
    pub flash: Option<Flash>,
}

/// Change-password form.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PasswordForm {
    pub old_password: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

/// Display the logged-in voter's profile and ID card.
#[instrument(skip_all)]
pub async fn show(session: Session, RequireSession(voter): RequireSession) -> Result<impl IntoResponse> {
    let flash = session.remove::<Flash>(session_keys::FLASH).await?;
    let edit_requested = session
        .get::<bool>(session_keys::EDIT_REQUESTED)
        .await?
        .unwrap_or(false);

    Ok(ProfileTemplate {
        current_voter: Some(voter.display_name.clone()),
        signed_in_at: voter
            .authenticated_at
            .format("%d %b %Y, %H:%M UTC")
            .to_string(),
        qr_svg: card::qr_svg(&voter.voter_id)?,
        voter_id: voter.voter_id,
        display_name: voter.display_name,
        edit_requested,
        flash,
    })
}

/// Download the voter ID card as an SVG file.
#[instrument(skip_all, fields(voter_id = %voter.voter_id))]
pub async fn download_card(RequireSession(voter): RequireSession) -> Result<Response> {
    let svg = card::card_svg(&voter)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        card::card_file_name(&voter.voter_id)
    );

    Ok((
        [
            (header::CONTENT_TYPE, "image/svg+xml".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        svg,
    )
        .into_response())
}

/// Change the voter's password through the voter API.
#[instrument(skip_all, fields(voter_id = %voter.voter_id))]
pub async fn change_password(
    State(state): State<AppState>,
    session: Session,
    RequireSession(voter): RequireSession,
    Form(form): Form<PasswordForm>,
) -> Result<Redirect> {
    let change = PasswordChange {
        old_password: form.old_password,
        new_password: form.new_password,
        confirm_new_password: form.confirm_new_password,
    };

    let flash = if let Some(message) = change.validate().messages().first() {
        Flash::error(*message)
    } else {
        match state.api().change_password(&voter.access_token, &change).await {
            Ok(()) => {
                tracing::info!("Password changed");
                add_breadcrumb("profile", "Password changed", None);
                Flash::success(PASSWORD_CHANGED)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Password change failed");
                Flash::error(refusal_or_outage(&e, PASSWORD_REFUSED))
            }
        }
    };

    session.insert(session_keys::FLASH, flash).await?;
    Ok(Redirect::to("/profile"))
}

/// File a profile edit request through the voter API.
#[instrument(skip_all, fields(voter_id = %voter.voter_id))]
pub async fn request_edit(
    State(state): State<AppState>,
    session: Session,
    RequireSession(voter): RequireSession,
    multipart: Multipart,
) -> Result<Redirect> {
    let (request, supporting_doc) = read_edit_request(multipart).await?;

    let flash = if let Some(message) = request.validate().messages().first() {
        Flash::error(*message)
    } else {
        match state
            .api()
            .submit_edit_request(&voter.access_token, &request, supporting_doc.as_ref())
            .await
        {
            Ok(()) => {
                tracing::info!("Profile edit requested");
                add_breadcrumb("profile", "Edit requested", None);
                session.insert(session_keys::EDIT_REQUESTED, true).await?;
                Flash::success(EDIT_SUBMITTED)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Edit request failed");
                Flash::error(refusal_or_outage(&e, "Edit request was refused."))
            }
        }
    };

    session.insert(session_keys::FLASH, flash).await?;
    Ok(Redirect::to("/profile"))
}

/// Read the edit request form. An empty file input is no document.
async fn read_edit_request(mut multipart: Multipart) -> Result<(EditRequest, Option<Attachment>)> {
    let mut request = EditRequest::default();
    let mut supporting_doc = None;

    while let Some(part) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let name = part.name().unwrap_or_default().to_owned();
        if name == "supportingDocs" {
            let file_name = part.file_name().unwrap_or_default().to_owned();
            let content_type = part.content_type().map(str::to_owned);
            let bytes = part
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            if !file_name.is_empty() && !bytes.is_empty() {
                supporting_doc = Some(Attachment::new(file_name, content_type, bytes.to_vec()));
            }
            continue;
        }

        let target = match name.as_str() {
            "fullName" => &mut request.full_name,
            "address" => &mut request.address,
            "editReason" => &mut request.edit_reason,
            "additionalNotes" => &mut request.additional_notes,
            _ => continue,
        };
        *target = part
            .text()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
    }

    Ok((request, supporting_doc))
}

/// A 4xx from the API is the voter's to fix; anything else is an outage.
fn refusal_or_outage(error: &ApiError, refusal: &'static str) -> &'static str {
    match error {
        ApiError::Api { status, .. } if (400..500).contains(status) => refusal,
        _ => SERVICE_UNAVAILABLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_are_refusals() {
        let refused = ApiError::Api {
            status: 403,
            message: "wrong password".to_string(),
        };
        assert_eq!(refusal_or_outage(&refused, PASSWORD_REFUSED), PASSWORD_REFUSED);

        let outage = ApiError::Api {
            status: 502,
            message: String::new(),
        };
        assert_eq!(refusal_or_outage(&outage, PASSWORD_REFUSED), SERVICE_UNAVAILABLE);
        assert_eq!(
            refusal_or_outage(&ApiError::Parse("eof".to_string()), PASSWORD_REFUSED),
            SERVICE_UNAVAILABLE
        );
    }
}
