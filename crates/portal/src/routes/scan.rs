//! QR scanner route handlers.
//!
//! The browser decodes the voter's QR code and posts the text. The scanned
//! voter and any lock/unlock outcome are kept in the session; actions are
//! logged but not forwarded anywhere.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    response::{IntoResponse, Redirect},
};
use qrvotify_core::scan::{LockAction, ScanResult};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::OptionalSession;
use crate::models::{Flash, session_keys};

/// Decoded QR code posted by the scanner script or the manual entry form.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ScanForm {
    pub text: String,
}

/// Scanner page template.
#[derive(Template, WebTemplate)]
#[template(path = "scan.html")]
pub struct ScanTemplate {
    pub current_voter: Option<String>,
    pub scan: Option<ScanResult>,
    pub flash: Option<Flash>,
}

/// Display the scanner, or the scanned voter's lock controls.
#[instrument(skip(session, voter))]
pub async fn show(session: Session, OptionalSession(voter): OptionalSession) -> Result<impl IntoResponse> {
    let scan = session.get::<ScanResult>(session_keys::SCAN_RESULT).await?;
    let flash = session.remove::<Flash>(session_keys::FLASH).await?;

    Ok(ScanTemplate {
        current_voter: voter.map(|v| v.display_name),
        scan,
        flash,
    })
}

/// Record a scanned voter ID.
#[instrument(skip_all)]
pub async fn record(session: Session, Form(form): Form<ScanForm>) -> Result<Redirect> {
    match ScanResult::from_scan(&form.text) {
        Ok(scan) => {
            tracing::info!(voter_id = %scan.voter_id, "Voter QR code scanned");
            session.insert(session_keys::SCAN_RESULT, scan).await?;
        }
        Err(_) => {
            session
                .insert(session_keys::FLASH, Flash::error("No voter ID found in QR code"))
                .await?;
        }
    }
    Ok(Redirect::to("/scan-qr"))
}

/// Lock the scanned voter.
pub async fn lock(session: Session) -> Result<Redirect> {
    apply(&session, LockAction::Lock).await
}

/// Unlock the scanned voter.
pub async fn unlock(session: Session) -> Result<Redirect> {
    apply(&session, LockAction::Unlock).await
}

/// Forget the scanned voter ("Scan Another Code").
#[instrument(skip_all)]
pub async fn reset(session: Session) -> Result<Redirect> {
    session.remove::<ScanResult>(session_keys::SCAN_RESULT).await?;
    session.remove::<Flash>(session_keys::FLASH).await?;
    Ok(Redirect::to("/scan-qr"))
}

#[instrument(skip(session))]
async fn apply(session: &Session, action: LockAction) -> Result<Redirect> {
    let Some(mut scan) = session.get::<ScanResult>(session_keys::SCAN_RESULT).await? else {
        session
            .insert(session_keys::FLASH, Flash::error("Scan a voter's QR code first"))
            .await?;
        return Ok(Redirect::to("/scan-qr"));
    };

    let flash = match scan.apply(action) {
        Ok(state) => {
            tracing::info!(
                voter_id = %scan.voter_id,
                action = action.as_str(),
                locked = state.is_locked(),
                "Voter lock state changed"
            );
            add_breadcrumb(
                "scan",
                action.success_message(),
                Some(&[("voter_id", scan.voter_id.as_str())]),
            );
            session.insert(session_keys::SCAN_RESULT, &scan).await?;
            Flash::success(action.success_message())
        }
        Err(e) => {
            tracing::info!(voter_id = %scan.voter_id, error = %e, "Lock action refused");
            Flash::error(e.to_string())
        }
    };

    session.insert(session_keys::FLASH, flash).await?;
    Ok(Redirect::to("/scan-qr"))
}
