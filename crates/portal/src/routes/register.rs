//! Voter registration wizard route handlers.
//!
//! The wizard is a single page (`/create-user`) whose body depends on the
//! current step. Every POST carries the inputs of the visible step plus an
//! `action` (`next`, `back`, `submit`, or none to just save):
//!
//! ```text
//! POST /create-user ──apply inputs──> action
//!   next   -> redirect (or 422 when the step gate blocks)
//!   back   -> redirect
//!   submit -> begin_submit ──(lock released)──> voter API ──> complete | fail
//! ```

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use qrvotify_core::registration::{
    Attachment, Field, FileSlot, PasswordStrength, Step, SubmitError, Wizard,
};
use qrvotify_core::{FieldErrors, Gender};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::OptionalSession;
use crate::models::session_keys;
use crate::services::{DraftId, SharedWizard};
use crate::state::AppState;

/// Shown on step 3 when the voter API rejects or cannot take a submission.
const SUBMIT_FAILED_MESSAGE: &str = "Registration failed. Please try again.";

/// Shown when a request arrives while a submit is in flight.
const IN_PROGRESS_MESSAGE: &str = "Your registration is already being submitted.";

// =============================================================================
// Form Types
// =============================================================================

/// What the voter clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardAction {
    Save,
    Next,
    Back,
    Submit,
}

impl WizardAction {
    fn parse(value: &str) -> Self {
        match value {
            "next" => Self::Next,
            "back" => Self::Back,
            "submit" => Self::Submit,
            _ => Self::Save,
        }
    }
}

/// Inputs of one wizard POST.
#[derive(Debug)]
pub struct WizardForm {
    pub action: WizardAction,
    pub fields: Vec<(Field, String)>,
    pub files: Vec<(FileSlot, Attachment)>,
}

impl WizardForm {
    /// Read the multipart body.
    ///
    /// Unknown parts are ignored. File inputs left empty by the browser
    /// arrive as zero-length parts without a file name and are skipped.
    async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self {
            action: WizardAction::Save,
            fields: Vec::new(),
            files: Vec::new(),
        };

        while let Some(part) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?
        {
            let Some(name) = part.name().map(str::to_owned) else {
                continue;
            };

            if name == "action" {
                let value = part
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                form.action = WizardAction::parse(&value);
            } else if let Some(field) = Field::from_name(&name) {
                let value = part
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                form.fields.push((field, value));
            } else if let Some(slot) = FileSlot::from_name(&name) {
                let file_name = part.file_name().unwrap_or_default().to_owned();
                let content_type = part.content_type().map(str::to_owned);
                let bytes = part
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                if file_name.is_empty() || bytes.is_empty() {
                    continue;
                }
                form.files
                    .push((slot, Attachment::new(file_name, content_type, bytes.to_vec())));
            } else {
                tracing::debug!(part = %name, "Ignoring unknown registration input");
            }
        }

        Ok(form)
    }

    /// Apply the inputs to the wizard.
    ///
    /// Blank password inputs keep the stored value: passwords are never
    /// echoed back, so revisiting step 3 posts them empty.
    fn apply_to(self, wizard: &mut Wizard) {
        for (field, value) in self.fields {
            if field.is_secret() && value.is_empty() {
                continue;
            }
            wizard.set_field(field, value);
        }
        for (slot, file) in self.files {
            wizard.set_file(slot, file);
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Registration wizard template. One template, one `match` over the step.
#[derive(Template, WebTemplate)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub current_voter: Option<String>,
    pub step: Step,
    pub progress: u8,
    pub genders: [Gender; 3],
    pub values: Vec<(&'static str, String)>,
    pub age: String,
    pub uploads: Vec<(&'static str, String)>,
    pub errors: FieldErrors,
    pub password_strength: Option<PasswordStrength>,
    pub is_submitting: bool,
    pub submit_error: Option<String>,
    pub notice: Option<String>,
}

impl RegisterTemplate {
    fn new(wizard: &Wizard, current_voter: Option<String>) -> Self {
        let draft = wizard.draft();
        Self {
            current_voter,
            step: wizard.step(),
            progress: wizard.step().progress_percent(),
            genders: Gender::ALL,
            values: Field::ALL
                .into_iter()
                .filter(|field| !field.is_secret())
                .map(|field| (field.name(), draft.display(field).to_string()))
                .collect(),
            age: draft.age().map(|age| age.to_string()).unwrap_or_default(),
            uploads: FileSlot::ALL
                .into_iter()
                .filter_map(|slot| draft.file(slot).map(|f| (slot.name(), f.file_name.clone())))
                .collect(),
            errors: wizard.errors().clone(),
            password_strength: wizard.password_strength(),
            is_submitting: wizard.is_submitting(),
            submit_error: wizard.submit_error().map(str::to_owned),
            notice: None,
        }
    }

    fn with_notice(mut self, notice: impl Into<String>) -> Self {
        self.notice = Some(notice.into());
        self
    }

    /// Current value of a text input.
    fn value(&self, name: &str) -> &str {
        self.values
            .iter()
            .find(|(field, _)| *field == name)
            .map_or("", |(_, value)| value.as_str())
    }

    /// File name of an uploaded attachment.
    fn upload(&self, name: &str) -> Option<&str> {
        self.uploads
            .iter()
            .find(|(slot, _)| *slot == name)
            .map(|(_, file_name)| file_name.as_str())
    }

    fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name)
    }
}

// =============================================================================
// Routes
// =============================================================================

/// The session's wizard, creating one (and remembering its ID) if needed.
async fn session_wizard(state: &AppState, session: &Session) -> Result<(DraftId, SharedWizard)> {
    let stored: Option<DraftId> = session.get(session_keys::DRAFT_ID).await?;
    let (id, wizard) = state.drafts().get_or_create(stored).await;
    if stored != Some(id) {
        session.insert(session_keys::DRAFT_ID, id).await?;
    }
    Ok((id, wizard))
}

/// Display the wizard at its current step.
#[instrument(skip(state, session, voter))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalSession(voter): OptionalSession,
) -> Result<impl IntoResponse> {
    let (_, wizard) = session_wizard(&state, &session).await?;
    let wizard = wizard.lock().await;
    Ok(RegisterTemplate::new(&wizard, voter.map(|v| v.display_name)))
}

/// Apply a step's inputs and perform the requested action.
#[instrument(skip_all)]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    OptionalSession(voter): OptionalSession,
    multipart: Multipart,
) -> Result<Response> {
    let form = WizardForm::from_multipart(multipart).await?;
    let action = form.action;
    let current_voter = voter.map(|v| v.display_name);

    let (draft_id, shared) = session_wizard(&state, &session).await?;
    let mut wizard = shared.lock().await;

    // Input is frozen until the voter API answers.
    if wizard.is_submitting() {
        tracing::debug!(draft_id = %draft_id, "Refusing wizard input during submit");
        let page = RegisterTemplate::new(&wizard, current_voter).with_notice(IN_PROGRESS_MESSAGE);
        return Ok((StatusCode::CONFLICT, page).into_response());
    }
    form.apply_to(&mut wizard);

    match action {
        WizardAction::Save => Ok(Redirect::to("/create-user").into_response()),
        WizardAction::Back => {
            if let Err(e) = wizard.back() {
                tracing::debug!(error = %e, "Refused to go back");
            }
            Ok(Redirect::to("/create-user").into_response())
        }
        WizardAction::Next => match wizard.next() {
            Ok(step) => {
                tracing::debug!(step = step.number(), "Advanced registration step");
                Ok(Redirect::to("/create-user").into_response())
            }
            Err(e) => {
                tracing::debug!(error = %e, "Step gate refused to advance");
                let page = RegisterTemplate::new(&wizard, current_voter)
                    .with_notice("Please correct the highlighted fields before continuing.");
                Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
            }
        },
        WizardAction::Submit => {
            let snapshot = match wizard.begin_submit() {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    let (status, notice) = match e {
                        SubmitError::Invalid(_) => (
                            StatusCode::UNPROCESSABLE_ENTITY,
                            "Please correct the highlighted fields before submitting.",
                        ),
                        SubmitError::InProgress => (StatusCode::CONFLICT, IN_PROGRESS_MESSAGE),
                        SubmitError::NotFinalStep => (
                            StatusCode::BAD_REQUEST,
                            "Complete every step before submitting.",
                        ),
                    };
                    let page =
                        RegisterTemplate::new(&wizard, current_voter).with_notice(notice);
                    return Ok((status, page).into_response());
                }
            };
            // The gateway call runs without holding the wizard.
            drop(wizard);

            add_breadcrumb("registration", "Submitting registration", None);
            let outcome = state.api().submit_registration(&snapshot).await;

            let mut wizard = shared.lock().await;
            match outcome {
                Ok(()) => {
                    wizard.complete_submit();
                    drop(wizard);
                    state.drafts().discard(draft_id).await;
                    session.remove::<DraftId>(session_keys::DRAFT_ID).await?;
                    tracing::info!(draft_id = %draft_id, "Registration submitted");
                    Ok(Redirect::to("/?registered=1").into_response())
                }
                Err(e) => {
                    tracing::error!(error = %e, draft_id = %draft_id, "Registration submission failed");
                    wizard.fail_submit(SUBMIT_FAILED_MESSAGE);
                    let page = RegisterTemplate::new(&wizard, current_voter);
                    Ok((StatusCode::BAD_GATEWAY, page).into_response())
                }
            }
        }
    }
}
