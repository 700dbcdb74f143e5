//! Step controller for the registration wizard.
//!
//! Owns the draft, the current step, the latest validation result and the
//! in-flight submit flag. The submit itself is performed by the caller:
//!
//! ```text
//! begin_submit() -> snapshot ──(gateway call)──> complete_submit() | fail_submit(msg)
//! ```

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fields::FieldErrors;
use crate::registration::draft::{Attachment, Field, FileSlot, RegistrationDraft};
use crate::registration::password::PasswordStrength;
use crate::registration::step::Step;
use crate::registration::validate::validate;

/// Whether "Next" waits for the current step to be valid.
///
/// `Ungated` advances regardless of validation, which is how the wizard has
/// always behaved. `BlockOnErrors` refuses to leave a step while any of its
/// own fields have errors; earlier steps are never re-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepGate {
    #[default]
    Ungated,
    BlockOnErrors,
}

impl std::str::FromStr for StepGate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ungated" => Ok(Self::Ungated),
            "block" | "block_on_errors" => Ok(Self::BlockOnErrors),
            _ => Err(format!("invalid step gate: {s} (expected `ungated` or `block`)")),
        }
    }
}

/// Refusal to change step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    #[error("step {step} has {count} invalid field(s)")]
    Blocked { step: u8, count: usize },
    #[error("the wizard is frozen while a submission is in progress")]
    Submitting,
}

/// Refusal to start a submit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("registration can only be submitted from the final step")]
    NotFinalStep,
    #[error("a submission is already in progress")]
    InProgress,
    #[error("registration has {} invalid field(s)", .0.len())]
    Invalid(FieldErrors),
}

/// The registration wizard.
#[derive(Debug, Clone)]
pub struct Wizard {
    draft: RegistrationDraft,
    step: Step,
    errors: FieldErrors,
    password_strength: Option<PasswordStrength>,
    is_submitting: bool,
    submit_error: Option<String>,
    gate: StepGate,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new(StepGate::default())
    }
}

impl Wizard {
    /// A fresh wizard on step 1 with an empty draft and no errors shown.
    #[must_use]
    pub fn new(gate: StepGate) -> Self {
        Self {
            draft: RegistrationDraft::new(),
            step: Step::Personal,
            errors: FieldErrors::new(),
            password_strength: None,
            is_submitting: false,
            submit_error: None,
            gate,
        }
    }

    #[must_use]
    pub const fn draft(&self) -> &RegistrationDraft {
        &self.draft
    }

    #[must_use]
    pub const fn step(&self) -> Step {
        self.step
    }

    /// Errors from the most recent validation run.
    #[must_use]
    pub const fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    #[must_use]
    pub const fn password_strength(&self) -> Option<PasswordStrength> {
        self.password_strength
    }

    /// Whether a submit is in flight. The submit control is disabled while set.
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    /// Message from the last failed submit, cleared when a new one starts.
    #[must_use]
    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    #[must_use]
    pub const fn gate(&self) -> StepGate {
        self.gate
    }

    /// Update a text field and re-validate. Ignored while submitting.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        self.set_field_on(field, value, Local::now().date_naive());
    }

    /// Update a text field, deriving age against `today`, and re-validate.
    pub fn set_field_on(&mut self, field: Field, value: impl Into<String>, today: NaiveDate) {
        if self.is_submitting {
            return;
        }
        let value = value.into();
        if field == Field::Password {
            self.password_strength = PasswordStrength::of(&value);
        }
        self.draft.set_field_on(field, value, today);
        self.errors = validate(&self.draft);
    }

    /// Store an upload and re-validate. Ignored while submitting.
    pub fn set_file(&mut self, slot: FileSlot, file: Attachment) {
        if self.is_submitting {
            return;
        }
        self.draft.set_file(slot, file);
        self.errors = validate(&self.draft);
    }

    /// Advance one step. A no-op on the final step.
    ///
    /// # Errors
    ///
    /// - [`StepError::Submitting`] while a submit is in flight
    /// - [`StepError::Blocked`] with [`StepGate::BlockOnErrors`] while the
    ///   current step's fields have errors
    pub fn next(&mut self) -> Result<Step, StepError> {
        if self.is_submitting {
            return Err(StepError::Submitting);
        }
        if self.gate == StepGate::BlockOnErrors {
            let own = validate(&self.draft).restricted_to(self.step.error_keys());
            if !own.is_empty() {
                let count = own.len();
                self.errors = validate(&self.draft);
                return Err(StepError::Blocked {
                    step: self.step.number(),
                    count,
                });
            }
        }
        self.step = self.step.next();
        Ok(self.step)
    }

    /// Go back one step. A no-op on the first step.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::Submitting`] while a submit is in flight.
    pub fn back(&mut self) -> Result<Step, StepError> {
        if self.is_submitting {
            return Err(StepError::Submitting);
        }
        self.step = self.step.back();
        Ok(self.step)
    }

    /// Start a submit: validate everything, mark the wizard as submitting and
    /// hand back a snapshot of the draft for the gateway.
    ///
    /// # Errors
    ///
    /// - [`SubmitError::NotFinalStep`] when not on step 3
    /// - [`SubmitError::InProgress`] when a submit is already running
    /// - [`SubmitError::Invalid`] when any field fails validation; the
    ///   errors are also stored for display
    pub fn begin_submit(&mut self) -> Result<RegistrationDraft, SubmitError> {
        if !self.step.is_final() {
            return Err(SubmitError::NotFinalStep);
        }
        if self.is_submitting {
            return Err(SubmitError::InProgress);
        }

        self.errors = validate(&self.draft);
        if !self.errors.is_empty() {
            return Err(SubmitError::Invalid(self.errors.clone()));
        }

        self.is_submitting = true;
        self.submit_error = None;
        Ok(self.draft.clone())
    }

    /// Record a successful submit. The caller discards the wizard afterwards.
    pub fn complete_submit(&mut self) {
        self.is_submitting = false;
    }

    /// Record a failed submit so the voter can retry from the final step.
    pub fn fail_submit(&mut self, message: impl Into<String>) {
        self.is_submitting = false;
        self.step = Step::ContactAndSecurity;
        self.submit_error = Some(message.into());
    }
}
