//! Voter registration wizard.
//!
//! The wizard is split into small pieces, leaves first:
//!
//! - [`draft`] - the field store holding every answer, including uploads
//! - [`validate`] - pure validator producing [`FieldErrors`](crate::FieldErrors)
//! - [`password`] - informational password strength
//! - [`step`] - the three wizard steps
//! - [`wizard`] - the step controller composing all of the above
//!
//! Submitting a finished draft is the web layer's job; the wizard only
//! decides whether a submit may start and records how it ended.

pub mod draft;
pub mod password;
pub mod step;
pub mod validate;
pub mod wizard;

pub use draft::{Attachment, DocumentSlot, Documents, Field, FileSlot, RegistrationDraft, derive_age};
pub use password::PasswordStrength;
pub use step::Step;
pub use validate::validate;
pub use wizard::{StepError, StepGate, SubmitError, Wizard};
