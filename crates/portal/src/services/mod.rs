//! Services backing the portal's routes.
//!
//! - `api` - Voter API client (registration submission, login, OTP, profile, elections)
//! - `card` - Voter ID card and QR code rendering
//! - `drafts` - In-memory registration wizards keyed by session

pub mod api;
pub mod card;
pub mod drafts;

pub use api::{ApiError, Election, LoginRequest, LoginResponse, VoterApiClient};
pub use card::CardError;
pub use drafts::{DraftId, DraftStore, SharedWizard};
