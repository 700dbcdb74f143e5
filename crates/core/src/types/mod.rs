//! Core types for QRVotify.
//!
//! This module provides type-safe wrappers for voter-facing values.

pub mod email;
pub mod gender;
pub mod mobile;
pub mod voter_id;

pub use email::{Email, EmailError};
pub use gender::Gender;
pub use mobile::{MobileError, MobileNumber};
pub use voter_id::{VoterId, VoterIdError};
