//! QRVotify Core - Shared domain library.
//!
//! This crate provides the voter portal's domain logic:
//! - `types` - Newtypes for emails, mobile numbers, voter IDs and genders
//! - `registration` - The registration wizard (field store, validator, step controller)
//! - `login` - Login form rules and OTP resend cooldown
//! - `scan` - Scanned-voter lock state
//! - `countdown` - Election countdown arithmetic
//! - `profile` - Password change and profile edit request rules
//! - `officers` - Election officer directory and location filter
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no clocks except where a caller explicitly asks for "now". This
//! keeps the wizard testable in isolation from the web layer.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod countdown;
pub mod fields;
pub mod login;
pub mod officers;
pub mod profile;
pub mod registration;
pub mod scan;
pub mod types;

pub use countdown::TimeLeft;
pub use fields::FieldErrors;
pub use types::*;
