//! Domain models for the portal.

pub mod session;

pub use session::{Flash, FlashKind, SessionContext, keys as session_keys};
