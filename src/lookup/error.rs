//! Domain errors for the lookup workflow.
//!
//! None of these abort the process: the orchestrator logs them and the
//! workflow stays in a displayable state.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("Invalid ASIN '{0}'. {hint}", hint = crate::lookup::validator::INVALID_ASIN_HINT)]
    InvalidIdentifier(String),

    #[error("No ASIN entered")]
    EmptyIdentifier,

    #[error("A lookup for '{0}' is already in flight")]
    RequestRejected(String),

    #[error("Unknown relay '{relay}'. Known relays: {known}")]
    UnknownRelay { relay: String, known: String },
}
