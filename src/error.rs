//! Error types.

use thiserror::Error;

/// Errors raised while configuring or constructing a simulation.
#[derive(Debug, Error)]
pub enum Error {
    /// The ring attributes are degenerate or out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    /// Explicitly supplied vehicle state violates the ring invariants.
    #[error("invalid vehicle state: {0}")]
    InvalidState(&'static str),

    /// A configuration document could not be parsed.
    #[error("malformed configuration document: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialised `Result` for this crate.
pub type Result<T> = std::result::Result<T, Error>;
