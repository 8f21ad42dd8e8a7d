//! Error types for the lookup resolution engine.
//!
//! Uses thiserror for typed errors with readable messages. Nothing in
//! this crate retries: remote failures and configuration errors are
//! surfaced to the caller as-is.

use thiserror::Error;

/// Errors surfaced by lookup, apply and clear operations.
#[derive(Error, Debug)]
pub enum LookupError {
    /// The configured destination field could not be resolved on the
    /// record being edited (e.g. a stale row index).
    #[error("lookup destination field '{code}' was not found on the record")]
    MissingField { code: String },

    /// The configured search field does not exist on the matched source
    /// record. Indicates a broken plugin configuration.
    #[error("lookup source field '{code}' is missing on the source record; check the lookup configuration")]
    SourceFieldMissing { code: String },

    /// The search returned no candidate and the caller supplied no way
    /// to resolve the miss interactively.
    #[error("no record matched the entered value")]
    NoMatch,

    /// The search returned more than one candidate and the caller
    /// supplied no way to pick one interactively.
    #[error("multiple records matched the entered value; fetch candidates and choose one")]
    AmbiguousMatch,

    /// A failure reported by the host record store or metadata API.
    #[error("record gateway failure: {message}")]
    Gateway { message: String },
}

impl LookupError {
    /// Wrap a host-side failure message as a gateway error.
    pub fn gateway(message: impl Into<String>) -> Self {
        LookupError::Gateway {
            message: message.into(),
        }
    }
}
