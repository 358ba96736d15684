//! Oracle outcome and error types.

use thiserror::Error;

/// Transport-level oracle failures.
///
/// These are distinct from [`OracleOutcome::NoDecision`]: an error means the
/// capability itself was unreachable or misbehaved; a no-decision means it
/// answered but declined or produced output that failed schema validation.
#[derive(Debug, Error)]
pub enum OracleError {
    /// HTTP transport failure reaching the model endpoint.
    #[error("Oracle transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("Oracle API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The response envelope itself could not be read.
    #[error("Malformed oracle response: {0}")]
    Malformed(String),
}

/// Result of one oracle invocation: a decided value or an explicit refusal.
#[derive(Debug, Clone, PartialEq)]
pub enum OracleOutcome<T> {
    /// The oracle produced a value that passed schema validation.
    Decided(T),
    /// The oracle declined or its output failed validation. Callers outside
    /// the parse and schedule stages must degrade, not abort.
    NoDecision { reason: String },
}

impl<T> OracleOutcome<T> {
    /// Shorthand for a refusal with a reason.
    pub fn declined(reason: impl Into<String>) -> Self {
        Self::NoDecision {
            reason: reason.into(),
        }
    }

    /// The decided value, if any.
    pub fn decided(self) -> Option<T> {
        match self {
            Self::Decided(value) => Some(value),
            Self::NoDecision { .. } => None,
        }
    }

    /// Map the decided value, keeping a refusal as is.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> OracleOutcome<U> {
        match self {
            Self::Decided(value) => OracleOutcome::Decided(f(value)),
            Self::NoDecision { reason } => OracleOutcome::NoDecision { reason },
        }
    }
}
