//! Provider error type.

use thiserror::Error;

/// Failures reaching or reading a companion data service.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP transport failure.
    #[error("Provider transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("Provider API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The response body could not be decoded into the expected shape.
    #[error("Provider response decode error: {0}")]
    Decode(#[from] serde_json::Error),
}
