//! Error types for the plan engine.

use thiserror::Error;

/// Result type alias using PlanEngineError.
pub type Result<T> = std::result::Result<T, PlanEngineError>;

/// Errors that can occur while executing a plan graph.
///
/// Only fatal conditions surface here. Soft failures (empty provider lists,
/// declined oracle decisions outside parse/schedule, per-entity geocoding
/// misses) are absorbed by the stages and land in the state as empty or
/// fallback values.
#[derive(Debug, Error)]
pub enum PlanEngineError {
    /// The graph is structurally unusable (no start node, dangling edge).
    #[error("Invalid plan graph: {0}")]
    InvalidGraph(String),

    /// A graph node references a stage with no registered implementation.
    #[error("No implementation registered for stage '{0}'")]
    UnknownStage(String),

    /// A stage ran before the state field it depends on was populated.
    #[error("Missing state for stage '{stage}': {field}")]
    MissingState { stage: String, field: String },

    /// A stage failed fatally for this request.
    #[error("Stage '{stage}' failed: {message}")]
    StageFailed { stage: String, message: String },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The caller cancelled the workflow.
    #[error("Plan execution cancelled")]
    Cancelled,
}

impl PlanEngineError {
    /// Create a fatal stage failure with a message.
    pub fn stage_failed(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StageFailed {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Create a missing-state error for a stage input.
    pub fn missing_state(stage: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingState {
            stage: stage.into(),
            field: field.into(),
        }
    }
}
