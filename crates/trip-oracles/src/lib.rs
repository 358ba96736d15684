//! Reasoning-oracle contracts for Itinera.
//!
//! Every LLM-assisted decision in the planner goes through one of the typed
//! traits defined here: parse a free-text request, select among options,
//! curate an event list, extract places from unstructured text, partition
//! activities into days, or evaluate a complete plan against a budget. Each
//! call yields either a
//! decided, schema-validated value or an explicit
//! [`OracleOutcome::NoDecision`] that callers must treat as a soft failure.
//!
//! [`ChatOracle`] is the production implementation over an OpenAI-compatible
//! chat-completions endpoint; [`mock`] holds scripted stand-ins for
//! deterministic tests.

mod backend;
mod llm;
pub mod mock;
mod outcome;
mod prompts;
mod types;

pub use backend::{ChatBackend, ChatRequest, OpenAiChatBackend};
pub use llm::ChatOracle;
pub use outcome::{OracleError, OracleOutcome};
pub use types::{
    CurationRequest, DayPlanDraft, EvaluationRequest, EvaluationVerdict, ExtractionRequest,
    FlightAlternative, HotelAlternative, OptionChoice, OptionKind, ScheduleRequest,
    SelectionRequest,
};

use async_trait::async_trait;
use chrono::NaiveDate;
use itinera_trip_contracts::{Event, PointOfInterest, TripSpec};

/// Coerces a raw user request into a structured trip specification.
#[async_trait]
pub trait ParseOracle: Send + Sync {
    /// `today` anchors relative dates ("next weekend") in the request.
    async fn parse_trip(
        &self,
        user_request: &str,
        today: NaiveDate,
    ) -> Result<OracleOutcome<TripSpec>, OracleError>;
}

/// Chooses one option from a finite candidate list.
#[async_trait]
pub trait SelectionOracle: Send + Sync {
    async fn select_option(
        &self,
        request: &SelectionRequest,
    ) -> Result<OracleOutcome<OptionChoice>, OracleError>;
}

/// Dedupes a raw event list and keeps the handful most relevant to the
/// user's interests.
#[async_trait]
pub trait CurationOracle: Send + Sync {
    async fn curate_events(
        &self,
        request: &CurationRequest,
    ) -> Result<OracleOutcome<Vec<Event>>, OracleError>;
}

/// Extracts concrete, geocodable places from unstructured search text.
#[async_trait]
pub trait ExtractionOracle: Send + Sync {
    async fn extract_places(
        &self,
        request: &ExtractionRequest,
    ) -> Result<OracleOutcome<Vec<PointOfInterest>>, OracleError>;
}

/// Partitions activities and fixed-date events into ordered days.
#[async_trait]
pub trait SchedulingOracle: Send + Sync {
    async fn schedule(
        &self,
        request: &ScheduleRequest,
    ) -> Result<OracleOutcome<Vec<DayPlanDraft>>, OracleError>;
}

/// Judges a complete plan against the budget and recommends the next action.
#[async_trait]
pub trait EvaluationOracle: Send + Sync {
    async fn evaluate(
        &self,
        request: &EvaluationRequest,
    ) -> Result<OracleOutcome<EvaluationVerdict>, OracleError>;
}
