//! Structured request/response shapes for each oracle decision.

use serde::{Deserialize, Serialize};

use itinera_trip_contracts::{Event, EvaluationAction, PointOfInterest};

/// Which option category a selection concerns; colors the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    Flight,
    Hotel,
}

impl OptionKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Flight => "flight",
            Self::Hotel => "hotel",
        }
    }
}

/// A select-among-options decision problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRequest {
    pub kind: OptionKind,
    /// One human-readable line per candidate, in list order.
    pub options: Vec<String>,
    /// The user's total budget, when stated.
    pub budget: Option<f64>,
    /// Evaluator feedback from the previous round, on refinement entries.
    pub feedback: Option<String>,
}

/// The oracle's pick: an index into the candidate list plus its rationale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionChoice {
    pub index: usize,
    pub reasoning: String,
}

/// A curate-events decision problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurationRequest {
    /// The user's interest tags.
    pub interests: Vec<String>,
    /// Raw events inside the travel window, provider order.
    pub events: Vec<Event>,
}

/// An extract-places decision problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRequest {
    pub destination: String,
    /// Concatenated raw web-search results.
    pub raw_text: String,
}

/// A partition-into-days decision problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub destination: String,
    /// Trip length in days; every returned day ordinal must be in 1..=days.
    pub days: i64,
    /// Candidate activities; the oracle must reuse these exact names.
    pub activities: Vec<PointOfInterest>,
    /// Fixed-date events that must land on their own date.
    pub events: Vec<Event>,
}

/// One day of the oracle's partition.
///
/// Coordinates are not trusted from the oracle; the scheduling stage
/// re-attaches them from the geocoded candidate set by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPlanDraft {
    pub day: u32,
    pub activities: Vec<PointOfInterest>,
}

/// A cheaper flight alternative with its quality deltas.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightAlternative {
    pub airline: String,
    pub price: f64,
    /// How much switching would save.
    pub saving: f64,
    /// Positive means the alternative takes longer.
    pub duration_change_minutes: i64,
    pub has_layover: bool,
}

/// A cheaper hotel alternative with its quality deltas.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelAlternative {
    pub name: String,
    pub total_price: f64,
    pub saving: f64,
    pub rating: f64,
    /// Rating of the currently selected hotel, for the trade-off.
    pub current_rating: f64,
}

/// An evaluate-plan decision problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest {
    pub budget: Option<f64>,
    /// The engine's own cost computation; the oracle never recomputes it.
    pub total_cost: f64,
    /// One-line description of the selected flight.
    pub current_flight: String,
    /// One-line description of the selected hotel.
    pub current_hotel: String,
    pub cheaper_flight: Option<FlightAlternative>,
    pub cheaper_hotel: Option<HotelAlternative>,
}

impl EvaluationRequest {
    /// Whether the plan currently exceeds the stated budget.
    pub fn over_budget(&self) -> bool {
        matches!(self.budget, Some(budget) if self.total_cost > budget)
    }
}

/// The evaluator's recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationVerdict {
    pub action: EvaluationAction,
    pub feedback: String,
}
