//! The assembled itinerary and its evaluation.

use serde::{Deserialize, Serialize};

use crate::options::{FlightOption, HotelOption, PointOfInterest};

/// One day of the trip with its ordered activities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledDay {
    /// Day ordinal, 1-based.
    pub day: u32,
    /// Activities in visiting order. Every entry must come from the
    /// pre-scheduling candidate set; scheduling never invents places.
    pub activities: Vec<PointOfInterest>,
}

/// The complete candidate plan handed to the evaluation stage.
///
/// `days` may be empty: a flight+hotel-only trip is a valid outcome when no
/// activities or events were found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    pub flight: FlightOption,
    pub hotel: HotelOption,
    pub days: Vec<ScheduledDay>,
}

/// What the evaluator decided to do with the current plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvaluationAction {
    Approve,
    RefineFlight,
    RefineHotel,
}

/// Outcome of one evaluation round.
///
/// `total_cost` is always the engine's own computation; the oracle's figure
/// is never trusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationOutcome {
    pub action: EvaluationAction,
    /// Rationale, forwarded to the next selection round as feedback.
    pub feedback: String,
    pub total_cost: f64,
}

/// A geocoded itinerary entry prepared for map rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapMarker {
    pub day: u32,
    pub name: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
}
