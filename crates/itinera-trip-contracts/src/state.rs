//! The request-scoped planning state and its merge semantics.
//!
//! One [`TripState`] is created per request and threaded through every stage.
//! Stages never mutate it directly; they return a [`StateDelta`] that the
//! engine merges back in. Concurrent branches own disjoint delta fields, so
//! the fan-out merge can never conflict.

use serde::{Deserialize, Serialize};

use crate::itinerary::{EvaluationOutcome, Itinerary, MapMarker};
use crate::options::{Event, FlightOption, HotelOption, PointOfInterest};
use crate::trip::TripSpec;

/// Everything the workflow knows about one trip request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripState {
    /// The user's raw free-text request.
    pub user_request: String,
    /// Parsed specification; `None` only before the parse stage ran.
    pub spec: Option<TripSpec>,
    /// Flight candidates, ascending by the provider's desirability ordering.
    /// Fetched once; refinement rounds only advance the selection index.
    pub flight_options: Vec<FlightOption>,
    /// Index of the selected flight within `flight_options`.
    pub selected_flight: Option<usize>,
    /// Hotel candidates, same ordering contract as flights.
    pub hotel_options: Vec<HotelOption>,
    /// Index of the selected hotel within `hotel_options`.
    pub selected_hotel: Option<usize>,
    /// Curated events inside the travel window.
    pub events: Vec<Event>,
    /// Extracted points of interest, enriched in place by geocoding.
    pub points_of_interest: Vec<PointOfInterest>,
    /// The assembled plan, once schedule synthesis succeeded.
    pub itinerary: Option<Itinerary>,
    /// Latest evaluation round outcome.
    pub evaluation: Option<EvaluationOutcome>,
    /// Monotonic count of evaluation rounds completed.
    pub refinement_count: u32,
    /// Rendered Markdown report, set by the terminal renderer.
    pub report_markdown: Option<String>,
    /// Map markers for geocoded scheduled activities.
    pub map_markers: Option<Vec<MapMarker>>,
}

impl TripState {
    /// Start a fresh state for one request.
    pub fn new(user_request: impl Into<String>) -> Self {
        Self {
            user_request: user_request.into(),
            ..Self::default()
        }
    }

    /// The currently selected flight, when one exists.
    pub fn selected_flight(&self) -> Option<&FlightOption> {
        self.selected_flight.and_then(|i| self.flight_options.get(i))
    }

    /// The currently selected hotel, when one exists.
    pub fn selected_hotel(&self) -> Option<&HotelOption> {
        self.selected_hotel.and_then(|i| self.hotel_options.get(i))
    }

    /// Advance the flight selection to the next option in the original list.
    ///
    /// Returns `false` (selection unchanged) when there is no next option or
    /// nothing was selected to begin with.
    pub fn advance_flight_selection(&mut self) -> bool {
        advance(&mut self.selected_flight, self.flight_options.len())
    }

    /// Advance the hotel selection to the next option in the original list.
    pub fn advance_hotel_selection(&mut self) -> bool {
        advance(&mut self.selected_hotel, self.hotel_options.len())
    }

    /// Merge a stage's partial update into this state.
    ///
    /// Selection indices travel together with their option lists: a branch
    /// that produced an option list owns the matching selection field for
    /// that round, including "no selection" for a soft failure.
    pub fn apply(&mut self, delta: StateDelta) {
        if let Some(spec) = delta.spec {
            self.spec = Some(spec);
        }
        if let Some(options) = delta.flight_options {
            self.flight_options = options;
            self.selected_flight = delta.selected_flight;
        }
        if let Some(options) = delta.hotel_options {
            self.hotel_options = options;
            self.selected_hotel = delta.selected_hotel;
        }
        if let Some(events) = delta.events {
            self.events = events;
        }
        if let Some(pois) = delta.points_of_interest {
            self.points_of_interest = pois;
        }
        if let Some(itinerary) = delta.itinerary {
            self.itinerary = Some(itinerary);
        }
        if let Some(evaluation) = delta.evaluation {
            self.evaluation = Some(evaluation);
        }
        if let Some(count) = delta.refinement_count {
            self.refinement_count = count;
        }
        if let Some(report) = delta.report_markdown {
            self.report_markdown = Some(report);
        }
        if let Some(markers) = delta.map_markers {
            self.map_markers = Some(markers);
        }
    }
}

fn advance(selection: &mut Option<usize>, len: usize) -> bool {
    match *selection {
        Some(current) if current + 1 < len => {
            *selection = Some(current + 1);
            true
        }
        _ => false,
    }
}

/// A partial state update returned by one stage.
///
/// Every field is optional; `None` means "leave the state field untouched".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDelta {
    pub spec: Option<TripSpec>,
    pub flight_options: Option<Vec<FlightOption>>,
    /// Applied only together with `flight_options`.
    pub selected_flight: Option<usize>,
    pub hotel_options: Option<Vec<HotelOption>>,
    /// Applied only together with `hotel_options`.
    pub selected_hotel: Option<usize>,
    pub events: Option<Vec<Event>>,
    pub points_of_interest: Option<Vec<PointOfInterest>>,
    pub itinerary: Option<Itinerary>,
    pub evaluation: Option<EvaluationOutcome>,
    pub refinement_count: Option<u32>,
    pub report_markdown: Option<String>,
    pub map_markers: Option<Vec<MapMarker>>,
}

impl StateDelta {
    /// A delta that changes nothing, for pass-through stages.
    pub fn none() -> Self {
        Self::default()
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.spec.is_none()
            && self.flight_options.is_none()
            && self.hotel_options.is_none()
            && self.events.is_none()
            && self.points_of_interest.is_none()
            && self.itinerary.is_none()
            && self.evaluation.is_none()
            && self.refinement_count.is_none()
            && self.report_markdown.is_none()
            && self.map_markers.is_none()
    }
}
