//! The concrete planning stages and the canonical trip-planner graph.
//!
//! Stage implementations bind the [`plan_engine`] seams to the oracle and
//! provider traits: parse the request, fetch and select flights and hotels,
//! curate events, extract and geocode points of interest, synthesize the
//! schedule, evaluate against the budget, and route refinement rounds.
//! [`wiring`] assembles the graph and registry the planner service executes.

mod evaluate;
mod events;
mod extract;
mod flight;
mod geocode;
mod hotel;
mod parse;
mod router;
mod schedule;
mod selection;
pub mod wiring;

pub use evaluate::EvaluateStage;
pub use events::EventsStage;
pub use extract::ExtractStage;
pub use flight::FlightStage;
pub use geocode::GeocodeStage;
pub use hotel::HotelStage;
pub use parse::ParseStage;
pub use router::RefinementRouter;
pub use schedule::ScheduleStage;
pub use wiring::{planner_graph, planner_registry, PlannerDeps};

/// How many refinement rounds the planner allows before it settles for the
/// best plan it has.
pub const MAX_REFINEMENTS: u32 = 2;

/// How many candidates each option list is capped to before selection.
pub const MAX_OPTIONS: usize = 10;

/// How many raw events are kept when the curation oracle cannot decide.
pub const RAW_EVENT_FALLBACK: usize = 5;

/// Graph node IDs, shared between the wiring and the stage implementations.
pub mod ids {
    pub const START: &str = "start";
    pub const PARSE: &str = "parse";
    pub const FETCH: &str = "fetch";
    pub const FLIGHT: &str = "flight_search";
    pub const HOTEL: &str = "hotel_search";
    pub const EVENTS: &str = "event_curation";
    pub const BARRIER: &str = "barrier";
    pub const EXTRACT: &str = "poi_extraction";
    pub const GEOCODE: &str = "geocoding";
    pub const SCHEDULE: &str = "schedule";
    pub const EVALUATE: &str = "evaluation";
    pub const ROUTER: &str = "refinement_router";
    pub const END: &str = "end";
}
