//! Canonical data contracts for Itinera trip planning.
//!
//! This crate defines the value objects exchanged between providers, oracles,
//! and the planning engine: the parsed trip specification, candidate options
//! (flights, hotels, events, points of interest), the assembled itinerary,
//! and the request-scoped planning state with its delta-merge semantics.
//!
//! Nothing here performs I/O; every type is plain data with serde support so
//! it can cross the provider and oracle wire boundaries unchanged.

mod itinerary;
mod options;
mod state;
mod trip;

pub use itinerary::{
    EvaluationAction, EvaluationOutcome, Itinerary, MapMarker, ScheduledDay,
};
pub use options::{Event, FlightLeg, FlightOption, HotelOption, PointOfInterest};
pub use state::{StateDelta, TripState};
pub use trip::{TripSpec, TripSpecError};
