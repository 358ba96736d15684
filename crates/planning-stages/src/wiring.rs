//! Canonical trip-planner graph and registry assembly.

use std::sync::Arc;

use plan_engine::{PlanGraph, StageEdge, StageKind, StageRegistry};
use trip_oracles::{
    CurationOracle, EvaluationOracle, ExtractionOracle, ParseOracle, SchedulingOracle,
    SelectionOracle,
};
use trip_providers::{EventSearch, FlightSearch, Geocoder, HotelSearch, PoiSearch};

use crate::router::handles;
use crate::{
    ids, EvaluateStage, EventsStage, ExtractStage, FlightStage, GeocodeStage, HotelStage,
    ParseStage, RefinementRouter, ScheduleStage, MAX_REFINEMENTS,
};

/// Everything the planner needs bound to its stages.
///
/// A single backend object may serve several oracle roles; each field is an
/// independent `Arc` so hosts can mix production and scripted pieces freely.
#[derive(Clone)]
pub struct PlannerDeps {
    pub parse: Arc<dyn ParseOracle>,
    pub selection: Arc<dyn SelectionOracle>,
    pub curation: Arc<dyn CurationOracle>,
    pub extraction: Arc<dyn ExtractionOracle>,
    pub scheduling: Arc<dyn SchedulingOracle>,
    pub evaluation: Arc<dyn EvaluationOracle>,
    pub flights: Arc<dyn FlightSearch>,
    pub hotels: Arc<dyn HotelSearch>,
    pub events: Arc<dyn EventSearch>,
    pub poi: Arc<dyn PoiSearch>,
    pub geocoder: Arc<dyn Geocoder>,
    pub max_refinements: u32,
}

impl PlannerDeps {
    /// The default refinement cap, matching [`MAX_REFINEMENTS`].
    pub fn default_max_refinements() -> u32 {
        MAX_REFINEMENTS
    }
}

/// The canonical planning graph:
///
/// ```text
/// start → parse → fetch ⇒ {flight, hotel, events} → barrier
///       → poi_extraction → geocoding → schedule → evaluation
///       → refinement_router → (end | flight | hotel)
/// ```
///
/// The refinement edges re-enter a single branch stage, whose own `next`
/// edge leads back to the barrier and through the tail of the pipeline.
pub fn planner_graph() -> PlanGraph {
    PlanGraph::new("trip-planner", "Trip planner")
        .with_node(ids::START, StageKind::Start)
        .with_node(ids::PARSE, StageKind::Stage)
        .with_node(
            ids::FETCH,
            StageKind::FanOut {
                branches: vec![
                    ids::FLIGHT.to_string(),
                    ids::HOTEL.to_string(),
                    ids::EVENTS.to_string(),
                ],
            },
        )
        .with_node(ids::FLIGHT, StageKind::Stage)
        .with_node(ids::HOTEL, StageKind::Stage)
        .with_node(ids::EVENTS, StageKind::Stage)
        .with_node(ids::BARRIER, StageKind::Barrier)
        .with_node(ids::EXTRACT, StageKind::Stage)
        .with_node(ids::GEOCODE, StageKind::Stage)
        .with_node(ids::SCHEDULE, StageKind::Stage)
        .with_node(ids::EVALUATE, StageKind::Stage)
        .with_node(ids::ROUTER, StageKind::Router)
        .with_node(ids::END, StageKind::End)
        .with_edge(StageEdge::next(ids::START, ids::PARSE))
        .with_edge(StageEdge::next(ids::PARSE, ids::FETCH))
        .with_edge(StageEdge::next(ids::FETCH, ids::BARRIER))
        .with_edge(StageEdge::next(ids::FLIGHT, ids::BARRIER))
        .with_edge(StageEdge::next(ids::HOTEL, ids::BARRIER))
        .with_edge(StageEdge::next(ids::EVENTS, ids::BARRIER))
        .with_edge(StageEdge::next(ids::BARRIER, ids::EXTRACT))
        .with_edge(StageEdge::next(ids::EXTRACT, ids::GEOCODE))
        .with_edge(StageEdge::next(ids::GEOCODE, ids::SCHEDULE))
        .with_edge(StageEdge::next(ids::SCHEDULE, ids::EVALUATE))
        .with_edge(StageEdge::next(ids::EVALUATE, ids::ROUTER))
        .with_edge(StageEdge::new(ids::ROUTER, handles::FINISH, ids::END))
        .with_edge(StageEdge::new(ids::ROUTER, handles::REFINE_FLIGHT, ids::FLIGHT))
        .with_edge(StageEdge::new(ids::ROUTER, handles::REFINE_HOTEL, ids::HOTEL))
}

/// Bind the concrete stages and the refinement router to their node IDs.
pub fn planner_registry(deps: PlannerDeps) -> StageRegistry {
    StageRegistry::new()
        .with_stage(Arc::new(ParseStage::new(deps.parse)))
        .with_stage(Arc::new(FlightStage::new(deps.flights, deps.selection.clone())))
        .with_stage(Arc::new(HotelStage::new(deps.hotels, deps.selection)))
        .with_stage(Arc::new(EventsStage::new(deps.events, deps.curation)))
        .with_stage(Arc::new(ExtractStage::new(deps.poi, deps.extraction)))
        .with_stage(Arc::new(GeocodeStage::new(deps.geocoder)))
        .with_stage(Arc::new(ScheduleStage::new(deps.scheduling)))
        .with_stage(Arc::new(EvaluateStage::new(deps.evaluation)))
        .with_router(Arc::new(RefinementRouter::new(deps.max_refinements)))
}
