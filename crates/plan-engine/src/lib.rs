//! Stage-graph workflow engine for Itinera.
//!
//! The engine executes a [`PlanGraph`]: a first-class, inspectable directed
//! graph of planning stages with named edge handles. Execution starts at the
//! Start node and walks edges until an End node, running fan-out branches
//! concurrently and merging their disjoint [`StateDelta`]s at the barrier.
//! Conditional re-entry (the refinement loop) is expressed as a Router node
//! whose chosen handle selects the outgoing edge.
//!
//! Stage implementations live in the `planning-stages` crate; this crate only
//! knows about the [`Stage`] and [`Router`] seams and the threaded
//! [`itinera_trip_contracts::TripState`].

mod error;
mod events;
mod executor;
mod graph;
mod retry;
mod stage;

pub use error::{PlanEngineError, Result};
pub use events::{ChannelEventSink, EventError, EventSink, NullEventSink, PlanEvent, VecEventSink};
pub use executor::{PlanExecutor, PlanRun};
pub use graph::{PlanGraph, StageEdge, StageId, StageKind, StageNode};
pub use retry::RetryPolicy;
pub use stage::{
    CancelFlag, RouteDecision, Router, Stage, StageContext, StageOutput, StageRegistry,
};
