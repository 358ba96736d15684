//! The stage and router seams the executor binds behavior through.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use itinera_trip_contracts::{StateDelta, TripState};

use crate::error::Result;

/// Cooperative cancellation flag shared between a caller and one execution.
///
/// The executor checks it at every stage boundary; long-running stages (the
/// serial geocoding loop) may also poll it between external calls.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of the execution holding this flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Per-execution context handed to every stage.
#[derive(Debug, Clone)]
pub struct StageContext {
    /// Unique ID of this execution, for log correlation.
    pub execution_id: String,
    /// Cooperative cancellation flag for this execution.
    pub cancel: CancelFlag,
}

impl StageContext {
    pub fn new(execution_id: impl Into<String>) -> Self {
        Self {
            execution_id: execution_id.into(),
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }
}

/// What a stage hands back to the executor: a partial state update plus an
/// optional human-readable progress note for the event stream.
#[derive(Debug, Clone, Default)]
pub struct StageOutput {
    pub delta: StateDelta,
    pub note: Option<String>,
}

impl StageOutput {
    /// Wrap a delta with no note.
    pub fn delta(delta: StateDelta) -> Self {
        Self { delta, note: None }
    }

    /// A pass-through output that changes nothing.
    pub fn unchanged() -> Self {
        Self::default()
    }

    /// Attach a progress note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// One unit of planning work.
///
/// A stage reads the fields of [`TripState`] it declares an interest in and
/// returns a [`StageOutput`]; it never mutates the state directly. Returning
/// `Err` is reserved for fatal-to-request conditions; soft failures must be
/// expressed as empty or fallback values in the delta.
#[async_trait]
pub trait Stage: Send + Sync {
    /// The graph node ID this stage implements.
    fn id(&self) -> &str;

    /// Execute the stage against the current state.
    async fn run(&self, state: &TripState, ctx: &StageContext) -> Result<StageOutput>;
}

/// Decision produced by a router evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDecision {
    /// The edge handle to follow out of the router node.
    pub handle: String,
    /// Human-readable explanation for the event stream.
    pub note: Option<String>,
}

impl RouteDecision {
    pub fn follow(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Conditional routing logic bound to a Router node.
///
/// Routers are synchronous and may adjust the state as part of the
/// transition (the refinement router advances the selection pointer before
/// re-entering a branch).
pub trait Router: Send + Sync {
    /// The graph node ID this router implements.
    fn id(&self) -> &str;

    /// Choose the outgoing handle for the current state.
    fn route(&self, state: &mut TripState) -> RouteDecision;
}

/// A registry mapping graph node IDs to their bound implementations.
#[derive(Default)]
pub struct StageRegistry {
    stages: HashMap<String, Arc<dyn Stage>>,
    routers: HashMap<String, Arc<dyn Router>>,
}

impl StageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a stage under its own ID.
    pub fn with_stage(mut self, stage: Arc<dyn Stage>) -> Self {
        self.stages.insert(stage.id().to_string(), stage);
        self
    }

    /// Register a router under its own ID.
    pub fn with_router(mut self, router: Arc<dyn Router>) -> Self {
        self.routers.insert(router.id().to_string(), router);
        self
    }

    pub fn stage(&self, id: &str) -> Option<&Arc<dyn Stage>> {
        self.stages.get(id)
    }

    pub fn router(&self, id: &str) -> Option<&Arc<dyn Router>> {
        self.routers.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_flag_is_shared() {
        let flag = CancelFlag::new();
        let clone = flag.clone();
        assert!(!clone.is_cancelled());
        flag.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_route_decision_builder() {
        let decision = RouteDecision::follow("refine_hotel").with_note("over budget");
        assert_eq!(decision.handle, "refine_hotel");
        assert_eq!(decision.note.as_deref(), Some("over budget"));
    }
}
