//! The plan graph executor.
//!
//! Walks a [`PlanGraph`] from its Start node, running stages bound through a
//! [`StageRegistry`], merging each stage's delta into the threaded
//! [`TripState`] and emitting one event per stage transition. Fan-out nodes
//! run their branch stages concurrently and converge before the barrier;
//! Router nodes pick the next edge dynamically, which is how the bounded
//! refinement loop re-enters a single branch.

use std::time::Instant;

use futures_util::future::join_all;
use itinera_trip_contracts::TripState;

use crate::error::{PlanEngineError, Result};
use crate::events::{EventSink, PlanEvent};
use crate::graph::{PlanGraph, StageKind};
use crate::stage::{CancelFlag, Stage, StageContext, StageRegistry};

/// Outcome of one full graph execution.
///
/// Fatal stage failures land here rather than in `Err`: the caller gets the
/// partially populated state back so it can explain what is missing. `Err`
/// from [`PlanExecutor::execute`] is reserved for structural problems
/// (invalid graph, unbound stage) and cancellation.
#[derive(Debug)]
pub struct PlanRun {
    /// Whether execution reached an End node.
    pub success: bool,
    /// The state as of the last completed stage.
    pub state: TripState,
    /// Fatal failure description when `success` is false.
    pub error: Option<String>,
    /// Number of graph nodes executed.
    pub stages_executed: u32,
    /// Total execution time in milliseconds.
    pub execution_time_ms: u64,
}

impl PlanRun {
    fn success(state: TripState, stages_executed: u32, execution_time_ms: u64) -> Self {
        Self {
            success: true,
            state,
            error: None,
            stages_executed,
            execution_time_ms,
        }
    }

    fn failure(
        state: TripState,
        error: impl Into<String>,
        stages_executed: u32,
        execution_time_ms: u64,
    ) -> Self {
        Self {
            success: false,
            state,
            error: Some(error.into()),
            stages_executed,
            execution_time_ms,
        }
    }
}

/// Executor for plan graphs.
pub struct PlanExecutor {
    registry: StageRegistry,
    /// Hard limit on executed nodes, independent of the refinement cap.
    max_steps: u32,
    execution_id: String,
}

impl PlanExecutor {
    /// Create an executor over a registry of bound stages and routers.
    pub fn new(registry: StageRegistry) -> Self {
        Self {
            registry,
            max_steps: 100,
            execution_id: format!("plan-exec-{}", uuid::Uuid::new_v4()),
        }
    }

    /// Override the node execution limit.
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Override the generated execution ID.
    pub fn with_execution_id(mut self, execution_id: impl Into<String>) -> Self {
        self.execution_id = execution_id.into();
        self
    }

    pub fn execution_id(&self) -> &str {
        &self.execution_id
    }

    /// Execute a graph to completion over the given initial state.
    pub async fn execute(
        &self,
        graph: &PlanGraph,
        state: TripState,
        sink: &dyn EventSink,
        cancel: CancelFlag,
    ) -> Result<PlanRun> {
        graph.validate()?;

        let start_time = Instant::now();
        let ctx = StageContext::new(self.execution_id.clone()).with_cancel(cancel);
        let mut state = state;
        let mut stages_executed: u32 = 0;

        self.emit(
            sink,
            PlanEvent::PlanStarted {
                plan_id: graph.id.clone(),
                execution_id: self.execution_id.clone(),
            },
        );

        // validate() guarantees exactly one start node.
        let mut current = graph
            .find_start()
            .map(|n| n.id.clone())
            .ok_or_else(|| PlanEngineError::InvalidGraph("no start node".to_string()))?;

        loop {
            if ctx.cancel.is_cancelled() {
                return Err(PlanEngineError::Cancelled);
            }

            if stages_executed >= self.max_steps {
                let error = format!("Execution limit reached ({} nodes)", self.max_steps);
                self.emit_failed(sink, graph, &error);
                let elapsed = start_time.elapsed().as_millis() as u64;
                return Ok(PlanRun::failure(state, error, stages_executed, elapsed));
            }

            let node = graph
                .find_node(&current)
                .ok_or_else(|| {
                    PlanEngineError::InvalidGraph(format!("node '{}' not found", current))
                })?
                .clone();
            stages_executed += 1;

            let next_handle = match &node.kind {
                StageKind::Start | StageKind::Barrier => "next".to_string(),

                StageKind::End => {
                    self.emit(
                        sink,
                        PlanEvent::PlanCompleted {
                            plan_id: graph.id.clone(),
                            execution_id: self.execution_id.clone(),
                        },
                    );
                    let elapsed = start_time.elapsed().as_millis() as u64;
                    return Ok(PlanRun::success(state, stages_executed, elapsed));
                }

                StageKind::Stage => {
                    let stage = self.lookup_stage(&node.id)?;
                    match self.run_stage(stage.as_ref(), &mut state, &ctx, sink).await {
                        Ok(()) => "next".to_string(),
                        Err(e) => {
                            let error = e.to_string();
                            self.emit_failed(sink, graph, &error);
                            let elapsed = start_time.elapsed().as_millis() as u64;
                            return Ok(PlanRun::failure(state, error, stages_executed, elapsed));
                        }
                    }
                }

                StageKind::FanOut { branches } => {
                    let mut bound = Vec::with_capacity(branches.len());
                    for branch in branches {
                        bound.push(self.lookup_stage(branch)?);
                    }
                    stages_executed += branches.len() as u32;

                    for stage in &bound {
                        self.emit(
                            sink,
                            PlanEvent::StageStarted {
                                stage_id: stage.id().to_string(),
                                execution_id: self.execution_id.clone(),
                            },
                        );
                    }

                    let results =
                        join_all(bound.iter().map(|stage| stage.run(&state, &ctx))).await;

                    let mut failure = None;
                    let mut outputs = Vec::with_capacity(results.len());
                    for (stage, result) in bound.iter().zip(results) {
                        match result {
                            Ok(output) => outputs.push((stage.id().to_string(), output)),
                            Err(e) => {
                                self.emit(
                                    sink,
                                    PlanEvent::StageFailed {
                                        stage_id: stage.id().to_string(),
                                        execution_id: self.execution_id.clone(),
                                        error: e.to_string(),
                                    },
                                );
                                failure.get_or_insert(e);
                            }
                        }
                    }

                    if let Some(e) = failure {
                        let error = e.to_string();
                        self.emit_failed(sink, graph, &error);
                        let elapsed = start_time.elapsed().as_millis() as u64;
                        return Ok(PlanRun::failure(state, error, stages_executed, elapsed));
                    }

                    // Branch deltas touch disjoint fields by construction,
                    // so merge order does not matter.
                    for (stage_id, output) in outputs {
                        state.apply(output.delta);
                        self.emit(
                            sink,
                            PlanEvent::StageCompleted {
                                stage_id,
                                execution_id: self.execution_id.clone(),
                                note: output.note,
                            },
                        );
                    }
                    "next".to_string()
                }

                StageKind::Router => {
                    let router = self
                        .registry
                        .router(&node.id)
                        .ok_or_else(|| PlanEngineError::UnknownStage(node.id.clone()))?;
                    let decision = router.route(&mut state);
                    self.emit(
                        sink,
                        PlanEvent::Routed {
                            stage_id: node.id.clone(),
                            execution_id: self.execution_id.clone(),
                            handle: decision.handle.clone(),
                            note: decision.note,
                        },
                    );
                    decision.handle
                }
            };

            current = graph
                .follow(&node.id, &next_handle)
                .cloned()
                .ok_or_else(|| {
                    PlanEngineError::InvalidGraph(format!(
                        "no edge from '{}' for handle '{}'",
                        node.id, next_handle
                    ))
                })?;
        }
    }

    fn lookup_stage(&self, id: &str) -> Result<std::sync::Arc<dyn Stage>> {
        self.registry
            .stage(id)
            .cloned()
            .ok_or_else(|| PlanEngineError::UnknownStage(id.to_string()))
    }

    async fn run_stage(
        &self,
        stage: &dyn Stage,
        state: &mut TripState,
        ctx: &StageContext,
        sink: &dyn EventSink,
    ) -> Result<()> {
        self.emit(
            sink,
            PlanEvent::StageStarted {
                stage_id: stage.id().to_string(),
                execution_id: self.execution_id.clone(),
            },
        );

        log::debug!("{}: running stage '{}'", self.execution_id, stage.id());
        let output = match stage.run(state, ctx).await {
            Ok(output) => output,
            Err(e) => {
                self.emit(
                    sink,
                    PlanEvent::StageFailed {
                        stage_id: stage.id().to_string(),
                        execution_id: self.execution_id.clone(),
                        error: e.to_string(),
                    },
                );
                return Err(e);
            }
        };

        state.apply(output.delta);
        self.emit(
            sink,
            PlanEvent::StageCompleted {
                stage_id: stage.id().to_string(),
                execution_id: self.execution_id.clone(),
                note: output.note,
            },
        );
        Ok(())
    }

    fn emit(&self, sink: &dyn EventSink, event: PlanEvent) {
        // A gone receiver is not a reason to stop planning.
        let _ = sink.send(event);
    }

    fn emit_failed(&self, sink: &dyn EventSink, graph: &PlanGraph, error: &str) {
        self.emit(
            sink,
            PlanEvent::PlanFailed {
                plan_id: graph.id.clone(),
                execution_id: self.execution_id.clone(),
                error: error.to_string(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{NullEventSink, VecEventSink};
    use crate::graph::{StageEdge, StageKind};
    use crate::stage::{RouteDecision, Router, StageOutput};
    use async_trait::async_trait;
    use itinera_trip_contracts::{Event, StateDelta};
    use std::sync::Arc;

    /// A stage that applies a fixed delta.
    struct FixedStage {
        id: String,
        delta: fn() -> StateDelta,
    }

    #[async_trait]
    impl Stage for FixedStage {
        fn id(&self) -> &str {
            &self.id
        }

        async fn run(&self, _state: &TripState, _ctx: &StageContext) -> Result<StageOutput> {
            Ok(StageOutput::delta((self.delta)()))
        }
    }

    struct FailingStage;

    #[async_trait]
    impl Stage for FailingStage {
        fn id(&self) -> &str {
            "boom"
        }

        async fn run(&self, _state: &TripState, _ctx: &StageContext) -> Result<StageOutput> {
            Err(PlanEngineError::stage_failed("boom", "no trip specification"))
        }
    }

    /// A stage that bumps the refinement counter, standing in for evaluation.
    struct CountingStage;

    #[async_trait]
    impl Stage for CountingStage {
        fn id(&self) -> &str {
            "count"
        }

        async fn run(&self, state: &TripState, _ctx: &StageContext) -> Result<StageOutput> {
            Ok(StageOutput::delta(StateDelta {
                refinement_count: Some(state.refinement_count + 1),
                ..StateDelta::default()
            }))
        }
    }

    /// A router that always asks for another round until the cap.
    struct GreedyRouter {
        cap: u32,
    }

    impl Router for GreedyRouter {
        fn id(&self) -> &str {
            "route"
        }

        fn route(&self, state: &mut TripState) -> RouteDecision {
            if state.refinement_count >= self.cap {
                RouteDecision::follow("finish")
            } else {
                RouteDecision::follow("again")
            }
        }
    }

    fn events_delta() -> StateDelta {
        StateDelta {
            events: Some(vec![Event {
                name: "Opera night".to_string(),
                date: "2025-06-02".parse().unwrap(),
                venue: "Teatro dell'Opera".to_string(),
                url: "https://example.org/opera".to_string(),
            }]),
            ..StateDelta::default()
        }
    }

    fn pois_delta() -> StateDelta {
        StateDelta {
            points_of_interest: Some(Vec::new()),
            ..StateDelta::default()
        }
    }

    #[tokio::test]
    async fn test_linear_execution() {
        let graph = PlanGraph::new("p", "Test")
            .with_node("start", StageKind::Start)
            .with_node("work", StageKind::Stage)
            .with_node("end", StageKind::End)
            .with_edge(StageEdge::next("start", "work"))
            .with_edge(StageEdge::next("work", "end"));

        let registry = StageRegistry::new().with_stage(Arc::new(FixedStage {
            id: "work".to_string(),
            delta: events_delta,
        }));
        let executor = PlanExecutor::new(registry);

        let run = executor
            .execute(&graph, TripState::new("x"), &NullEventSink, CancelFlag::new())
            .await
            .unwrap();

        assert!(run.success);
        assert_eq!(run.state.events.len(), 1);
        assert_eq!(run.stages_executed, 3);
    }

    #[tokio::test]
    async fn test_fanout_merges_branch_deltas() {
        let graph = PlanGraph::new("p", "Test")
            .with_node("start", StageKind::Start)
            .with_node(
                "fan",
                StageKind::FanOut {
                    branches: vec!["a".to_string(), "b".to_string()],
                },
            )
            .with_node("a", StageKind::Stage)
            .with_node("b", StageKind::Stage)
            .with_node("barrier", StageKind::Barrier)
            .with_node("end", StageKind::End)
            .with_edge(StageEdge::next("start", "fan"))
            .with_edge(StageEdge::next("fan", "barrier"))
            .with_edge(StageEdge::next("a", "barrier"))
            .with_edge(StageEdge::next("b", "barrier"))
            .with_edge(StageEdge::next("barrier", "end"));

        let registry = StageRegistry::new()
            .with_stage(Arc::new(FixedStage {
                id: "a".to_string(),
                delta: events_delta,
            }))
            .with_stage(Arc::new(FixedStage {
                id: "b".to_string(),
                delta: pois_delta,
            }));
        let executor = PlanExecutor::new(registry);
        let sink = VecEventSink::new();

        let run = executor
            .execute(&graph, TripState::new("x"), &sink, CancelFlag::new())
            .await
            .unwrap();

        assert!(run.success);
        assert_eq!(run.state.events.len(), 1);
        assert!(run.state.points_of_interest.is_empty());

        let started: Vec<_> = sink
            .events()
            .iter()
            .filter_map(|e| match e {
                PlanEvent::StageStarted { stage_id, .. } => Some(stage_id.clone()),
                _ => None,
            })
            .collect();
        assert!(started.contains(&"a".to_string()));
        assert!(started.contains(&"b".to_string()));
    }

    #[tokio::test]
    async fn test_router_loop_terminates_at_cap() {
        // start -> count -> route -(again)-> count / -(finish)-> end
        let graph = PlanGraph::new("p", "Test")
            .with_node("start", StageKind::Start)
            .with_node("count", StageKind::Stage)
            .with_node("route", StageKind::Router)
            .with_node("end", StageKind::End)
            .with_edge(StageEdge::next("start", "count"))
            .with_edge(StageEdge::next("count", "route"))
            .with_edge(StageEdge::new("route", "again", "count"))
            .with_edge(StageEdge::new("route", "finish", "end"));

        let registry = StageRegistry::new()
            .with_stage(Arc::new(CountingStage))
            .with_router(Arc::new(GreedyRouter { cap: 2 }));
        let executor = PlanExecutor::new(registry);

        let run = executor
            .execute(&graph, TripState::new("x"), &NullEventSink, CancelFlag::new())
            .await
            .unwrap();

        assert!(run.success);
        // One evaluation per round, terminating after cap rounds.
        assert_eq!(run.state.refinement_count, 2);
    }

    #[tokio::test]
    async fn test_fatal_stage_failure_keeps_state() {
        let graph = PlanGraph::new("p", "Test")
            .with_node("start", StageKind::Start)
            .with_node("work", StageKind::Stage)
            .with_node("boom", StageKind::Stage)
            .with_node("end", StageKind::End)
            .with_edge(StageEdge::next("start", "work"))
            .with_edge(StageEdge::next("work", "boom"))
            .with_edge(StageEdge::next("boom", "end"));

        let registry = StageRegistry::new()
            .with_stage(Arc::new(FixedStage {
                id: "work".to_string(),
                delta: events_delta,
            }))
            .with_stage(Arc::new(FailingStage));
        let executor = PlanExecutor::new(registry);

        let run = executor
            .execute(&graph, TripState::new("x"), &NullEventSink, CancelFlag::new())
            .await
            .unwrap();

        assert!(!run.success);
        assert!(run.error.as_deref().unwrap().contains("no trip specification"));
        // The state up to the failure point is preserved.
        assert_eq!(run.state.events.len(), 1);
    }

    #[tokio::test]
    async fn test_step_limit_guards_against_runaway_loop() {
        let graph = PlanGraph::new("p", "Test")
            .with_node("start", StageKind::Start)
            .with_node("count", StageKind::Stage)
            .with_node("route", StageKind::Router)
            .with_node("end", StageKind::End)
            .with_edge(StageEdge::next("start", "count"))
            .with_edge(StageEdge::next("count", "route"))
            .with_edge(StageEdge::new("route", "again", "count"))
            .with_edge(StageEdge::new("route", "finish", "end"));

        // Router cap higher than the executor's step budget.
        let registry = StageRegistry::new()
            .with_stage(Arc::new(CountingStage))
            .with_router(Arc::new(GreedyRouter { cap: 1000 }));
        let executor = PlanExecutor::new(registry).with_max_steps(10);

        let run = executor
            .execute(&graph, TripState::new("x"), &NullEventSink, CancelFlag::new())
            .await
            .unwrap();

        assert!(!run.success);
        assert!(run.error.as_deref().unwrap().contains("Execution limit"));
    }

    #[tokio::test]
    async fn test_cancellation_stops_execution() {
        let graph = PlanGraph::new("p", "Test")
            .with_node("start", StageKind::Start)
            .with_node("end", StageKind::End)
            .with_edge(StageEdge::next("start", "end"));

        let cancel = CancelFlag::new();
        cancel.cancel();
        let executor = PlanExecutor::new(StageRegistry::new());

        let result = executor
            .execute(&graph, TripState::new("x"), &NullEventSink, cancel)
            .await;
        assert!(matches!(result, Err(PlanEngineError::Cancelled)));
    }

    #[tokio::test]
    async fn test_unbound_stage_is_a_structural_error() {
        let graph = PlanGraph::new("p", "Test")
            .with_node("start", StageKind::Start)
            .with_node("ghost", StageKind::Stage)
            .with_node("end", StageKind::End)
            .with_edge(StageEdge::next("start", "ghost"))
            .with_edge(StageEdge::next("ghost", "end"));

        let executor = PlanExecutor::new(StageRegistry::new());
        let result = executor
            .execute(&graph, TripState::new("x"), &NullEventSink, CancelFlag::new())
            .await;
        assert!(matches!(result, Err(PlanEngineError::UnknownStage(_))));
    }
}
