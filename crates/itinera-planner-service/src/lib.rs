//! The host-agnostic planning service.
//!
//! One [`PlannerService`] serves many requests: each call builds a fresh
//! executor over the shared stage dependencies, runs the canonical planner
//! graph to completion, and renders the terminal state into a Markdown
//! report plus a map-marker artifact. HTTP hosting lives elsewhere; this
//! crate has no opinion about transports.

mod map;
mod report;

pub use map::map_markers;
pub use report::{render_failure_report, render_report};

use serde::Serialize;

use itinera_trip_contracts::{MapMarker, TripState};
use plan_engine::{
    CancelFlag, EventSink, NullEventSink, PlanExecutor, PlanRun, Result,
};
use planning_stages::{planner_graph, planner_registry, PlannerDeps};

/// The finished product of one planning request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanReport {
    /// Whether a complete plan was produced.
    pub success: bool,
    /// Rendered Markdown, present for failures too (a structured
    /// "plan could not be generated" explanation).
    pub report_markdown: String,
    /// Day-indexed markers for every geocoded scheduled activity; `None`
    /// when nothing ended up geocoded.
    pub map_markers: Option<Vec<MapMarker>>,
    /// Fatal failure description, when `success` is false.
    pub error: Option<String>,
    /// The full terminal state, for hosts that want the raw data.
    pub state: TripState,
    pub execution_time_ms: u64,
}

/// Runs trip requests through the planner graph.
#[derive(Clone)]
pub struct PlannerService {
    deps: PlannerDeps,
}

impl PlannerService {
    pub fn new(deps: PlannerDeps) -> Self {
        Self { deps }
    }

    /// Plan a trip from a free-text request, blocking until done.
    pub async fn plan(&self, request: &str) -> Result<PlanReport> {
        self.plan_with_events(request, &NullEventSink, CancelFlag::new())
            .await
    }

    /// Plan a trip, emitting one event per stage transition into `sink`.
    ///
    /// `Err` is reserved for structural problems and cancellation; every
    /// planning-level failure comes back as an unsuccessful [`PlanReport`].
    pub async fn plan_with_events(
        &self,
        request: &str,
        sink: &dyn EventSink,
        cancel: CancelFlag,
    ) -> Result<PlanReport> {
        let executor = PlanExecutor::new(planner_registry(self.deps.clone()));
        log::info!("{}: planning '{}'", executor.execution_id(), request);

        let run = executor
            .execute(&planner_graph(), TripState::new(request), sink, cancel)
            .await?;
        Ok(assemble_report(run))
    }
}

fn assemble_report(run: PlanRun) -> PlanReport {
    let mut state = run.state;
    let (markdown, markers) = if run.success {
        (render_report(&state), map_markers(&state))
    } else {
        (
            render_failure_report(&state, run.error.as_deref().unwrap_or("unknown failure")),
            None,
        )
    };

    state.report_markdown = Some(markdown.clone());
    state.map_markers = markers.clone();

    PlanReport {
        success: run.success,
        report_markdown: markdown,
        map_markers: markers,
        error: run.error,
        state,
        execution_time_ms: run.execution_time_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use itinera_trip_contracts::{EvaluationAction, PointOfInterest, TripSpec};
    use plan_engine::{PlanEvent, VecEventSink};
    use trip_oracles::mock::{
        ScriptedCurationOracle, ScriptedEvaluationOracle, ScriptedExtractionOracle,
        ScriptedParseOracle, ScriptedSchedulingOracle, ScriptedSelectionOracle,
    };
    use trip_oracles::{DayPlanDraft, EvaluationVerdict, OptionChoice};
    use trip_providers::fixtures::FixtureProviders;

    fn spec() -> TripSpec {
        TripSpec {
            origin: "Berlin".to_string(),
            destination: "Rome".to_string(),
            start_date: "2026-06-10".parse().unwrap(),
            end_date: "2026-06-14".parse().unwrap(),
            travelers: 2,
            budget: Some(2500.0),
            daily_spending_budget: Some(50.0),
            interests: vec!["history".to_string()],
        }
    }

    fn poi(name: &str, coords: Option<(f64, f64)>) -> PointOfInterest {
        PointOfInterest {
            name: name.to_string(),
            description: "A place worth seeing".to_string(),
            location: "Rome".to_string(),
            time_of_day: "Morning".to_string(),
            latitude: coords.map(|c| c.0),
            longitude: coords.map(|c| c.1),
        }
    }

    fn happy_deps() -> PlannerDeps {
        PlannerDeps {
            parse: Arc::new(ScriptedParseOracle::deciding(vec![spec()])),
            selection: Arc::new(ScriptedSelectionOracle::deciding(vec![
                OptionChoice {
                    index: 0,
                    reasoning: "cheapest".to_string(),
                },
                OptionChoice {
                    index: 0,
                    reasoning: "cheapest".to_string(),
                },
            ])),
            curation: Arc::new(ScriptedCurationOracle::declining("keep raw")),
            extraction: Arc::new(ScriptedExtractionOracle::deciding(vec![vec![poi(
                "Colosseum",
                None,
            )]])),
            scheduling: Arc::new(ScriptedSchedulingOracle::deciding(vec![vec![
                DayPlanDraft {
                    day: 1,
                    activities: vec![poi("Colosseum", None)],
                },
            ]])),
            evaluation: Arc::new(ScriptedEvaluationOracle::deciding(vec![
                EvaluationVerdict {
                    action: EvaluationAction::Approve,
                    feedback: "fits the budget".to_string(),
                },
            ])),
            flights: Arc::new(FixtureProviders::rome()),
            hotels: Arc::new(FixtureProviders::rome()),
            events: Arc::new(FixtureProviders::rome()),
            poi: Arc::new(FixtureProviders::rome()),
            geocoder: Arc::new(geocoding_fixtures()),
            max_refinements: 2,
        }
    }

    fn geocoding_fixtures() -> FixtureProviders {
        let mut fixtures = FixtureProviders::rome();
        fixtures.coordinates.insert(
            "colosseum, rome".to_string(),
            trip_providers::GeoPoint {
                latitude: 41.8902,
                longitude: 12.4922,
            },
        );
        fixtures
    }

    #[tokio::test]
    async fn test_plan_renders_report_and_markers() {
        let service = PlannerService::new(happy_deps());
        let report = service.plan("5 days in Rome from Berlin").await.unwrap();

        assert!(report.success);
        assert!(report.report_markdown.contains("Berlin"));
        assert!(report.report_markdown.contains("Colosseum"));
        let markers = report.map_markers.unwrap();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].day, 1);
        assert_eq!(report.state.report_markdown, Some(report.report_markdown));
    }

    #[tokio::test]
    async fn test_plan_with_events_streams_stage_transitions() {
        let service = PlannerService::new(happy_deps());
        let sink = VecEventSink::new();

        let report = service
            .plan_with_events("5 days in Rome", &sink, CancelFlag::new())
            .await
            .unwrap();
        assert!(report.success);

        let events = sink.events();
        assert!(matches!(events.first(), Some(PlanEvent::PlanStarted { .. })));
        assert!(matches!(events.last(), Some(PlanEvent::PlanCompleted { .. })));
    }

    #[tokio::test]
    async fn test_unplannable_trip_yields_failure_report() {
        let mut deps = happy_deps();
        deps.flights = Arc::new(FixtureProviders::empty());
        deps.selection = Arc::new(ScriptedSelectionOracle::deciding(vec![OptionChoice {
            index: 0,
            reasoning: "only the hotel list has entries".to_string(),
        }]));
        let service = PlannerService::new(deps);

        let report = service.plan("5 days in Rome").await.unwrap();
        assert!(!report.success);
        assert!(report.report_markdown.contains("could not be generated"));
        assert!(report.report_markdown.to_lowercase().contains("flight"));
        assert!(report.map_markers.is_none());
    }
}
