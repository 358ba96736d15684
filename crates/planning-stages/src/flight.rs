//! Flight branch: fetch round-trip candidates once, select one per round.

use std::sync::Arc;

use async_trait::async_trait;

use itinera_trip_contracts::{FlightOption, StateDelta, TripState};
use plan_engine::{PlanEngineError, Result, Stage, StageContext, StageOutput};
use trip_oracles::{OptionKind, SelectionOracle};
use trip_providers::{FlightSearch, TravelQuery};

use crate::selection::{choose_index, refinement_feedback};
use crate::{ids, MAX_OPTIONS};

pub struct FlightStage {
    provider: Arc<dyn FlightSearch>,
    oracle: Arc<dyn SelectionOracle>,
}

impl FlightStage {
    pub fn new(provider: Arc<dyn FlightSearch>, oracle: Arc<dyn SelectionOracle>) -> Self {
        Self { provider, oracle }
    }
}

/// One human-readable line per candidate for the selection prompt.
fn describe(option: &FlightOption) -> String {
    let stops = if option.outbound.is_layover || option.inbound.is_layover {
        "with layover"
    } else {
        "direct"
    };
    format!(
        "{} — {:.2} EUR total, {} min round trip, {}",
        option.outbound.airline, option.price, option.total_duration_minutes, stops
    )
}

#[async_trait]
impl Stage for FlightStage {
    fn id(&self) -> &str {
        ids::FLIGHT
    }

    async fn run(&self, state: &TripState, _ctx: &StageContext) -> Result<StageOutput> {
        let spec = state
            .spec
            .as_ref()
            .ok_or_else(|| PlanEngineError::missing_state(ids::FLIGHT, "spec"))?;

        // Refinement rounds never re-fetch; the router already advanced the
        // selection pointer and the oracle gets a veto with the evaluator's
        // feedback attached.
        let mut options = if state.flight_options.is_empty() {
            match self.provider.search_flights(&TravelQuery::from_spec(spec)).await {
                Ok(options) => options,
                Err(e) => {
                    log::warn!("flight search failed: {e}");
                    Vec::new()
                }
            }
        } else {
            state.flight_options.clone()
        };

        if options.is_empty() {
            return Ok(StageOutput::delta(StateDelta {
                flight_options: Some(Vec::new()),
                selected_flight: None,
                ..StateDelta::default()
            })
            .with_note("no flights found"));
        }

        options.sort_by(|a, b| a.price.total_cmp(&b.price));
        options.truncate(MAX_OPTIONS);

        let lines = options.iter().map(describe).collect();
        let (index, note) = choose_index(
            self.oracle.as_ref(),
            OptionKind::Flight,
            lines,
            spec.budget,
            refinement_feedback(state),
            state.selected_flight,
        )
        .await;

        Ok(StageOutput::delta(StateDelta {
            flight_options: Some(options),
            selected_flight: Some(index),
            ..StateDelta::default()
        })
        .with_note(note))
    }
}
