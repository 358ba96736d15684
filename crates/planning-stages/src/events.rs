//! Event branch: fetch events in the travel window, curate by interest.

use std::sync::Arc;

use async_trait::async_trait;

use itinera_trip_contracts::{StateDelta, TripState};
use plan_engine::{PlanEngineError, Result, Stage, StageContext, StageOutput};
use trip_oracles::{CurationOracle, CurationRequest, OracleOutcome};
use trip_providers::{EventSearch, TravelQuery};

use crate::{ids, RAW_EVENT_FALLBACK};

pub struct EventsStage {
    provider: Arc<dyn EventSearch>,
    oracle: Arc<dyn CurationOracle>,
}

impl EventsStage {
    pub fn new(provider: Arc<dyn EventSearch>, oracle: Arc<dyn CurationOracle>) -> Self {
        Self { provider, oracle }
    }
}

#[async_trait]
impl Stage for EventsStage {
    fn id(&self) -> &str {
        ids::EVENTS
    }

    async fn run(&self, state: &TripState, _ctx: &StageContext) -> Result<StageOutput> {
        let spec = state
            .spec
            .as_ref()
            .ok_or_else(|| PlanEngineError::missing_state(ids::EVENTS, "spec"))?;

        let raw = match self.provider.search_events(&TravelQuery::from_spec(spec)).await {
            Ok(events) => events,
            Err(e) => {
                log::warn!("event search failed: {e}");
                Vec::new()
            }
        };
        if raw.is_empty() {
            return Ok(StageOutput::delta(StateDelta {
                events: Some(Vec::new()),
                ..StateDelta::default()
            })
            .with_note("no events in the travel window"));
        }

        let request = CurationRequest {
            interests: spec.interests.clone(),
            events: raw.clone(),
        };
        let (events, note) = match self.oracle.curate_events(&request).await {
            Ok(OracleOutcome::Decided(kept)) => {
                let note = format!("kept {} of {} events", kept.len(), raw.len());
                (kept, note)
            }
            Ok(OracleOutcome::NoDecision { reason }) => {
                log::warn!("event curation declined: {reason}");
                (first_raw(raw), "kept first events uncurated".to_string())
            }
            Err(e) => {
                log::warn!("event curation oracle unreachable: {e}");
                (first_raw(raw), "kept first events uncurated".to_string())
            }
        };

        Ok(StageOutput::delta(StateDelta {
            events: Some(events),
            ..StateDelta::default()
        })
        .with_note(note))
    }
}

fn first_raw(mut raw: Vec<itinera_trip_contracts::Event>) -> Vec<itinera_trip_contracts::Event> {
    raw.truncate(RAW_EVENT_FALLBACK);
    raw
}
