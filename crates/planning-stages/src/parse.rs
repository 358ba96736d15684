//! Parse stage: free text in, validated [`TripSpec`] out.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use itinera_trip_contracts::{StateDelta, TripState};
use plan_engine::{PlanEngineError, Result, Stage, StageContext, StageOutput};
use trip_oracles::{OracleOutcome, ParseOracle};

use crate::ids;

/// The only stage whose oracle failure is fatal: without a valid
/// specification nothing downstream can run.
pub struct ParseStage {
    oracle: Arc<dyn ParseOracle>,
    /// Anchor for relative dates; defaults to the current UTC date.
    today: Option<NaiveDate>,
}

impl ParseStage {
    pub fn new(oracle: Arc<dyn ParseOracle>) -> Self {
        Self {
            oracle,
            today: None,
        }
    }

    /// Pin the date anchor, for deterministic tests.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }
}

#[async_trait]
impl Stage for ParseStage {
    fn id(&self) -> &str {
        ids::PARSE
    }

    async fn run(&self, state: &TripState, _ctx: &StageContext) -> Result<StageOutput> {
        let today = self.today.unwrap_or_else(|| Utc::now().date_naive());
        let outcome = self
            .oracle
            .parse_trip(&state.user_request, today)
            .await
            .map_err(|e| PlanEngineError::stage_failed(ids::PARSE, e.to_string()))?;

        let spec = match outcome {
            OracleOutcome::Decided(spec) => spec,
            OracleOutcome::NoDecision { reason } => {
                return Err(PlanEngineError::stage_failed(
                    ids::PARSE,
                    format!("could not understand the trip request: {reason}"),
                ));
            }
        };
        // The oracle layer validates too; re-checking keeps the invariant
        // local to the stage that owns it.
        spec.validate()
            .map_err(|e| PlanEngineError::stage_failed(ids::PARSE, e.to_string()))?;

        let note = format!(
            "{} to {}, {} day(s), {} traveler(s)",
            spec.origin,
            spec.destination,
            spec.days(),
            spec.travelers
        );
        Ok(StageOutput::delta(StateDelta {
            spec: Some(spec),
            refinement_count: Some(0),
            ..StateDelta::default()
        })
        .with_note(note))
    }
}
