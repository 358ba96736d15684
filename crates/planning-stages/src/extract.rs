//! POI extraction: per-interest web search, then oracle extraction of
//! concrete, geocodable places from the combined text.

use std::sync::Arc;

use async_trait::async_trait;

use itinera_trip_contracts::{StateDelta, TripState};
use plan_engine::{PlanEngineError, Result, Stage, StageContext, StageOutput};
use trip_oracles::{ExtractionOracle, ExtractionRequest, OracleOutcome};
use trip_providers::PoiSearch;

use crate::ids;

pub struct ExtractStage {
    provider: Arc<dyn PoiSearch>,
    oracle: Arc<dyn ExtractionOracle>,
}

impl ExtractStage {
    pub fn new(provider: Arc<dyn PoiSearch>, oracle: Arc<dyn ExtractionOracle>) -> Self {
        Self { provider, oracle }
    }

    /// One search per interest tag (one generic search when there are none),
    /// concatenated into a single blob for extraction.
    async fn gather_text(&self, destination: &str, interests: &[String]) -> String {
        let mut blob = String::new();
        let searches: Vec<Vec<String>> = if interests.is_empty() {
            vec![Vec::new()]
        } else {
            interests.iter().map(|i| vec![i.clone()]).collect()
        };
        for interest in &searches {
            match self.provider.search_poi_text(destination, interest).await {
                Ok(text) if !text.trim().is_empty() => {
                    if !blob.is_empty() {
                        blob.push_str("\n\n");
                    }
                    blob.push_str(&text);
                }
                Ok(_) => {}
                Err(e) => {
                    log::warn!("activity search failed for {interest:?}: {e}");
                }
            }
        }
        blob
    }
}

#[async_trait]
impl Stage for ExtractStage {
    fn id(&self) -> &str {
        ids::EXTRACT
    }

    async fn run(&self, state: &TripState, _ctx: &StageContext) -> Result<StageOutput> {
        // Refinement rounds re-traverse this stage; the candidate set is
        // already settled.
        if !state.points_of_interest.is_empty() {
            return Ok(StageOutput::unchanged().with_note("points of interest already extracted"));
        }

        let spec = state
            .spec
            .as_ref()
            .ok_or_else(|| PlanEngineError::missing_state(ids::EXTRACT, "spec"))?;

        let raw_text = self.gather_text(&spec.destination, &spec.interests).await;
        if raw_text.is_empty() {
            return Ok(StageOutput::delta(StateDelta {
                points_of_interest: Some(Vec::new()),
                ..StateDelta::default()
            })
            .with_note("no activity search results"));
        }

        let request = ExtractionRequest {
            destination: spec.destination.clone(),
            raw_text,
        };
        let places = match self.oracle.extract_places(&request).await {
            Ok(OracleOutcome::Decided(places)) => places,
            Ok(OracleOutcome::NoDecision { reason }) => {
                log::warn!("place extraction declined: {reason}");
                Vec::new()
            }
            Err(e) => {
                log::warn!("place extraction oracle unreachable: {e}");
                Vec::new()
            }
        };

        let note = format!("extracted {} place(s)", places.len());
        Ok(StageOutput::delta(StateDelta {
            points_of_interest: Some(places),
            ..StateDelta::default()
        })
        .with_note(note))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itinera_trip_contracts::PointOfInterest;
    use trip_oracles::mock::ScriptedExtractionOracle;
    use trip_providers::fixtures::{FixtureProviders, UnreachableProviders};

    fn state_with_spec() -> TripState {
        let mut state = TripState::new("Rome");
        state.spec = Some(itinera_trip_contracts::TripSpec {
            origin: "Berlin".to_string(),
            destination: "Rome".to_string(),
            start_date: "2026-06-10".parse().unwrap(),
            end_date: "2026-06-14".parse().unwrap(),
            travelers: 2,
            budget: None,
            daily_spending_budget: None,
            interests: vec!["history".to_string(), "food".to_string()],
        });
        state
    }

    fn poi(name: &str) -> PointOfInterest {
        PointOfInterest {
            name: name.to_string(),
            description: "A place".to_string(),
            location: "Rome".to_string(),
            time_of_day: "Morning".to_string(),
            latitude: None,
            longitude: None,
        }
    }

    #[tokio::test]
    async fn test_extracts_places_from_search_text() {
        let stage = ExtractStage::new(
            Arc::new(FixtureProviders::rome()),
            Arc::new(ScriptedExtractionOracle::deciding(vec![vec![
                poi("Colosseum"),
                poi("Roman Forum"),
            ]])),
        );
        let ctx = StageContext::new("test");

        let output = stage.run(&state_with_spec(), &ctx).await.unwrap();
        assert_eq!(output.delta.points_of_interest.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_no_search_text_yields_empty_set() {
        let stage = ExtractStage::new(
            Arc::new(UnreachableProviders),
            Arc::new(ScriptedExtractionOracle::declining("unused")),
        );
        let ctx = StageContext::new("test");

        let output = stage.run(&state_with_spec(), &ctx).await.unwrap();
        assert_eq!(output.delta.points_of_interest, Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_skips_when_already_extracted() {
        let stage = ExtractStage::new(
            Arc::new(UnreachableProviders),
            Arc::new(ScriptedExtractionOracle::declining("unused")),
        );
        let ctx = StageContext::new("test");

        let mut state = state_with_spec();
        state.points_of_interest = vec![poi("Colosseum")];

        let output = stage.run(&state, &ctx).await.unwrap();
        assert!(output.delta.is_empty());
    }
}
