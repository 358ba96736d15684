//! Hotel branch: fetch stay candidates once, select one per round.

use std::sync::Arc;

use async_trait::async_trait;

use itinera_trip_contracts::{HotelOption, StateDelta, TripState};
use plan_engine::{PlanEngineError, Result, Stage, StageContext, StageOutput};
use trip_oracles::{OptionKind, SelectionOracle};
use trip_providers::{HotelSearch, TravelQuery};

use crate::selection::{choose_index, refinement_feedback};
use crate::{ids, MAX_OPTIONS};

pub struct HotelStage {
    provider: Arc<dyn HotelSearch>,
    oracle: Arc<dyn SelectionOracle>,
}

impl HotelStage {
    pub fn new(provider: Arc<dyn HotelSearch>, oracle: Arc<dyn SelectionOracle>) -> Self {
        Self { provider, oracle }
    }
}

fn describe(option: &HotelOption) -> String {
    format!(
        "{} — {:.2} EUR for the stay ({:.2}/night), rated {} \"{}\" from {} reviews",
        option.name,
        option.total_price,
        option.price_per_night,
        option.rating,
        option.rating_word,
        option.review_count
    )
}

#[async_trait]
impl Stage for HotelStage {
    fn id(&self) -> &str {
        ids::HOTEL
    }

    async fn run(&self, state: &TripState, _ctx: &StageContext) -> Result<StageOutput> {
        let spec = state
            .spec
            .as_ref()
            .ok_or_else(|| PlanEngineError::missing_state(ids::HOTEL, "spec"))?;

        // A single-entry list is worth re-fetching (the earlier search was
        // likely degraded); anything richer is reused across rounds.
        let mut options = if state.hotel_options.len() > 1 {
            state.hotel_options.clone()
        } else {
            match self.provider.search_hotels(&TravelQuery::from_spec(spec)).await {
                Ok(options) => options,
                Err(e) => {
                    log::warn!("hotel search failed: {e}");
                    Vec::new()
                }
            }
        };

        if options.is_empty() {
            return Ok(StageOutput::delta(StateDelta {
                hotel_options: Some(Vec::new()),
                selected_hotel: None,
                ..StateDelta::default()
            })
            .with_note("no hotels found"));
        }

        options.sort_by(|a, b| a.total_price.total_cmp(&b.total_price));
        options.truncate(MAX_OPTIONS);

        let lines = options.iter().map(describe).collect();
        let (index, note) = choose_index(
            self.oracle.as_ref(),
            OptionKind::Hotel,
            lines,
            spec.budget,
            refinement_feedback(state),
            state.selected_hotel,
        )
        .await;

        Ok(StageOutput::delta(StateDelta {
            hotel_options: Some(options),
            selected_hotel: Some(index),
            ..StateDelta::default()
        })
        .with_note(note))
    }
}
