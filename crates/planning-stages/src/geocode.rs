//! Geocoding: serial coordinate lookups for every ungeocoded place.

use std::sync::Arc;

use async_trait::async_trait;

use itinera_trip_contracts::{StateDelta, TripState};
use plan_engine::{PlanEngineError, Result, Stage, StageContext, StageOutput};
use trip_providers::Geocoder;

use crate::ids;

pub struct GeocodeStage {
    geocoder: Arc<dyn Geocoder>,
}

impl GeocodeStage {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self { geocoder }
    }
}

#[async_trait]
impl Stage for GeocodeStage {
    fn id(&self) -> &str {
        ids::GEOCODE
    }

    async fn run(&self, state: &TripState, ctx: &StageContext) -> Result<StageOutput> {
        if state.points_of_interest.iter().all(|p| p.coordinates().is_some()) {
            return Ok(StageOutput::unchanged().with_note("nothing to geocode"));
        }

        let spec = state
            .spec
            .as_ref()
            .ok_or_else(|| PlanEngineError::missing_state(ids::GEOCODE, "spec"))?;

        let mut places = state.points_of_interest.clone();
        let mut resolved = 0usize;
        for place in places.iter_mut().filter(|p| p.coordinates().is_none()) {
            // This is the longest serial loop in the pipeline; honor
            // cancellation between external calls.
            if ctx.cancel.is_cancelled() {
                return Err(PlanEngineError::Cancelled);
            }

            let query = format!("{}, {}", place.name, spec.destination);
            // One attempt per place; a miss leaves the coordinates unset.
            match self.geocoder.geocode(&query).await {
                Ok(Some(point)) => {
                    place.latitude = Some(point.latitude);
                    place.longitude = Some(point.longitude);
                    resolved += 1;
                }
                Ok(None) => {
                    log::debug!("no geocoding result for '{query}'");
                }
                Err(e) => {
                    log::warn!("geocoding '{query}' failed: {e}");
                }
            }
        }

        let note = format!("geocoded {resolved} of {} place(s)", places.len());
        Ok(StageOutput::delta(StateDelta {
            points_of_interest: Some(places),
            ..StateDelta::default()
        })
        .with_note(note))
    }
}
