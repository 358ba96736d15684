//! Schedule synthesis: partition the candidate set into days and assemble
//! the itinerary.

use std::sync::Arc;

use async_trait::async_trait;

use itinera_trip_contracts::{
    Itinerary, PointOfInterest, ScheduledDay, StateDelta, TripState,
};
use plan_engine::{PlanEngineError, Result, RetryPolicy, Stage, StageContext, StageOutput};
use trip_oracles::{DayPlanDraft, OracleOutcome, ScheduleRequest, SchedulingOracle};

use crate::ids;

/// How many times the scheduling oracle is retried before the round fails.
const SCHEDULE_ATTEMPTS: u32 = 3;

pub struct ScheduleStage {
    oracle: Arc<dyn SchedulingOracle>,
    retry: RetryPolicy,
}

impl ScheduleStage {
    pub fn new(oracle: Arc<dyn SchedulingOracle>) -> Self {
        Self {
            oracle,
            retry: RetryPolicy::new(SCHEDULE_ATTEMPTS),
        }
    }
}

#[async_trait]
impl Stage for ScheduleStage {
    fn id(&self) -> &str {
        ids::SCHEDULE
    }

    async fn run(&self, state: &TripState, _ctx: &StageContext) -> Result<StageOutput> {
        let spec = state
            .spec
            .as_ref()
            .ok_or_else(|| PlanEngineError::missing_state(ids::SCHEDULE, "spec"))?;

        // A plan without a flight or hotel is never assembled partially.
        let (flight, hotel) = match (state.selected_flight(), state.selected_hotel()) {
            (Some(flight), Some(hotel)) => (flight.clone(), hotel.clone()),
            (None, None) => {
                return Err(PlanEngineError::stage_failed(
                    ids::SCHEDULE,
                    "no flight or hotel could be selected",
                ));
            }
            (None, Some(_)) => {
                return Err(PlanEngineError::stage_failed(
                    ids::SCHEDULE,
                    "no flight could be selected",
                ));
            }
            (Some(_), None) => {
                return Err(PlanEngineError::stage_failed(
                    ids::SCHEDULE,
                    "no hotel could be selected",
                ));
            }
        };

        if state.points_of_interest.is_empty() && state.events.is_empty() {
            let itinerary = Itinerary {
                flight,
                hotel,
                days: Vec::new(),
            };
            return Ok(StageOutput::delta(StateDelta {
                itinerary: Some(itinerary),
                ..StateDelta::default()
            })
            .with_note("no activities found; flight and hotel only"));
        }

        let request = ScheduleRequest {
            destination: spec.destination.clone(),
            days: spec.days(),
            activities: state.points_of_interest.clone(),
            events: state.events.clone(),
        };
        let drafts = self
            .retry
            .run(|attempt| {
                let request = request.clone();
                let oracle = Arc::clone(&self.oracle);
                async move {
                    log::debug!("schedule synthesis attempt {attempt}");
                    match oracle.schedule(&request).await {
                        Ok(OracleOutcome::Decided(days)) => Ok(days),
                        Ok(OracleOutcome::NoDecision { reason }) => Err(reason),
                        Err(e) => Err(e.to_string()),
                    }
                }
            })
            .await
            .map_err(|e| {
                PlanEngineError::stage_failed(
                    ids::SCHEDULE,
                    format!("schedule synthesis failed after {SCHEDULE_ATTEMPTS} attempts: {e}"),
                )
            })?;

        let days = assemble_days(drafts, &state.points_of_interest);
        let note = format!("scheduled {} day(s)", days.len());
        let itinerary = Itinerary {
            flight,
            hotel,
            days,
        };
        Ok(StageOutput::delta(StateDelta {
            itinerary: Some(itinerary),
            ..StateDelta::default()
        })
        .with_note(note))
    }
}

/// Turn oracle drafts into scheduled days, re-attaching coordinates from the
/// geocoded candidate set. The oracle echoes names, not coordinates.
fn assemble_days(drafts: Vec<DayPlanDraft>, candidates: &[PointOfInterest]) -> Vec<ScheduledDay> {
    let mut days: Vec<ScheduledDay> = drafts
        .into_iter()
        .map(|draft| ScheduledDay {
            day: draft.day,
            activities: draft
                .activities
                .into_iter()
                .map(|activity| reattach_coordinates(activity, candidates))
                .collect(),
        })
        .collect();
    days.sort_by_key(|d| d.day);
    days
}

/// Exact name match first, substring match second.
fn reattach_coordinates(
    mut activity: PointOfInterest,
    candidates: &[PointOfInterest],
) -> PointOfInterest {
    if activity.coordinates().is_some() {
        return activity;
    }
    let name = activity.name.to_lowercase();
    let matched = candidates
        .iter()
        .find(|c| c.name.to_lowercase() == name)
        .or_else(|| {
            candidates.iter().find(|c| {
                let candidate = c.name.to_lowercase();
                candidate.contains(&name) || name.contains(&candidate)
            })
        });
    if let Some(source) = matched {
        activity.latitude = source.latitude;
        activity.longitude = source.longitude;
    }
    activity
}
