//! Evaluation: engine-computed cost, next-cheaper alternatives, and the
//! oracle's refine-or-approve verdict.

use std::sync::Arc;

use async_trait::async_trait;

use itinera_trip_contracts::{
    EvaluationAction, EvaluationOutcome, FlightOption, HotelOption, StateDelta, TripSpec,
    TripState,
};
use plan_engine::{PlanEngineError, Result, Stage, StageContext, StageOutput};
use trip_oracles::{
    EvaluationOracle, EvaluationRequest, FlightAlternative, HotelAlternative, OracleOutcome,
};

use crate::ids;

pub struct EvaluateStage {
    oracle: Arc<dyn EvaluationOracle>,
}

impl EvaluateStage {
    pub fn new(oracle: Arc<dyn EvaluationOracle>) -> Self {
        Self { oracle }
    }
}

/// Flight + hotel + daily spending for every traveler on every day. The
/// oracle never gets to override this number.
fn total_cost(spec: &TripSpec, flight: &FlightOption, hotel: &HotelOption) -> f64 {
    let daily = spec.daily_spending_budget.unwrap_or(0.0);
    flight.price + hotel.total_price + daily * f64::from(spec.travelers) * spec.days() as f64
}

/// The next option in the original ordering, presented only when it is
/// actually cheaper than the current pick.
fn cheaper_flight(state: &TripState, current: &FlightOption) -> Option<FlightAlternative> {
    let next = state.refinement_count as usize + 1;
    state
        .flight_options
        .get(next)
        .filter(|alt| alt.price < current.price)
        .map(|alt| FlightAlternative {
            airline: alt.outbound.airline.clone(),
            price: alt.price,
            saving: current.price - alt.price,
            duration_change_minutes: i64::from(alt.total_duration_minutes)
                - i64::from(current.total_duration_minutes),
            has_layover: alt.outbound.is_layover || alt.inbound.is_layover,
        })
}

fn cheaper_hotel(state: &TripState, current: &HotelOption) -> Option<HotelAlternative> {
    let next = state.refinement_count as usize + 1;
    state
        .hotel_options
        .get(next)
        .filter(|alt| alt.total_price < current.total_price)
        .map(|alt| HotelAlternative {
            name: alt.name.clone(),
            total_price: alt.total_price,
            saving: current.total_price - alt.total_price,
            rating: alt.rating,
            current_rating: current.rating,
        })
}

#[async_trait]
impl Stage for EvaluateStage {
    fn id(&self) -> &str {
        ids::EVALUATE
    }

    async fn run(&self, state: &TripState, _ctx: &StageContext) -> Result<StageOutput> {
        let spec = state
            .spec
            .as_ref()
            .ok_or_else(|| PlanEngineError::missing_state(ids::EVALUATE, "spec"))?;
        let itinerary = state
            .itinerary
            .as_ref()
            .ok_or_else(|| PlanEngineError::missing_state(ids::EVALUATE, "itinerary"))?;

        let total = total_cost(spec, &itinerary.flight, &itinerary.hotel);
        let request = EvaluationRequest {
            budget: spec.budget,
            total_cost: total,
            current_flight: format!(
                "{}, {:.2} EUR, {} min round trip",
                itinerary.flight.outbound.airline,
                itinerary.flight.price,
                itinerary.flight.total_duration_minutes
            ),
            current_hotel: format!(
                "{}, {:.2} EUR for the stay, rated {}",
                itinerary.hotel.name, itinerary.hotel.total_price, itinerary.hotel.rating
            ),
            cheaper_flight: cheaper_flight(state, &itinerary.flight),
            cheaper_hotel: cheaper_hotel(state, &itinerary.hotel),
        };

        let (action, feedback) = match self.oracle.evaluate(&request).await {
            Ok(OracleOutcome::Decided(verdict)) => (verdict.action, verdict.feedback),
            Ok(OracleOutcome::NoDecision { reason }) => {
                log::warn!("evaluation declined: {reason}");
                (
                    EvaluationAction::Approve,
                    format!("evaluation unavailable ({reason}); keeping the current plan"),
                )
            }
            Err(e) => {
                log::warn!("evaluation oracle unreachable: {e}");
                (
                    EvaluationAction::Approve,
                    format!("evaluation unavailable ({e}); keeping the current plan"),
                )
            }
        };

        let note = match action {
            EvaluationAction::Approve => format!("approved at {total:.2} EUR"),
            EvaluationAction::RefineFlight => format!("refine flight at {total:.2} EUR"),
            EvaluationAction::RefineHotel => format!("refine hotel at {total:.2} EUR"),
        };
        Ok(StageOutput::delta(StateDelta {
            evaluation: Some(EvaluationOutcome {
                action,
                feedback,
                total_cost: total,
            }),
            // One evaluation round completed, regardless of the verdict.
            refinement_count: Some(state.refinement_count + 1),
            ..StateDelta::default()
        })
        .with_note(note))
    }
}
