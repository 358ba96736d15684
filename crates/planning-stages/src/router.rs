//! The refinement router: finish, or advance a selection and re-enter a
//! branch.

use itinera_trip_contracts::{EvaluationAction, TripState};
use plan_engine::{RouteDecision, Router};

use crate::{ids, MAX_REFINEMENTS};

/// Handle names the router emits; the graph wiring must bind each one.
pub mod handles {
    pub const FINISH: &str = "finish";
    pub const REFINE_FLIGHT: &str = "refine_flight";
    pub const REFINE_HOTEL: &str = "refine_hotel";
}

/// Decides whether another refinement round is worth running.
///
/// The cap check comes before the verdict: the counter is strictly monotonic
/// (the evaluation stage bumps it every round), so the loop terminates within
/// `max_refinements` evaluations no matter what the oracle says.
pub struct RefinementRouter {
    max_refinements: u32,
}

impl RefinementRouter {
    pub fn new(max_refinements: u32) -> Self {
        Self { max_refinements }
    }
}

impl Default for RefinementRouter {
    fn default() -> Self {
        Self::new(MAX_REFINEMENTS)
    }
}

impl Router for RefinementRouter {
    fn id(&self) -> &str {
        ids::ROUTER
    }

    fn route(&self, state: &mut TripState) -> RouteDecision {
        if state.refinement_count >= self.max_refinements {
            return RouteDecision::follow(handles::FINISH)
                .with_note("refinement cap reached; keeping the best plan so far");
        }

        let action = match &state.evaluation {
            Some(evaluation) => evaluation.action,
            None => return RouteDecision::follow(handles::FINISH).with_note("no evaluation"),
        };

        match action {
            EvaluationAction::Approve => {
                RouteDecision::follow(handles::FINISH).with_note("plan approved")
            }
            EvaluationAction::RefineHotel => {
                if state.advance_hotel_selection() {
                    RouteDecision::follow(handles::REFINE_HOTEL)
                        .with_note("trying the next hotel option")
                } else {
                    RouteDecision::follow(handles::FINISH)
                        .with_note("no further hotel options to try")
                }
            }
            EvaluationAction::RefineFlight => {
                if state.advance_flight_selection() {
                    RouteDecision::follow(handles::REFINE_FLIGHT)
                        .with_note("trying the next flight option")
                } else {
                    RouteDecision::follow(handles::FINISH)
                        .with_note("no further flight options to try")
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itinera_trip_contracts::EvaluationOutcome;
    use trip_providers::fixtures::FixtureProviders;

    fn state_after_evaluation(action: EvaluationAction, rounds: u32) -> TripState {
        let fixtures = FixtureProviders::rome();
        let mut state = TripState::new("Rome");
        state.flight_options = fixtures.flights;
        state.selected_flight = Some(0);
        state.hotel_options = fixtures.hotels;
        state.selected_hotel = Some(0);
        state.refinement_count = rounds;
        state.evaluation = Some(EvaluationOutcome {
            action,
            feedback: "because".to_string(),
            total_cost: 2000.0,
        });
        state
    }

    #[test]
    fn test_approve_finishes() {
        let router = RefinementRouter::default();
        let mut state = state_after_evaluation(EvaluationAction::Approve, 1);
        assert_eq!(router.route(&mut state).handle, handles::FINISH);
        assert_eq!(state.selected_flight, Some(0));
    }

    #[test]
    fn test_refine_hotel_advances_the_pointer() {
        let router = RefinementRouter::default();
        let mut state = state_after_evaluation(EvaluationAction::RefineHotel, 1);
        let decision = router.route(&mut state);
        assert_eq!(decision.handle, handles::REFINE_HOTEL);
        assert_eq!(state.selected_hotel, Some(1));
        assert_eq!(state.selected_flight, Some(0));
    }

    #[test]
    fn test_cap_beats_a_refine_verdict() {
        let router = RefinementRouter::new(2);
        // The evaluation stage has run twice: cap exhausted.
        let mut state = state_after_evaluation(EvaluationAction::RefineFlight, 2);
        assert_eq!(router.route(&mut state).handle, handles::FINISH);
        assert_eq!(state.selected_flight, Some(0));
    }

    #[test]
    fn test_one_round_below_the_cap_still_refines() {
        let router = RefinementRouter::new(2);
        let mut state = state_after_evaluation(EvaluationAction::RefineFlight, 1);
        assert_eq!(router.route(&mut state).handle, handles::REFINE_FLIGHT);
        assert_eq!(state.selected_flight, Some(1));
    }

    #[test]
    fn test_exhausted_option_list_finishes() {
        let router = RefinementRouter::default();
        let mut state = state_after_evaluation(EvaluationAction::RefineHotel, 1);
        state.selected_hotel = Some(2);
        assert_eq!(router.route(&mut state).handle, handles::FINISH);
        assert_eq!(state.selected_hotel, Some(2));
    }
}
