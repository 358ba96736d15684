//! Shared option-selection logic for the flight and hotel branches.

use itinera_trip_contracts::TripState;
use trip_oracles::{OptionKind, OracleOutcome, SelectionOracle, SelectionRequest};

/// Ask the selection oracle to pick from `lines`, falling back
/// deterministically when it cannot.
///
/// On a fresh round (`current` is `None`) the fallback is the first option.
/// On a refinement round the router has already advanced the pointer, so the
/// fallback keeps that advanced index rather than regressing to the top of
/// the list.
pub(crate) async fn choose_index(
    oracle: &dyn SelectionOracle,
    kind: OptionKind,
    lines: Vec<String>,
    budget: Option<f64>,
    feedback: Option<String>,
    current: Option<usize>,
) -> (usize, String) {
    let count = lines.len();
    let fallback = current.unwrap_or(0).min(count.saturating_sub(1));
    let request = SelectionRequest {
        kind,
        options: lines,
        budget,
        feedback,
    };

    match oracle.select_option(&request).await {
        Ok(OracleOutcome::Decided(choice)) if choice.index < count => {
            (choice.index, choice.reasoning)
        }
        Ok(OracleOutcome::Decided(choice)) => {
            log::warn!(
                "{} selection index {} out of range ({count} options), keeping option {fallback}",
                kind.label(),
                choice.index
            );
            (fallback, format!("defaulted to option {fallback}"))
        }
        Ok(OracleOutcome::NoDecision { reason }) => {
            log::warn!("{} selection declined: {reason}", kind.label());
            (fallback, format!("defaulted to option {fallback}"))
        }
        Err(e) => {
            log::warn!("{} selection oracle unreachable: {e}", kind.label());
            (fallback, format!("defaulted to option {fallback}"))
        }
    }
}

/// The evaluator feedback to forward into a refinement-round selection.
pub(crate) fn refinement_feedback(state: &TripState) -> Option<String> {
    state
        .evaluation
        .as_ref()
        .filter(|_| state.refinement_count > 0)
        .map(|evaluation| evaluation.feedback.clone())
}
