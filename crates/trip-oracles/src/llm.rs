//! [`ChatOracle`]: the production oracle over a [`ChatBackend`].
//!
//! One struct implements every oracle trait. Each call builds a prompt,
//! runs it JSON-constrained, and schema-validates the reply. Transport
//! failures surface as [`OracleError`]; replies that cannot be parsed into
//! the expected shape become [`OracleOutcome::NoDecision`] so stages can
//! degrade instead of aborting the whole plan.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use itinera_trip_contracts::{Event, PointOfInterest, TripSpec};

use crate::backend::{ChatBackend, ChatRequest};
use crate::outcome::{OracleError, OracleOutcome};
use crate::prompts;
use crate::types::{
    CurationRequest, DayPlanDraft, EvaluationRequest, EvaluationVerdict, ExtractionRequest,
    OptionChoice, ScheduleRequest, SelectionRequest,
};
use crate::{
    CurationOracle, EvaluationOracle, ExtractionOracle, ParseOracle, SchedulingOracle,
    SelectionOracle,
};

/// Oracle implementation backed by a chat-completion endpoint.
#[derive(Clone)]
pub struct ChatOracle {
    backend: Arc<dyn ChatBackend>,
}

impl ChatOracle {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self { backend }
    }

    async fn decide<T: DeserializeOwned>(
        &self,
        prompt: String,
    ) -> Result<OracleOutcome<T>, OracleError> {
        let reply = self.backend.complete(ChatRequest::json(prompt)).await?;
        Ok(parse_reply(&reply))
    }
}

/// Parse a model reply into `T`, tolerating markdown code fences.
fn parse_reply<T: DeserializeOwned>(reply: &str) -> OracleOutcome<T> {
    let body = strip_fences(reply);
    match serde_json::from_str(body) {
        Ok(value) => OracleOutcome::Decided(value),
        Err(err) => {
            log::warn!("oracle reply failed schema validation: {err}");
            OracleOutcome::declined(format!("reply failed schema validation: {err}"))
        }
    }
}

/// Models sometimes wrap JSON in ```json fences despite the response format.
fn strip_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open.strip_suffix("```").unwrap_or(without_open).trim()
}

#[derive(Deserialize)]
struct PlacesEnvelope {
    places: Vec<PointOfInterest>,
}

#[derive(Deserialize)]
struct EventsEnvelope {
    events: Vec<Event>,
}

#[derive(Deserialize)]
struct ScheduleEnvelope {
    days: Vec<DayPlanDraft>,
}

#[async_trait]
impl ParseOracle for ChatOracle {
    async fn parse_trip(
        &self,
        user_request: &str,
        today: NaiveDate,
    ) -> Result<OracleOutcome<TripSpec>, OracleError> {
        let outcome: OracleOutcome<TripSpec> = self
            .decide(prompts::parse_trip(user_request, today))
            .await?;
        Ok(match outcome {
            OracleOutcome::Decided(spec) => match spec.validate() {
                Ok(()) => OracleOutcome::Decided(spec),
                Err(err) => OracleOutcome::declined(format!("parsed trip is invalid: {err}")),
            },
            declined => declined,
        })
    }
}

#[async_trait]
impl SelectionOracle for ChatOracle {
    async fn select_option(
        &self,
        request: &SelectionRequest,
    ) -> Result<OracleOutcome<OptionChoice>, OracleError> {
        let outcome: OracleOutcome<OptionChoice> =
            self.decide(prompts::select_option(request)).await?;
        // An out-of-range index is a refusal, not a panic waiting to happen.
        Ok(match outcome {
            OracleOutcome::Decided(choice) if choice.index >= request.options.len() => {
                OracleOutcome::declined(format!(
                    "selected index {} out of {} options",
                    choice.index,
                    request.options.len()
                ))
            }
            other => other,
        })
    }
}

#[async_trait]
impl CurationOracle for ChatOracle {
    async fn curate_events(
        &self,
        request: &CurationRequest,
    ) -> Result<OracleOutcome<Vec<Event>>, OracleError> {
        let outcome: OracleOutcome<EventsEnvelope> =
            self.decide(prompts::curate_events(request)).await?;
        Ok(outcome.map(|envelope| envelope.events))
    }
}

#[async_trait]
impl ExtractionOracle for ChatOracle {
    async fn extract_places(
        &self,
        request: &ExtractionRequest,
    ) -> Result<OracleOutcome<Vec<PointOfInterest>>, OracleError> {
        let outcome: OracleOutcome<PlacesEnvelope> = self
            .decide(prompts::extract_places(&request.destination, &request.raw_text))
            .await?;
        Ok(outcome.map(|envelope| envelope.places))
    }
}

#[async_trait]
impl SchedulingOracle for ChatOracle {
    async fn schedule(
        &self,
        request: &ScheduleRequest,
    ) -> Result<OracleOutcome<Vec<DayPlanDraft>>, OracleError> {
        let outcome: OracleOutcome<ScheduleEnvelope> =
            self.decide(prompts::schedule(request)).await?;
        let days = request.days;
        Ok(match outcome {
            OracleOutcome::Decided(envelope) => {
                let out_of_range = envelope
                    .days
                    .iter()
                    .find(|draft| draft.day == 0 || i64::from(draft.day) > days);
                match out_of_range {
                    Some(draft) => OracleOutcome::declined(format!(
                        "day ordinal {} outside 1..={days}",
                        draft.day
                    )),
                    None => OracleOutcome::Decided(envelope.days),
                }
            }
            OracleOutcome::NoDecision { reason } => OracleOutcome::NoDecision { reason },
        })
    }
}

#[async_trait]
impl EvaluationOracle for ChatOracle {
    async fn evaluate(
        &self,
        request: &EvaluationRequest,
    ) -> Result<OracleOutcome<EvaluationVerdict>, OracleError> {
        self.decide(prompts::evaluate(request)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itinera_trip_contracts::EvaluationAction;
    use std::sync::Mutex;

    /// Backend that replays canned replies in order.
    struct CannedBackend {
        replies: Mutex<Vec<String>>,
    }

    impl CannedBackend {
        fn new(replies: Vec<&str>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().rev().map(String::from).collect()),
            }
        }
    }

    #[async_trait]
    impl ChatBackend for CannedBackend {
        async fn complete(&self, _request: ChatRequest) -> Result<String, OracleError> {
            self.replies
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| OracleError::Malformed("no canned reply left".to_string()))
        }
    }

    fn oracle(replies: Vec<&str>) -> ChatOracle {
        ChatOracle::new(Arc::new(CannedBackend::new(replies)))
    }

    #[tokio::test]
    async fn test_parse_trip_validates_dates() {
        // End before start must be rejected as a no-decision.
        let oracle = oracle(vec![
            r#"{"origin":"Berlin","destination":"Rome","startDate":"2026-06-14","endDate":"2026-06-10","travelers":2,"budget":2500.0,"dailySpendingBudget":null,"interests":["history"]}"#,
        ]);
        let today = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let outcome = oracle.parse_trip("Rome in June", today).await.unwrap();
        assert!(matches!(outcome, OracleOutcome::NoDecision { .. }));
    }

    #[tokio::test]
    async fn test_select_option_rejects_out_of_range_index() {
        let oracle = oracle(vec![r#"{"index":5,"reasoning":"cheapest"}"#]);
        let request = SelectionRequest {
            kind: crate::types::OptionKind::Flight,
            options: vec!["a".to_string(), "b".to_string()],
            budget: None,
            feedback: None,
        };
        let outcome = oracle.select_option(&request).await.unwrap();
        assert!(matches!(outcome, OracleOutcome::NoDecision { .. }));
    }

    #[tokio::test]
    async fn test_extract_places_unwraps_envelope_and_fences() {
        let oracle = oracle(vec![
            "```json\n{\"places\":[{\"name\":\"Colosseum\",\"description\":\"Ancient amphitheatre\",\"location\":\"Rome\",\"timeOfDay\":\"Morning\"}]}\n```",
        ]);
        let request = ExtractionRequest {
            destination: "Rome".to_string(),
            raw_text: "The Colosseum is a must-see.".to_string(),
        };
        let places = oracle
            .extract_places(&request)
            .await
            .unwrap()
            .decided()
            .unwrap();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].name, "Colosseum");
        assert_eq!(places[0].coordinates(), None);
    }

    #[tokio::test]
    async fn test_schedule_rejects_day_beyond_trip_length() {
        let oracle = oracle(vec![r#"{"days":[{"day":4,"activities":[]}]}"#]);
        let request = ScheduleRequest {
            destination: "Rome".to_string(),
            days: 3,
            activities: vec![],
            events: vec![],
        };
        let outcome = oracle.schedule(&request).await.unwrap();
        assert!(matches!(outcome, OracleOutcome::NoDecision { .. }));
    }

    #[tokio::test]
    async fn test_schedule_passes_through_a_refusal() {
        // A reply that fails schema validation must surface as a refusal
        // carrying the validation reason, not silently as an empty plan.
        let oracle = oracle(vec![r#"{"itinerary":"see Rome"}"#]);
        let request = ScheduleRequest {
            destination: "Rome".to_string(),
            days: 3,
            activities: vec![],
            events: vec![],
        };
        let outcome = oracle.schedule(&request).await.unwrap();
        match outcome {
            OracleOutcome::NoDecision { reason } => {
                assert!(reason.contains("schema validation"));
            }
            OracleOutcome::Decided(days) => panic!("unexpected decision: {days:?}"),
        }
    }

    #[tokio::test]
    async fn test_evaluate_parses_screaming_snake_action() {
        let oracle = oracle(vec![r#"{"action":"REFINE_HOTEL","feedback":"over budget"}"#]);
        let request = EvaluationRequest {
            budget: Some(1000.0),
            total_cost: 1400.0,
            current_flight: "ITA Airways, 412.00 EUR".to_string(),
            current_hotel: "Hotel Artemide, 980.00 EUR".to_string(),
            cheaper_flight: None,
            cheaper_hotel: None,
        };
        let verdict = oracle.evaluate(&request).await.unwrap().decided().unwrap();
        assert_eq!(verdict.action, EvaluationAction::RefineHotel);
    }

    #[tokio::test]
    async fn test_malformed_reply_is_a_refusal_not_an_error() {
        let oracle = oracle(vec!["I cannot help with that."]);
        let request = EvaluationRequest {
            budget: None,
            total_cost: 0.0,
            current_flight: String::new(),
            current_hotel: String::new(),
            cheaper_flight: None,
            cheaper_hotel: None,
        };
        let outcome = oracle.evaluate(&request).await.unwrap();
        assert!(matches!(outcome, OracleOutcome::NoDecision { .. }));
    }
}
