//! Scripted oracle stand-ins for deterministic tests.
//!
//! Each mock replays a fixed sequence of steps: decide a value, decline, or
//! fail at the transport level. Running past the end of a script is reported
//! as a transport error so a test with an unexpected extra call fails loudly.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use itinera_trip_contracts::{Event, PointOfInterest, TripSpec};

use crate::outcome::{OracleError, OracleOutcome};
use crate::types::{
    CurationRequest, DayPlanDraft, EvaluationRequest, EvaluationVerdict, ExtractionRequest,
    OptionChoice, ScheduleRequest, SelectionRequest,
};
use crate::{
    CurationOracle, EvaluationOracle, ExtractionOracle, ParseOracle, SchedulingOracle,
    SelectionOracle,
};

/// One scripted oracle response.
#[derive(Debug, Clone)]
pub enum ScriptStep<T> {
    /// Answer with a decided value.
    Decide(T),
    /// Decline with a reason.
    Decline(String),
    /// Fail as if the endpoint were unreachable.
    Fail(String),
}

struct Script<T> {
    steps: Mutex<VecDeque<ScriptStep<T>>>,
}

impl<T: Clone> Script<T> {
    fn new(steps: Vec<ScriptStep<T>>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
        }
    }

    fn next(&self) -> Result<OracleOutcome<T>, OracleError> {
        let step = self
            .steps
            .lock()
            .map_err(|_| OracleError::Malformed("script mutex poisoned".to_string()))?
            .pop_front();
        match step {
            Some(ScriptStep::Decide(value)) => Ok(OracleOutcome::Decided(value)),
            Some(ScriptStep::Decline(reason)) => Ok(OracleOutcome::NoDecision { reason }),
            Some(ScriptStep::Fail(message)) => Err(OracleError::Api {
                status: 503,
                body: message,
            }),
            None => Err(OracleError::Malformed("script exhausted".to_string())),
        }
    }
}

macro_rules! scripted_oracle {
    ($name:ident, $value:ty) => {
        pub struct $name {
            script: Script<$value>,
        }

        impl $name {
            pub fn scripted(steps: Vec<ScriptStep<$value>>) -> Self {
                Self {
                    script: Script::new(steps),
                }
            }

            /// A script answering the given values in order.
            pub fn deciding(values: Vec<$value>) -> Self {
                Self::scripted(values.into_iter().map(ScriptStep::Decide).collect())
            }

            /// A script that declines every call with the given reason.
            pub fn declining(reason: &str) -> Self {
                Self::scripted(vec![ScriptStep::Decline(reason.to_string()); 8])
            }

            /// A script that fails every call at the transport level.
            pub fn failing(message: &str) -> Self {
                Self::scripted(vec![ScriptStep::Fail(message.to_string()); 8])
            }
        }
    };
}

scripted_oracle!(ScriptedParseOracle, TripSpec);
scripted_oracle!(ScriptedCurationOracle, Vec<Event>);
scripted_oracle!(ScriptedExtractionOracle, Vec<PointOfInterest>);
scripted_oracle!(ScriptedSchedulingOracle, Vec<DayPlanDraft>);
scripted_oracle!(ScriptedEvaluationOracle, EvaluationVerdict);

/// Selection mock that also records every request it saw, so tests can
/// assert the feedback and candidate lines a stage passed through.
pub struct ScriptedSelectionOracle {
    script: Script<OptionChoice>,
    requests: Mutex<Vec<SelectionRequest>>,
}

impl ScriptedSelectionOracle {
    pub fn scripted(steps: Vec<ScriptStep<OptionChoice>>) -> Self {
        Self {
            script: Script::new(steps),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A script answering the given choices in order.
    pub fn deciding(values: Vec<OptionChoice>) -> Self {
        Self::scripted(values.into_iter().map(ScriptStep::Decide).collect())
    }

    /// A script that declines every call with the given reason.
    pub fn declining(reason: &str) -> Self {
        Self::scripted(vec![ScriptStep::Decline(reason.to_string()); 8])
    }

    /// A script that fails every call at the transport level.
    pub fn failing(message: &str) -> Self {
        Self::scripted(vec![ScriptStep::Fail(message.to_string()); 8])
    }

    /// Every request seen so far, in call order.
    pub fn requests(&self) -> Vec<SelectionRequest> {
        self.requests
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ParseOracle for ScriptedParseOracle {
    async fn parse_trip(
        &self,
        _user_request: &str,
        _today: NaiveDate,
    ) -> Result<OracleOutcome<TripSpec>, OracleError> {
        self.script.next()
    }
}

#[async_trait]
impl SelectionOracle for ScriptedSelectionOracle {
    async fn select_option(
        &self,
        request: &SelectionRequest,
    ) -> Result<OracleOutcome<OptionChoice>, OracleError> {
        self.requests
            .lock()
            .map_err(|_| OracleError::Malformed("request log mutex poisoned".to_string()))?
            .push(request.clone());
        self.script.next()
    }
}

#[async_trait]
impl CurationOracle for ScriptedCurationOracle {
    async fn curate_events(
        &self,
        _request: &CurationRequest,
    ) -> Result<OracleOutcome<Vec<Event>>, OracleError> {
        self.script.next()
    }
}

#[async_trait]
impl ExtractionOracle for ScriptedExtractionOracle {
    async fn extract_places(
        &self,
        _request: &ExtractionRequest,
    ) -> Result<OracleOutcome<Vec<PointOfInterest>>, OracleError> {
        self.script.next()
    }
}

#[async_trait]
impl SchedulingOracle for ScriptedSchedulingOracle {
    async fn schedule(
        &self,
        _request: &ScheduleRequest,
    ) -> Result<OracleOutcome<Vec<DayPlanDraft>>, OracleError> {
        self.script.next()
    }
}

#[async_trait]
impl EvaluationOracle for ScriptedEvaluationOracle {
    async fn evaluate(
        &self,
        _request: &EvaluationRequest,
    ) -> Result<OracleOutcome<EvaluationVerdict>, OracleError> {
        self.script.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_script_replays_in_order_then_exhausts() {
        let oracle = ScriptedSelectionOracle::scripted(vec![
            ScriptStep::Decide(OptionChoice {
                index: 1,
                reasoning: "best value".to_string(),
            }),
            ScriptStep::Decline("no clear winner".to_string()),
        ]);
        let request = SelectionRequest {
            kind: crate::types::OptionKind::Hotel,
            options: vec!["a".to_string(), "b".to_string()],
            budget: None,
            feedback: None,
        };

        let first = oracle.select_option(&request).await.unwrap();
        assert_eq!(first.decided().map(|c| c.index), Some(1));

        let second = oracle.select_option(&request).await.unwrap();
        assert!(matches!(second, OracleOutcome::NoDecision { .. }));

        assert!(oracle.select_option(&request).await.is_err());
        assert_eq!(oracle.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_failing_script_surfaces_transport_error() {
        let oracle = ScriptedEvaluationOracle::failing("connection refused");
        let request = EvaluationRequest {
            budget: None,
            total_cost: 0.0,
            current_flight: String::new(),
            current_hotel: String::new(),
            cheaper_flight: None,
            cheaper_hotel: None,
        };
        assert!(matches!(
            oracle.evaluate(&request).await,
            Err(OracleError::Api { status: 503, .. })
        ));
    }
}
