//! Thin axum front end over [`PlannerService`].
//!
//! Routes: `GET /` health, `POST /plan` for a blocking JSON report,
//! `POST /plan/stream` for an SSE stream of per-stage progress messages
//! followed by the final report.

mod config;

pub use config::ItineraConfig;

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event as SseEvent, Sse};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;
use tower_http::cors::CorsLayer;

use itinera_planner_service::{PlanReport, PlannerService};
use plan_engine::{CancelFlag, EventError, EventSink, PlanEvent};
use planning_stages::PlannerDeps;
use trip_oracles::{ChatOracle, OpenAiChatBackend};
use trip_providers::{HttpProviderGateway, ProviderEndpoints};

/// Build the production service from environment configuration.
pub fn service_from_config(config: &ItineraConfig) -> PlannerService {
    let gateway = Arc::new(HttpProviderGateway::new(ProviderEndpoints {
        flight_url: config.flight_url.clone(),
        hotel_url: config.hotel_url.clone(),
        event_url: config.event_url.clone(),
        activity_url: config.activity_url.clone(),
        geocode_url: config.geocode_url.clone(),
    }));
    let oracle = Arc::new(ChatOracle::new(Arc::new(OpenAiChatBackend::new(
        config.llm_base_url.clone(),
        config.llm_api_key.clone(),
        config.llm_model.clone(),
    ))));

    PlannerService::new(PlannerDeps {
        parse: oracle.clone(),
        selection: oracle.clone(),
        curation: oracle.clone(),
        extraction: oracle.clone(),
        scheduling: oracle.clone(),
        evaluation: oracle,
        flights: gateway.clone(),
        hotels: gateway.clone(),
        events: gateway.clone(),
        poi: gateway.clone(),
        geocoder: gateway,
        max_refinements: config.max_refinements,
    })
}

/// The axum application over a planner service.
pub fn app(service: PlannerService) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/plan", post(plan))
        .route("/plan/stream", post(plan_stream))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(service))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlanRequestBody {
    /// The free-text trip request.
    request: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn plan(
    State(service): State<Arc<PlannerService>>,
    Json(body): Json<PlanRequestBody>,
) -> Result<Json<PlanReport>, (StatusCode, String)> {
    service
        .plan(&body.request)
        .await
        .map(Json)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

/// One message on the SSE stream: stage progress while planning runs, then
/// exactly one report or failure.
#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
enum StreamMessage {
    Progress { event: PlanEvent },
    Report { report: Box<PlanReport> },
    Failure { error: String },
}

impl StreamMessage {
    fn into_sse(self) -> SseEvent {
        let name = match &self {
            Self::Progress { .. } => "progress",
            Self::Report { .. } => "report",
            Self::Failure { .. } => "failure",
        };
        match serde_json::to_string(&self) {
            Ok(json) => SseEvent::default().event(name).data(json),
            Err(e) => SseEvent::default()
                .event("failure")
                .data(format!("{{\"kind\":\"failure\",\"error\":\"{e}\"}}")),
        }
    }
}

/// Event sink forwarding engine events into the SSE channel, preserving
/// order with the final message sent through the same sender.
struct StreamSink {
    tx: tokio::sync::mpsc::UnboundedSender<StreamMessage>,
}

impl EventSink for StreamSink {
    fn send(&self, event: PlanEvent) -> Result<(), EventError> {
        self.tx
            .send(StreamMessage::Progress { event })
            .map_err(|_| EventError::channel_closed())
    }
}

async fn plan_stream(
    State(service): State<Arc<PlannerService>>,
    Json(body): Json<PlanRequestBody>,
) -> impl IntoResponse {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<StreamMessage>();

    tokio::spawn(async move {
        let sink = StreamSink { tx: tx.clone() };
        let message = match service
            .plan_with_events(&body.request, &sink, CancelFlag::new())
            .await
        {
            Ok(report) => StreamMessage::Report {
                report: Box::new(report),
            },
            Err(e) => StreamMessage::Failure {
                error: e.to_string(),
            },
        };
        let _ = tx.send(message);
    });

    let stream = UnboundedReceiverStream::new(rx)
        .map(|message| Ok::<_, Infallible>(message.into_sse()));
    Sse::new(stream)
}
