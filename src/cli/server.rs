//! HTTP server mode for driving a recorder over REST

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeSet;
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::RecorderConfig;
use crate::error::{Error, Result};
use crate::exchange::{CapturedExchange, ExchangeInput, Har, HarEntry};
use crate::recorder::Recorder;

/// App state shared across handlers
#[derive(Clone)]
struct AppState {
    recorder: Recorder,
}

/// Request body for `POST /exchanges`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExchangeRequest {
    /// A single HAR entry under `har`
    Har { har: Box<HarEntry> },
    /// The flat JSON form
    Input(ExchangeInput),
}

impl ExchangeRequest {
    fn into_exchange(self) -> Result<CapturedExchange> {
        match self {
            ExchangeRequest::Har { har } => CapturedExchange::from_har_entry(&har),
            ExchangeRequest::Input(input) => input.into_exchange(),
        }
    }
}

/// Request body for `PUT /hosts/disabled`
#[derive(Debug, Deserialize)]
struct DisabledHostsRequest {
    hosts: Vec<String>,
}

/// Request body for `POST /parameterise`
#[derive(Debug, Deserialize)]
struct ParameteriseRequest {
    host: String,
    index: usize,
    template: String,
}

/// Response wrapper
#[derive(Debug, Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn error(msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

fn ok<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}

/// Map an error to its status: 422 for rejected operations, 400 for bad input
fn error_response(e: &Error) -> Response {
    let status = if e.is_validation() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else if e.is_bad_input() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(ApiResponse::<()>::error(e.to_string()))).into_response()
}

/// Build the router around a recorder
pub fn router(recorder: Recorder) -> Router {
    // Build CORS layer - allow all origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/start", post(start))
        .route("/stop", post(stop))
        .route("/clear", post(clear))
        .route("/exchanges", post(record_exchange))
        .route("/har", post(import_har))
        .route("/openapi.json", get(openapi))
        .route("/endpoints", get(endpoints))
        .route("/hosts", get(hosts))
        .route("/hosts/disabled", put(set_disabled_hosts))
        .route("/parameterise", post(parameterise))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(AppState { recorder })
}

/// Start the HTTP server
pub async fn serve(config: RecorderConfig, port: u16) -> Result<()> {
    let app = router(Recorder::new(&config));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting HTTP server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to port {port}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::config(format!("Server error: {e}")))?;

    Ok(())
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn status(State(state): State<AppState>) -> Response {
    ok(state.recorder.snapshot().await)
}

async fn start(State(state): State<AppState>) -> Response {
    state.recorder.start().await;
    ok(state.recorder.snapshot().await)
}

async fn stop(State(state): State<AppState>) -> Response {
    state.recorder.stop().await;
    ok(state.recorder.snapshot().await)
}

async fn clear(State(state): State<AppState>) -> Response {
    state.recorder.clear().await;
    ok(state.recorder.snapshot().await)
}

/// Record one exchange
async fn record_exchange(
    State(state): State<AppState>,
    Json(request): Json<ExchangeRequest>,
) -> Response {
    // Ticket precedes validation; a clear in between drops the exchange
    let ticket = state.recorder.begin_exchange().await;
    let exchange = match request.into_exchange() {
        Ok(exchange) => exchange,
        Err(e) => return error_response(&e),
    };
    let outcome = state.recorder.commit(ticket, exchange).await;
    ok(json!({
        "recorded": outcome.is_recorded(),
        "outcome": outcome.as_str(),
    }))
}

/// Import a whole HAR log
async fn import_har(State(state): State<AppState>, body: Bytes) -> Response {
    let har = match std::str::from_utf8(&body)
        .map_err(|e| Error::har(format!("body is not UTF-8: {e}")))
        .and_then(Har::from_json)
    {
        Ok(har) => har,
        Err(e) => return error_response(&e),
    };
    match state.recorder.import_har(har).await {
        Ok(summary) => ok(summary),
        Err(e) => error_response(&e),
    }
}

/// Raw OpenAPI document, always valid even when nothing was recorded
async fn openapi(State(state): State<AppState>) -> Response {
    Json(state.recorder.document().await).into_response()
}

async fn endpoints(State(state): State<AppState>) -> Response {
    ok(state.recorder.endpoint_summaries().await)
}

/// Every observed host with its disabled flag and enabled endpoints
async fn hosts(State(state): State<AppState>) -> Response {
    let all = state.recorder.hosts().await;
    let disabled: BTreeSet<String> = state.recorder.disabled_hosts().await;
    let by_host = state.recorder.endpoints_by_host().await;

    let hosts: Vec<_> = all
        .iter()
        .map(|host| {
            let endpoints: Vec<_> = by_host
                .iter()
                .find(|group| &group.host == host)
                .map(|group| group.endpoints.iter().map(|e| e.summary()).collect())
                .unwrap_or_default();
            json!({
                "host": host,
                "disabled": disabled.contains(host),
                "endpoints": endpoints,
            })
        })
        .collect();

    ok(json!({ "hosts": hosts }))
}

async fn set_disabled_hosts(
    State(state): State<AppState>,
    Json(request): Json<DisabledHostsRequest>,
) -> Response {
    state.recorder.set_disabled_hosts(request.hosts).await;
    ok(state.recorder.snapshot().await)
}

async fn parameterise(
    State(state): State<AppState>,
    Json(request): Json<ParameteriseRequest>,
) -> Response {
    match state
        .recorder
        .parameterise(request.index, &request.template, &request.host)
        .await
    {
        Ok(outcome) => ok(outcome),
        Err(e) => error_response(&e),
    }
}
