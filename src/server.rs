//! HTTP API for airport checkpoint wait times.
//!
//! This module provides an HTTP server that:
//! - Lists airports with their current blended wait
//! - Serves per-airport checkpoint and line-type breakdowns
//! - Accepts crowd-submitted wait reports via POST /api/reports
//!
//! # Architecture
//!
//! ```text
//! Browser ──→ GET /api/airports ──→ Aggregator ──→ ReportStore
//!    │                                  │
//!    └──→ POST /api/reports ──→ validation ──→ ReportStore
//!                                       │
//!                                   Estimator
//! ```

use crate::activity::{ActivityStats, SharedActivityLog};
use crate::core::{Aggregator, AirportWithStats, CheckpointStats, LineTypeStats, NetworkSummary};
use crate::store::{StoreError, WaitTimeReport};
use crate::validation::{FieldError, ReportRequest, ValidationError};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub host: String,
    /// Port to bind to (0 for random)
    pub port: u16,
}

impl ServerConfig {
    /// Create a new server configuration
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

/// Shared server state
pub struct ServerState {
    aggregator: Aggregator,
    activity: SharedActivityLog,
}

impl ServerState {
    pub fn new(aggregator: Aggregator) -> Self {
        let activity = aggregator.activity().clone();
        Self {
            aggregator,
            activity,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

/// Errors returned by API handlers.
#[derive(Debug)]
pub enum ApiError {
    /// No airport or report target with that identifier
    NotFound(String),
    /// Body could not be parsed
    BadRequest(String),
    /// Body parsed but failed validation
    Validation(ValidationError),
    /// Store failure
    Store(StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    error: msg,
                    code: "NOT_FOUND".to_string(),
                    fields: Vec::new(),
                },
            ),
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: msg,
                    code: "BAD_REQUEST".to_string(),
                    fields: Vec::new(),
                },
            ),
            ApiError::Validation(e) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: e.to_string(),
                    code: "INVALID_REPORT".to_string(),
                    fields: e.fields,
                },
            ),
            ApiError::Store(StoreError::UnknownAirport(id)) => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    error: format!("Airport {id} not found"),
                    code: "NOT_FOUND".to_string(),
                    fields: Vec::new(),
                },
            ),
            ApiError::Store(e) => {
                tracing::error!("Store failure: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: e.to_string(),
                        code: "STORE_ERROR".to_string(),
                        fields: Vec::new(),
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

type SharedState = Arc<ServerState>;

/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/airports
async fn list_airports(
    State(state): State<SharedState>,
) -> Result<Json<Vec<AirportWithStats>>, ApiError> {
    Ok(Json(state.aggregator.airports_with_stats()?))
}

/// GET /api/airports/:code
async fn get_airport(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<AirportWithStats>, ApiError> {
    state
        .aggregator
        .airport_with_stats(&code)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Airport {code} not found")))
}

/// GET /api/airports/:code/checkpoints
async fn get_checkpoints(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<Vec<CheckpointStats>>, ApiError> {
    Ok(Json(state.aggregator.checkpoint_stats(&code)?))
}

/// GET /api/airports/:code/line-types
async fn get_line_types(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<Vec<LineTypeStats>>, ApiError> {
    Ok(Json(state.aggregator.line_type_stats(&code)?))
}

/// GET /api/reports/:code
async fn get_reports(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<Vec<WaitTimeReport>>, ApiError> {
    Ok(Json(state.aggregator.recent_reports(&code)?))
}

/// POST /api/reports
async fn create_report(
    State(state): State<SharedState>,
    body: Result<Json<ReportRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<WaitTimeReport>), ApiError> {
    let Json(request) = body.map_err(|e| {
        state.activity.record_report_rejected();
        tracing::warn!("Rejected malformed report body: {e}");
        ApiError::BadRequest(format!("Invalid report body: {}", e.body_text()))
    })?;

    let report = request.validate().map_err(|e| {
        state.activity.record_report_rejected();
        tracing::warn!("{e}");
        ApiError::from(e)
    })?;

    let stored = state.aggregator.submit_report(report)?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /api/summary
async fn get_summary(State(state): State<SharedState>) -> Result<Json<NetworkSummary>, ApiError> {
    Ok(Json(state.aggregator.summary()?))
}

/// GET /api/activity
async fn get_activity(State(state): State<SharedState>) -> Json<ActivityStats> {
    Json(state.activity.stats())
}

/// Build the API router.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/airports", get(list_airports))
        .route("/api/airports/:code", get(get_airport))
        .route("/api/airports/:code/checkpoints", get(get_checkpoints))
        .route("/api/airports/:code/line-types", get(get_line_types))
        .route("/api/reports", post(create_report))
        .route("/api/reports/:code", get(get_reports))
        .route("/api/summary", get(get_summary))
        .route("/api/activity", get(get_activity))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers(Any),
        )
        .with_state(Arc::new(state))
}

/// Run the HTTP server
pub async fn run(
    config: ServerConfig,
    aggregator: Aggregator,
) -> anyhow::Result<(SocketAddr, tokio::sync::oneshot::Sender<()>)> {
    let app = router(ServerState::new(aggregator));

    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    let actual_addr = listener.local_addr()?;

    tracing::info!("Checkpoint wait server listening on http://{}", actual_addr);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                tracing::info!("Server shutdown signal received");
            })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok((actual_addr, shutdown_tx))
}
