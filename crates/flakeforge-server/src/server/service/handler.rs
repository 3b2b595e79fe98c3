//! HTTP handlers for Snowflake ID generation.
//!
//! ## Routes
//!
//! - `GET /generate-id`: `{"id": 123}` (or `{"id": "123"}` when IDs are
//!   served as strings)
//! - `GET /health`: liveness plus the worker's identity
//!
//! All routes answer CORS requests from any origin.

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::get};
use flakeforge::{SnowflakeGenerator, SnowflakeId, TimeSource};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::server::{identity::WorkerIdentity, service::error::ApiError};

/// Clock shared by the service's generator. A trait object so tests can swap
/// in a simulated clock.
pub type Clock = Arc<dyn TimeSource + Send + Sync>;

pub type Generator = SnowflakeGenerator<Clock>;

/// Shared state: the process's single generator plus its identity.
#[derive(Clone)]
pub struct AppState {
    generator: Arc<Generator>,
    identity: Arc<WorkerIdentity>,
    id_as_string: bool,
}

impl AppState {
    pub fn new(generator: Generator, identity: WorkerIdentity, id_as_string: bool) -> Self {
        Self {
            generator: Arc::new(generator),
            identity: Arc::new(identity),
            id_as_string,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum IdValue {
    Number(SnowflakeId),
    Text(#[serde(with = "flakeforge::serde::as_string")] SnowflakeId),
}

#[derive(Debug, Serialize)]
pub struct IdResponse {
    pub id: IdValue,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub identity: WorkerIdentity,
    pub language: &'static str,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/generate-id", get(generate_id))
        .route("/health", get(health))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tracing::instrument(level = "debug", skip(state))]
pub async fn generate_id(State(state): State<AppState>) -> Result<Json<IdResponse>, ApiError> {
    let id = state.generator.generate_async().await?;
    let id = if state.id_as_string {
        IdValue::Text(id)
    } else {
        IdValue::Number(id)
    };
    Ok(Json(IdResponse { id }))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        identity: (*state.identity).clone(),
        language: "Rust",
    })
}
