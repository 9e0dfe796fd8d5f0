//! HTTP surface: prediction endpoints, bulk scoring, model information,
//! and health checks.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::bulk::score_csv;
use crate::consensus::ConsensusPolicy;
use crate::errors::{CardioError, CardioResult};
use crate::features::{EncodedPatient, PatientRecord, FEATURE_COLUMNS};
use crate::predictor::{predict_one, predict_panel, PanelPrediction, Prediction};
use crate::reference::{accuracy_of, OUTCOME_DISTRIBUTION};
use crate::registry::ModelRegistry;

/// Process-wide read-only state shared by every request handler
pub struct AppState {
    pub registry: Arc<ModelRegistry>,
    pub policy: ConsensusPolicy,
    /// Model used by the single-endpoint API and bulk scoring
    pub designated_model: String,
}

impl AppState {
    fn designated(&self) -> CardioResult<&crate::model::ModelArtifact> {
        self.registry
            .get(&self.designated_model)
            .ok_or_else(|| CardioError::not_found("model", &self.designated_model))
    }
}

/// Build the full service router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .route("/predict/panel", post(panel))
        .route("/predict/bulk", post(bulk))
        .route("/models", get(list_models))
        .route("/models/feature-importance", get(feature_importance))
        .route("/stats/outcomes", get(outcome_stats))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API mode: one pre-encoded record, one designated model
#[axum::debug_handler]
async fn predict(
    State(state): State<Arc<AppState>>,
    Json(patient): Json<EncodedPatient>,
) -> Result<Json<Prediction>, CardioError> {
    let vector = patient.to_vector()?;
    let result = predict_one(state.designated()?, &vector)?;
    Ok(Json(result))
}

/// UI mode: one human-readable record scored by every loaded model, with the
/// consensus verdict attached
#[axum::debug_handler]
async fn panel(
    State(state): State<Arc<AppState>>,
    Json(record): Json<PatientRecord>,
) -> Result<Json<PanelPrediction>, CardioError> {
    let vector = record.encode()?;
    let result = predict_panel(&state.registry, &state.policy, &vector)?;
    Ok(Json(result))
}

/// Bulk mode: CSV upload in, scored CSV attachment out
#[axum::debug_handler]
async fn bulk(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, CardioError> {
    let output = score_csv(state.designated()?, &body)?;
    tracing::info!(rows = output.rows, "bulk scoring complete");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"heart_predictions.csv\"",
            ),
        ],
        output.csv,
    )
        .into_response())
}

#[axum::debug_handler]
async fn list_models(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let models: Vec<serde_json::Value> = state
        .registry
        .all()
        .map(|(name, artifact)| {
            serde_json::json!({
                "name": name,
                "version": artifact.version,
                "trained_at": artifact.trained_at,
                "accuracy": accuracy_of(name),
            })
        })
        .collect();
    Json(serde_json::json!({ "models": models }))
}

#[axum::debug_handler]
async fn feature_importance(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, CardioError> {
    let importances = state
        .registry
        .all()
        .find_map(|(name, artifact)| {
            artifact.feature_importances().map(|imp| (name, imp))
        })
        .ok_or_else(|| CardioError::not_found("feature importances", "Random Forest"))?;

    let (model, values) = importances;
    let table: Vec<serde_json::Value> = FEATURE_COLUMNS
        .iter()
        .zip(values.iter())
        .map(|(feature, importance)| {
            serde_json::json!({ "feature": feature, "importance": importance })
        })
        .collect();
    Ok(Json(serde_json::json!({
        "model": model,
        "importances": table,
    })))
}

async fn outcome_stats() -> Json<serde_json::Value> {
    let outcomes: Vec<serde_json::Value> = OUTCOME_DISTRIBUTION
        .iter()
        .map(|(outcome, count)| serde_json::json!({ "outcome": outcome, "count": count }))
        .collect();
    Json(serde_json::json!({ "outcomes": outcomes }))
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn readyz(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    // The registry load is all-or-nothing at startup, so a running process
    // is ready by construction.
    let ready = !state.registry.is_empty();
    Json(serde_json::json!({ "ready": ready }))
}
