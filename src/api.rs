// src/api.rs
//! HTTP surface: analysis, history, statistics and export routes.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, DefaultBodyLimit, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use metrics::{counter, gauge, histogram};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use crate::analysis::{
    display_name, has_split_tags, truth_label, Analysis, BatchOutcome, BatchRecord,
    EmotionAnalyzer,
};
use crate::config::AppConfig;
use crate::evaluate::ClassificationReport;
use crate::export::{self, ExportError, ExportFormat};
use crate::history::{HistoryEntry, HistoryStore, NewRecord, RecordSource, Statistics};
use crate::metrics::{ANALYSES_TOTAL, ANALYZE_MS, BATCH_ROWS_TOTAL, HISTORY_SIZE};
use crate::upload::{self, UploadError};

/// Body limit of `/analyze/csv`; other routes keep axum's default.
pub const CSV_BODY_LIMIT: usize = 16 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<EmotionAnalyzer>,
    pub history: Arc<HistoryStore>,
    pub max_batch_rows: usize,
}

impl AppState {
    pub fn new(cfg: &AppConfig) -> Self {
        Self {
            analyzer: Arc::new(EmotionAnalyzer::new()),
            history: Arc::new(HistoryStore::with_capacity(cfg.history_capacity)),
            max_batch_rows: cfg.max_batch_rows,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/analyze", post(analyze))
        .route("/analyze/batch", post(analyze_batch))
        .route(
            "/analyze/csv",
            post(analyze_csv).layer(DefaultBodyLimit::max(CSV_BODY_LIMIT)),
        )
        .route("/history", get(history))
        .route("/history/clear", post(clear_history))
        .route("/history/{id}", get(history_entry))
        .route("/statistics/json", get(statistics))
        .route("/export/csv", get(export_csv))
        .route("/export/json", get(export_json))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

// ---------- errors ----------

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("analysis {0} not found")]
    NotFound(u64),
    #[error("batch has {got} rows, limit is {max}")]
    TooLarge { got: usize, max: usize },
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rej: JsonRejection) -> Self {
        ApiError::BadRequest(rej.body_text())
    }
}

impl From<UploadError> for ApiError {
    fn from(e: UploadError) -> Self {
        match e {
            UploadError::TooManyRows { got, max } => ApiError::TooLarge { got, max },
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

// ---------- helpers ----------

/// Short SHA-256 prefix identifying a comment in logs without its text.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

fn store(
    state: &AppState,
    name: String,
    comment: String,
    analysis: Analysis,
    source: RecordSource,
) -> HistoryEntry {
    counter!(ANALYSES_TOTAL, "dominant" => analysis.dominant_emotion.clone()).increment(1);
    let anon = anon_hash(&comment);
    let entry = state.history.append(NewRecord {
        name,
        comment,
        analysis,
        source,
    });
    gauge!(HISTORY_SIZE).set(state.history.len() as f64);
    info!(
        id = entry.id,
        anon = %anon,
        dominant = %entry.analysis.dominant_emotion,
        intensity = %entry.analysis.intensity,
        source = ?entry.source,
        "analysis stored"
    );
    entry
}

// ---------- handlers ----------

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "message": "Emotion analysis API is running",
    }))
}

#[derive(Debug, Deserialize)]
struct AnalyzeReq {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    true_label: Option<String>,
    #[serde(default)]
    label: Option<String>,
}

#[derive(Debug, Serialize)]
struct AnalyzeResp {
    status: &'static str,
    analysis_id: u64,
    name: String,
    comment: String,
    #[serde(flatten)]
    analysis: Analysis,
    timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics: Option<ClassificationReport>,
}

async fn analyze(
    State(state): State<AppState>,
    body: Result<Json<AnalyzeReq>, JsonRejection>,
) -> Result<Json<AnalyzeResp>, ApiError> {
    let Json(req) = body?;
    let comment = req.comment.as_deref().map(str::trim).unwrap_or_default();
    if comment.is_empty() {
        return Err(ApiError::BadRequest("Comment cannot be empty".into()));
    }

    let truth = truth_label(req.true_label.as_deref(), req.label.as_deref());
    let started = Instant::now();
    let (analysis, metrics) = state.analyzer.analyze_labeled(comment, truth);
    histogram!(ANALYZE_MS).record(started.elapsed().as_secs_f64() * 1000.0);

    let entry = store(
        &state,
        display_name(req.name.as_deref()),
        comment.to_string(),
        analysis,
        RecordSource::Single,
    );
    Ok(Json(AnalyzeResp {
        status: "success",
        analysis_id: entry.id,
        name: entry.name,
        comment: entry.comment,
        analysis: entry.analysis,
        timestamp: entry.timestamp,
        metrics,
    }))
}

#[derive(Debug, Deserialize)]
struct BatchReq {
    #[serde(default)]
    records: Vec<BatchRecord>,
}

#[derive(Debug, Serialize)]
struct BatchResp {
    status: &'static str,
    /// History ids in the same order as `rows`.
    analysis_ids: Vec<u64>,
    #[serde(flatten)]
    outcome: BatchOutcome,
}

fn run_batch(
    state: &AppState,
    records: &[BatchRecord],
    split_column: bool,
    source: RecordSource,
) -> Result<BatchResp, ApiError> {
    if records.is_empty() {
        return Err(ApiError::BadRequest("No records provided".into()));
    }
    if records.len() > state.max_batch_rows {
        return Err(ApiError::TooLarge {
            got: records.len(),
            max: state.max_batch_rows,
        });
    }

    let outcome = state.analyzer.analyze_batch(records, split_column);
    counter!(BATCH_ROWS_TOTAL).increment(outcome.total_processed as u64);
    let analysis_ids = outcome
        .rows
        .iter()
        .map(|row| {
            let analysis = row.analysis.clone();
            store(state, row.name.clone(), row.comment.clone(), analysis, source).id
        })
        .collect();
    info!(
        total_rows = outcome.total_rows,
        processed = outcome.total_processed,
        with_metrics = outcome.metrics.is_some(),
        source = ?source,
        "batch analyzed"
    );
    Ok(BatchResp {
        status: "success",
        analysis_ids,
        outcome,
    })
}

async fn analyze_batch(
    State(state): State<AppState>,
    body: Result<Json<BatchReq>, JsonRejection>,
) -> Result<Json<BatchResp>, ApiError> {
    let Json(req) = body?;
    let split_column = has_split_tags(&req.records);
    Ok(Json(run_batch(
        &state,
        &req.records,
        split_column,
        RecordSource::Batch,
    )?))
}

async fn analyze_csv(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<BatchResp>, ApiError> {
    let text = std::str::from_utf8(&body)
        .map_err(|e| ApiError::BadRequest(format!("CSV body is not valid UTF-8: {e}")))?;
    let batch = upload::parse_csv(text, state.max_batch_rows)?;
    Ok(Json(run_batch(
        &state,
        &batch.records,
        batch.split_column,
        RecordSource::CsvUpload,
    )?))
}

#[derive(Debug, Serialize)]
struct HistoryResp {
    total_analyses: usize,
    history: Vec<HistoryEntry>,
}

async fn history(State(state): State<AppState>) -> Json<HistoryResp> {
    let history = state.history.snapshot();
    Json(HistoryResp {
        total_analyses: history.len(),
        history,
    })
}

async fn history_entry(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<HistoryEntry>, ApiError> {
    state.history.get(id).map(Json).ok_or(ApiError::NotFound(id))
}

async fn clear_history(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.history.clear();
    gauge!(HISTORY_SIZE).set(0.0);
    info!("history cleared");
    Json(json!({ "status": "success", "message": "History cleared" }))
}

async fn statistics(State(state): State<AppState>) -> Json<Statistics> {
    Json(state.history.statistics())
}

fn attachment(format: ExportFormat, bytes: Vec<u8>) -> Response {
    let filename = export::export_filename(format, Local::now());
    (
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

async fn export_csv(State(state): State<AppState>) -> Result<Response, ApiError> {
    let bytes = export::to_csv(&state.history.snapshot())?;
    Ok(attachment(ExportFormat::Csv, bytes))
}

async fn export_json(State(state): State<AppState>) -> Result<Response, ApiError> {
    let bytes = export::to_json(&state.history.snapshot(), Local::now())?;
    Ok(attachment(ExportFormat::Json, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anon_hash_is_short_and_stable() {
        let a = anon_hash("saya senang");
        assert_eq!(a.len(), 12);
        assert_eq!(a, anon_hash("saya senang"));
        assert_ne!(a, anon_hash("saya sedih"));
    }

    #[test]
    fn error_statuses() {
        assert_eq!(ApiError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound(7).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(UploadError::TooManyRows { got: 3, max: 2 }).status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ApiError::from(UploadError::MissingCommentColumn).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
