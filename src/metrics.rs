// src/metrics.rs
//! Prometheus exposition for the scoring service.
//!
//! The recorder is process-global: it is installed at most once, and every
//! later `app()` build reuses the same handle.

use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub const ANALYSES_TOTAL: &str = "emotion_analyses_total";
pub const FALLBACK_TOTAL: &str = "emotion_scoring_fallback_total";
pub const BATCH_ROWS_TOTAL: &str = "emotion_batch_rows_total";
pub const HISTORY_SIZE: &str = "emotion_history_size";
pub const ANALYZE_MS: &str = "emotion_analyze_ms";

#[derive(Clone)]
pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder (first call only). Returns `None` when
    /// some other recorder already owns the global slot.
    pub fn init() -> Option<Self> {
        static HANDLE: OnceCell<Option<PrometheusHandle>> = OnceCell::new();
        HANDLE
            .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
                Ok(handle) => {
                    describe_all();
                    Some(handle)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "prometheus recorder not installed");
                    None
                }
            })
            .clone()
            .map(|handle| Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

fn describe_all() {
    describe_counter!(ANALYSES_TOTAL, "Comments scored, labelled by dominant emotion.");
    describe_counter!(
        FALLBACK_TOTAL,
        "Scorings that fell back to the uniform split, by reason."
    );
    describe_counter!(BATCH_ROWS_TOTAL, "Rows processed through batch/CSV uploads.");
    describe_gauge!(HISTORY_SIZE, "Records currently held in the history log.");
    describe_histogram!(ANALYZE_MS, "Single-comment analysis time in milliseconds.");
}
