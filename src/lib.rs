// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod analysis;
pub mod api;
pub mod classify;
pub mod config;
pub mod debug;
pub mod evaluate;
pub mod export;
pub mod history;
pub mod lexicon;
pub mod metrics;
pub mod preprocess;
pub mod upload;
pub mod vsm;

// ---- Re-exports for stable public API ----
pub use crate::analysis::{Analysis, EmotionAnalyzer};
pub use crate::api::{router, AppState};
pub use crate::config::AppConfig;
pub use crate::lexicon::Emotion;
pub use crate::vsm::ScoreVector;

use axum::Router;
use tracing::info;

/// Build the full application router from the loaded configuration.
///
/// Debug routes (`/debug/*`, `/metrics`) are merged only when
/// `debug_routes` is on.
pub fn build_app(cfg: &AppConfig) -> Router {
    let state = AppState::new(cfg);
    let mut app = api::router(state.clone());

    if cfg.debug_routes {
        app = app.merge(crate::debug::router(state.analyzer.clone()));
        if let Some(m) = crate::metrics::Metrics::init() {
            app = app.merge(m.router());
        }
        info!("debug routes enabled");
    }
    app
}

/// Load configuration (file + env) and build the router.
pub async fn app() -> anyhow::Result<Router> {
    let cfg = AppConfig::load()?;
    info!(
        history_capacity = cfg.history_capacity,
        max_batch_rows = cfg.max_batch_rows,
        debug_routes = cfg.debug_routes,
        "config loaded"
    );
    Ok(build_app(&cfg))
}
