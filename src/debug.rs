//! Debug endpoints: inspect preprocessing, raw similarities and lexicons.
//! Mounted only when `debug_routes` is on (`DEBUG_ROUTES=1`).

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{extract::Query, extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::analysis::EmotionAnalyzer;
use crate::lexicon::Emotion;
use crate::preprocess::PreprocessingTrace;

#[derive(Debug, Serialize)]
pub struct PreprocessOut {
    pub trace: PreprocessingTrace,
    /// Raw cosine similarities before normalization; `None` if vectorization failed.
    pub similarities: Option<BTreeMap<Emotion, f64>>,
}

#[derive(Debug, Serialize)]
pub struct LexiconOut {
    pub words: &'static [&'static str],
    pub count: usize,
}

pub fn router(analyzer: Arc<EmotionAnalyzer>) -> Router {
    Router::new()
        .route("/debug/preprocess", get(get_preprocess))
        .route("/debug/lexicons", get(get_lexicons))
        .with_state(analyzer)
}

/// GET /debug/preprocess?text=...
async fn get_preprocess(
    State(analyzer): State<Arc<EmotionAnalyzer>>,
    Query(q): Query<HashMap<String, String>>,
) -> Json<PreprocessOut> {
    let text = q.get("text").cloned().unwrap_or_default();
    let trace = analyzer.preprocessor().preprocessing_steps(&text);
    let similarities = analyzer
        .scorer()
        .similarities(&trace.cleaned)
        .ok()
        .map(|sims| Emotion::ALL.into_iter().zip(sims).collect());
    Json(PreprocessOut {
        trace,
        similarities,
    })
}

async fn get_lexicons() -> Json<BTreeMap<Emotion, LexiconOut>> {
    Json(
        Emotion::ALL
            .into_iter()
            .map(|e| {
                let words = e.words();
                (
                    e,
                    LexiconOut {
                        words,
                        count: words.len(),
                    },
                )
            })
            .collect(),
    )
}
