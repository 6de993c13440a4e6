// src/export.rs
//! History export as CSV or JSON attachments.

use chrono::{DateTime, Local};
use serde::Serialize;
use thiserror::Error;

use crate::history::{HistoryEntry, TIMESTAMP_FORMAT};

pub const CSV_HEADER: [&str; 9] = [
    "id",
    "name",
    "comment",
    "happy",
    "sad",
    "angry",
    "dominant_emotion",
    "intensity",
    "timestamp",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv buffer flush failed: {0}")]
    Flush(String),
    #[error("json export failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }
}

/// `emotion_analysis_<YYYYmmdd_HHMMSS>.<ext>`
pub fn export_filename(format: ExportFormat, at: DateTime<Local>) -> String {
    format!(
        "emotion_analysis_{}.{}",
        at.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// One row per entry, scores with two decimals.
pub fn to_csv(entries: &[HistoryEntry]) -> Result<Vec<u8>, ExportError> {
    let mut w = csv::Writer::from_writer(Vec::new());
    w.write_record(CSV_HEADER)?;
    for e in entries {
        let s = &e.analysis.scores;
        w.write_record([
            e.id.to_string(),
            e.name.clone(),
            e.comment.clone(),
            format!("{:.2}", s.happy),
            format!("{:.2}", s.sad),
            format!("{:.2}", s.angry),
            e.analysis.dominant_emotion.clone(),
            e.analysis.intensity.to_string(),
            e.timestamp.clone(),
        ])?;
    }
    w.into_inner().map_err(|e| ExportError::Flush(e.to_string()))
}

#[derive(Serialize)]
struct JsonExport<'a> {
    export_timestamp: String,
    total_analyses: usize,
    data: &'a [HistoryEntry],
}

pub fn to_json(entries: &[HistoryEntry], at: DateTime<Local>) -> Result<Vec<u8>, ExportError> {
    let doc = JsonExport {
        export_timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
        total_analyses: entries.len(),
        data: entries,
    };
    Ok(serde_json::to_vec_pretty(&doc)?)
}
