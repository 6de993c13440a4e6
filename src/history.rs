//! history.rs: in-memory append-only log of analyses plus running statistics.
//!
//! The store is the only shared mutable state of the service. All writes go
//! through one mutex; the per-emotion means are updated incrementally on
//! `append`, so `statistics()` never rescans the log.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::analysis::Analysis;
use crate::lexicon::Emotion;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const MAX_CAPACITY: usize = 1_000_000;

/// How a record entered the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    Single,
    Batch,
    CsvUpload,
}

/// What the caller hands to [`HistoryStore::append`].
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub name: String,
    pub comment: String,
    pub analysis: Analysis,
    pub source: RecordSource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: u64,
    pub name: String,
    pub comment: String,
    #[serde(flatten)]
    pub analysis: Analysis,
    pub timestamp: String,
    pub source: RecordSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EmotionStat {
    pub average_score: f64,
    pub total_occurrences: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub emotion_stats: BTreeMap<Emotion, EmotionStat>,
    pub dominant_distribution: BTreeMap<String, u64>,
    pub total_analyses: u64,
}

#[derive(Debug, Default, Clone, Copy)]
struct RunningMean {
    count: u64,
    mean: f64,
}

impl RunningMean {
    fn push(&mut self, x: f64) {
        self.count += 1;
        self.mean += (x - self.mean) / self.count as f64;
    }
}

#[derive(Debug, Default)]
struct Inner {
    entries: Vec<HistoryEntry>,
    next_id: u64,
    means: [RunningMean; 3],
    dominant_counts: BTreeMap<String, u64>,
    total: u64,
}

#[derive(Debug)]
pub struct HistoryStore {
    inner: Mutex<Inner>,
    cap: usize,
}

impl HistoryStore {
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.clamp(1, MAX_CAPACITY);
        Self {
            inner: Mutex::new(Inner {
                entries: Vec::with_capacity(cap.min(10_000)),
                next_id: 1,
                ..Inner::default()
            }),
            cap,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a record and fold it into the running statistics. Returns the
    /// stored entry (with id and timestamp).
    pub fn append(&self, rec: NewRecord) -> HistoryEntry {
        let mut inner = self.lock();

        let id = inner.next_id;
        inner.next_id += 1;

        for (e, score) in rec.analysis.scores.iter() {
            inner.means[e as usize].push(score);
        }
        *inner
            .dominant_counts
            .entry(rec.analysis.dominant_emotion.clone())
            .or_insert(0) += 1;
        inner.total += 1;

        let entry = HistoryEntry {
            id,
            name: rec.name,
            comment: rec.comment,
            analysis: rec.analysis,
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            source: rec.source,
        };
        inner.entries.push(entry.clone());
        if inner.entries.len() > self.cap {
            let excess = inner.entries.len() - self.cap;
            inner.entries.drain(0..excess);
        }
        entry
    }

    pub fn get(&self, id: u64) -> Option<HistoryEntry> {
        let inner = self.lock();
        // ids are increasing, so the log is sorted by id
        inner
            .entries
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|i| inner.entries[i].clone())
    }

    pub fn snapshot(&self) -> Vec<HistoryEntry> {
        self.lock().entries.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all records and statistics; ids restart at 1.
    pub fn clear(&self) {
        let mut inner = self.lock();
        *inner = Inner {
            next_id: 1,
            ..Inner::default()
        };
    }

    pub fn statistics(&self) -> Statistics {
        let inner = self.lock();
        let emotion_stats = Emotion::ALL
            .into_iter()
            .filter_map(|e| {
                let m = inner.means[e as usize];
                (m.count > 0).then(|| {
                    (
                        e,
                        EmotionStat {
                            average_score: (m.mean * 100.0).round() / 100.0,
                            total_occurrences: m.count,
                        },
                    )
                })
            })
            .collect();
        Statistics {
            emotion_stats,
            dominant_distribution: inner.dominant_counts.clone(),
            total_analyses: inner.total,
        }
    }
}
