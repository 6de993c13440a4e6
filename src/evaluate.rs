// src/evaluate.rs
//! # Metrics Evaluator
//! Maps free-form true labels (English or Indonesian) onto the three-class
//! space and scores predictions with per-class precision / recall / F1.
//!
//! Label resolution order:
//! 1. exact (trimmed, lowercased) match against the synonym table,
//! 2. substring fallback: the first table key contained in the raw label,
//! 3. otherwise unresolved (`None`).
//!
//! Neutral keys (`neutral`, `netral`) resolve to `None` as well, so such
//! samples never reach the report. Zero divisions yield 0 instead of failing.

use serde::Serialize;

use crate::lexicon::Emotion;

/// Ordered synonym table. Order matters for the substring fallback.
const LABEL_SYNONYMS: &[(&str, Option<Emotion>)] = &[
    ("senang", Some(Emotion::Happy)),
    ("sedih", Some(Emotion::Sad)),
    ("marah", Some(Emotion::Angry)),
    ("happy", Some(Emotion::Happy)),
    ("sad", Some(Emotion::Sad)),
    ("angry", Some(Emotion::Angry)),
    ("positive", Some(Emotion::Happy)),
    ("pos", Some(Emotion::Happy)),
    ("negative", Some(Emotion::Sad)),
    ("neg", Some(Emotion::Sad)),
    ("neutral", None),
    ("netral", None),
    ("bahagia", Some(Emotion::Happy)),
    ("gembira", Some(Emotion::Happy)),
    ("kecewa", Some(Emotion::Sad)),
    ("kesal", Some(Emotion::Angry)),
    ("jengkel", Some(Emotion::Angry)),
];

/// Resolve a raw label into the three-class space.
pub fn normalize_label(raw: &str) -> Option<Emotion> {
    let s = raw.trim().to_lowercase();
    if s.is_empty() {
        return None;
    }
    if let Some((_, mapped)) = LABEL_SYNONYMS.iter().find(|(k, _)| *k == s) {
        return *mapped;
    }
    LABEL_SYNONYMS
        .iter()
        .find(|(k, _)| s.contains(*k))
        .and_then(|(_, mapped)| *mapped)
}

/// One `(true, predicted)` pair, both already in the three-class space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationSample {
    pub truth: Emotion,
    pub predicted: Emotion,
}

impl EvaluationSample {
    /// Build a sample from a raw true label and a predicted label (display or
    /// canonical form). Returns `None` when either side does not resolve.
    pub fn resolve(raw_truth: &str, predicted: &str) -> Option<Self> {
        let truth = normalize_label(raw_truth)?;
        let predicted = Emotion::from_key(predicted)?;
        Some(Self { truth, predicted })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ClassScores {
    pub precision: f64,
    pub recall: f64,
    #[serde(rename = "f1-score")]
    pub f1: f64,
    pub support: usize,
}

/// Per-class rows plus accuracy and averaged rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub happy: ClassScores,
    pub sad: ClassScores,
    pub angry: ClassScores,
    pub accuracy: f64,
    #[serde(rename = "macro avg")]
    pub macro_avg: ClassScores,
    #[serde(rename = "weighted avg")]
    pub weighted_avg: ClassScores,
}

impl ClassificationReport {
    pub fn class(&self, emotion: Emotion) -> &ClassScores {
        match emotion {
            Emotion::Happy => &self.happy,
            Emotion::Sad => &self.sad,
            Emotion::Angry => &self.angry,
        }
    }
}

/// Score `samples`. Returns `None` for an empty sample set.
pub fn evaluate(samples: &[EvaluationSample]) -> Option<ClassificationReport> {
    if samples.is_empty() {
        return None;
    }

    let rows = Emotion::ALL.map(|e| class_scores(samples, e));
    let total = samples.len();
    let correct = samples.iter().filter(|s| s.truth == s.predicted).count();

    let n_classes = rows.len() as f64;
    let macro_avg = ClassScores {
        precision: rows.iter().map(|r| r.precision).sum::<f64>() / n_classes,
        recall: rows.iter().map(|r| r.recall).sum::<f64>() / n_classes,
        f1: rows.iter().map(|r| r.f1).sum::<f64>() / n_classes,
        support: total,
    };

    let weighted = |f: fn(&ClassScores) -> f64| {
        ratio(
            rows.iter().map(|r| f(r) * r.support as f64).sum::<f64>(),
            total as f64,
        )
    };
    let weighted_avg = ClassScores {
        precision: weighted(|r| r.precision),
        recall: weighted(|r| r.recall),
        f1: weighted(|r| r.f1),
        support: total,
    };

    let [happy, sad, angry] = rows;
    Some(ClassificationReport {
        happy,
        sad,
        angry,
        accuracy: ratio(correct as f64, total as f64),
        macro_avg,
        weighted_avg,
    })
}

fn class_scores(samples: &[EvaluationSample], class: Emotion) -> ClassScores {
    let tp = samples
        .iter()
        .filter(|s| s.truth == class && s.predicted == class)
        .count();
    let predicted = samples.iter().filter(|s| s.predicted == class).count();
    let support = samples.iter().filter(|s| s.truth == class).count();

    let precision = ratio(tp as f64, predicted as f64);
    let recall = ratio(tp as f64, support as f64);
    let f1 = ratio(2.0 * precision * recall, precision + recall);
    ClassScores {
        precision,
        recall,
        f1,
        support,
    }
}

fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}
