//! # Analysis pipeline
//! Composes preprocessing, vector scoring, classification and (optional)
//! evaluation for one comment or a batch of records.
//!
//! Order per comment:
//! 1) score the comment (the scorer cleans its own copy)
//! 2) classify the distribution (dominant + intensity)
//! 3) build the preprocessing trace for display
//!
//! Nothing here touches shared state; persistence is done by the caller
//! (see `history`).

use serde::{Deserialize, Serialize};

use crate::classify::{classify, Intensity};
use crate::evaluate::{evaluate, ClassificationReport, EvaluationSample};
use crate::lexicon::Emotion;
use crate::preprocess::{PreprocessingTrace, Preprocessor};
use crate::vsm::{ScoreVector, VectorScorer};

pub const DEFAULT_NAME: &str = "Anonymous";

/// Full result for one comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub scores: ScoreVector,
    /// Display-cased dominant label (`Happy`, `Sad`, `Angry`).
    pub dominant_emotion: String,
    pub intensity: Intensity,
    pub preprocessing: PreprocessingTrace,
}

impl Analysis {
    pub fn dominant(&self) -> Option<Emotion> {
        Emotion::from_key(&self.dominant_emotion)
    }
}

/// One input row of a batch. `true_label` and `label` may both be present;
/// see [`BatchRecord::truth`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchRecord {
    pub comment: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub true_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub split: Option<String>,
}

impl BatchRecord {
    pub fn truth(&self) -> Option<&str> {
        truth_label(self.true_label.as_deref(), self.label.as_deref())
    }
}

/// `true_label` unless missing or blank, otherwise `label`.
pub fn truth_label<'a>(true_label: Option<&'a str>, label: Option<&'a str>) -> Option<&'a str> {
    true_label.filter(|s| !s.trim().is_empty()).or(label)
}

/// One scored row of a batch; `row_number` is 1-based over the input.
#[derive(Debug, Clone, Serialize)]
pub struct BatchRow {
    pub row_number: usize,
    pub name: String,
    pub comment: String,
    #[serde(flatten)]
    pub analysis: Analysis,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SplitCounts {
    pub train: usize,
    pub test: usize,
    pub unknown: usize,
    pub total_rows: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub total_rows: usize,
    pub total_processed: usize,
    pub rows: Vec<BatchRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ClassificationReport>,
    pub split_counts: SplitCounts,
}

const TRAIN_KEYWORDS: &[&str] = &["train", "training", "latih", "trainset"];
const TEST_KEYWORDS: &[&str] = &["test", "testing", "uji", "testset"];
const DEFAULT_TEST_PERCENT: usize = 20;

/// Stateless analyzer; one instance is shared by all requests.
#[derive(Debug, Default)]
pub struct EmotionAnalyzer {
    preprocessor: Preprocessor,
    scorer: VectorScorer,
}

impl EmotionAnalyzer {
    pub fn new() -> Self {
        Self {
            preprocessor: Preprocessor::new(),
            scorer: VectorScorer::new(),
        }
    }

    pub fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    pub fn scorer(&self) -> &VectorScorer {
        &self.scorer
    }

    pub fn analyze(&self, comment: &str) -> Analysis {
        let scores = self.scorer.score(comment);
        let class = classify(&scores);
        Analysis {
            scores,
            dominant_emotion: class.label().to_string(),
            intensity: class.intensity,
            preprocessing: self.preprocessor.preprocessing_steps(comment),
        }
    }

    /// Analyze and, if `true_label` resolves, evaluate the single prediction.
    pub fn analyze_labeled(
        &self,
        comment: &str,
        true_label: Option<&str>,
    ) -> (Analysis, Option<ClassificationReport>) {
        let analysis = self.analyze(comment);
        let metrics = true_label
            .and_then(|raw| EvaluationSample::resolve(raw, &analysis.dominant_emotion))
            .and_then(|sample| evaluate(&[sample]));
        (analysis, metrics)
    }

    /// Analyze every record with a non-blank comment, preserving input order.
    /// `split_column` marks the input as carrying split tags even when every
    /// tag is blank (see [`split_counts`]).
    pub fn analyze_batch(&self, records: &[BatchRecord], split_column: bool) -> BatchOutcome {
        let mut rows = Vec::with_capacity(records.len());
        let mut samples = Vec::new();

        for (index, rec) in records.iter().enumerate() {
            let comment = rec.comment.trim();
            if comment.is_empty() {
                continue;
            }
            let analysis = self.analyze(comment);
            if let Some(sample) = rec
                .truth()
                .and_then(|raw| EvaluationSample::resolve(raw, &analysis.dominant_emotion))
            {
                samples.push(sample);
            }
            rows.push(BatchRow {
                row_number: index + 1,
                name: display_name(rec.name.as_deref()),
                comment: comment.to_string(),
                analysis,
            });
        }

        BatchOutcome {
            total_rows: records.len(),
            total_processed: rows.len(),
            rows,
            metrics: evaluate(&samples),
            split_counts: split_counts(records, split_column),
        }
    }
}

/// Trimmed name, or [`DEFAULT_NAME`] when missing/blank.
pub fn display_name(name: Option<&str>) -> String {
    match name.map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => DEFAULT_NAME.to_string(),
    }
}

/// Whether any record carries a split tag at all (blank tags included).
pub fn has_split_tags(records: &[BatchRecord]) -> bool {
    records.iter().any(|r| r.split.is_some())
}

/// Train/test counts from split tags, or a default 80/20 partition when the
/// input has no split column and no record carries a tag. With a split
/// column, blank or unrecognized tags count as unknown.
pub fn split_counts(records: &[BatchRecord], split_column: bool) -> SplitCounts {
    let total_rows = records.len();
    let tagged = split_column
        || records
            .iter()
            .any(|r| r.split.as_deref().is_some_and(|s| !s.trim().is_empty()));

    if !tagged {
        let test = if total_rows <= 1 {
            0
        } else {
            (total_rows * DEFAULT_TEST_PERCENT).div_ceil(100)
        };
        return SplitCounts {
            train: total_rows - test,
            test,
            unknown: 0,
            total_rows,
        };
    }

    let mut counts = SplitCounts {
        total_rows,
        ..SplitCounts::default()
    };
    for r in records {
        let tag = r.split.as_deref().unwrap_or_default().trim().to_lowercase();
        if matches_any(&tag, TRAIN_KEYWORDS) {
            counts.train += 1;
        } else if matches_any(&tag, TEST_KEYWORDS) {
            counts.test += 1;
        } else {
            counts.unknown += 1;
        }
    }
    counts
}

fn matches_any(tag: &str, keywords: &[&str]) -> bool {
    !tag.is_empty() && keywords.iter().any(|k| tag == *k || tag.contains(*k))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(comment: &str, label: Option<&str>) -> BatchRecord {
        BatchRecord {
            comment: comment.to_string(),
            label: label.map(str::to_string),
            ..BatchRecord::default()
        }
    }

    #[test]
    fn analyze_happy_comment() {
        let a = EmotionAnalyzer::new();
        let out = a.analyze("Saya sangat senang dan bangga!");
        assert_eq!(out.dominant_emotion, "Happy");
        assert_eq!(out.dominant(), Some(Emotion::Happy));
        assert_eq!(out.intensity, Intensity::VeryHigh);
        assert_eq!(out.preprocessing.cleaned, "saya sangat senang dan bangga");
    }

    #[test]
    fn analyze_empty_comment_is_uniform() {
        let a = EmotionAnalyzer::new();
        let out = a.analyze("");
        assert_eq!(out.scores, ScoreVector::uniform());
        assert_eq!(out.dominant_emotion, "Happy");
        assert!(out.preprocessing.tokens.is_empty());
    }

    #[test]
    fn labeled_analysis_reports_metrics() {
        let a = EmotionAnalyzer::new();
        let (out, metrics) = a.analyze_labeled("aku marah dan kesal", Some("marah"));
        assert_eq!(out.dominant_emotion, "Angry");
        let m = metrics.expect("metrics for resolvable label");
        assert_eq!(m.angry.precision, 1.0);
        assert_eq!(m.accuracy, 1.0);

        let (_, none) = a.analyze_labeled("aku marah", Some("netral"));
        assert!(none.is_none());
        let (_, none) = a.analyze_labeled("aku marah", None);
        assert!(none.is_none());
    }

    #[test]
    fn batch_skips_blank_rows_and_keeps_order() {
        let a = EmotionAnalyzer::new();
        let records = vec![
            rec("senang sekali", Some("happy")),
            rec("   ", Some("sad")),
            rec("sedih dan kecewa", Some("sad")),
            rec("marah besar", Some("xyz")),
        ];
        let out = a.analyze_batch(&records, false);
        assert_eq!(out.total_rows, 4);
        assert_eq!(out.total_processed, 3);
        let numbers: Vec<usize> = out.rows.iter().map(|r| r.row_number).collect();
        assert_eq!(numbers, vec![1, 3, 4]);
        assert_eq!(out.rows[0].name, DEFAULT_NAME);

        let m = out.metrics.expect("two resolvable pairs");
        assert_eq!(m.macro_avg.support, 2);
        assert_eq!(m.accuracy, 1.0);
    }

    #[test]
    fn batch_without_labels_has_no_metrics() {
        let a = EmotionAnalyzer::new();
        let out = a.analyze_batch(&[rec("senang", None)], false);
        assert!(out.metrics.is_none());
    }

    #[test]
    fn default_split_is_80_20() {
        let records: Vec<BatchRecord> = (0..10).map(|_| rec("x", None)).collect();
        let c = split_counts(&records, false);
        assert_eq!((c.train, c.test, c.unknown, c.total_rows), (8, 2, 0, 10));

        let c = split_counts(&records[..7], false);
        assert_eq!((c.train, c.test), (5, 2));

        let c = split_counts(&records[..1], false);
        assert_eq!((c.train, c.test), (1, 0));
    }

    #[test]
    fn tagged_split_counts_keywords() {
        let mut records = vec![rec("a", None), rec("b", None), rec("c", None), rec("d", None)];
        records[0].split = Some("Train".into());
        records[1].split = Some("data uji".into());
        records[2].split = Some("validation".into());
        let c = split_counts(&records, false);
        assert_eq!((c.train, c.test, c.unknown, c.total_rows), (1, 1, 2, 4));
    }

    #[test]
    fn blank_split_column_counts_rows_as_unknown() {
        let mut records = vec![rec("a", None), rec("b", None), rec("c", None)];
        assert_eq!(split_counts(&records, true).unknown, 3);
        assert_eq!(split_counts(&records, true).train, 0);

        records[0].split = Some(String::new());
        assert!(has_split_tags(&records));
        let c = split_counts(&records, has_split_tags(&records));
        assert_eq!((c.train, c.test, c.unknown), (0, 0, 3));
    }

    #[test]
    fn truth_prefers_non_blank_true_label() {
        let mut r = rec("x", Some("sad"));
        assert_eq!(r.truth(), Some("sad"));
        r.true_label = Some("happy".into());
        assert_eq!(r.truth(), Some("happy"));
        r.true_label = Some("  ".into());
        assert_eq!(r.truth(), Some("sad"));
        assert_eq!(truth_label(None, None), None);
    }

    #[test]
    fn batch_uses_true_label_over_label() {
        let a = EmotionAnalyzer::new();
        let mut r = rec("senang sekali", Some("sad"));
        r.true_label = Some("happy".into());
        let m = a.analyze_batch(&[r], false).metrics.expect("metrics");
        assert_eq!(m.accuracy, 1.0);
    }

    #[test]
    fn display_name_defaults() {
        assert_eq!(display_name(None), "Anonymous");
        assert_eq!(display_name(Some("  ")), "Anonymous");
        assert_eq!(display_name(Some(" Budi ")), "Budi");
    }
}
