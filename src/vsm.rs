//! # Vector Scorer
//! Vector-space similarity between a comment and the three emotion lexicons.
//!
//! The corpus for every call is `[comment, happy, sad, angry]`. Terms are
//! weighted with raw term counts times a smoothed IDF
//! (`ln((1 + n) / (1 + df)) + 1`), rows are L2-normalized and compared with
//! cosine similarity. Lexicon term counts never change, so they are counted
//! once in [`VectorScorer::new`]; document frequencies still include the
//! comment, which keeps the weighting identical to refitting the whole corpus.
//!
//! Similarities are turned into a percentage split that sums to 100. Empty
//! input, zero overlap and any vectorization failure all end in the uniform
//! 33.33 split; [`VectorScorer::score`] never fails.

use metrics::counter;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, warn};

use crate::lexicon::Emotion;
use crate::metrics::FALLBACK_TOTAL;
use crate::preprocess::Preprocessor;

/// Token pattern of the vectorizer: two or more word characters.
const TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

/// Number of documents in the per-request corpus (comment + three lexicons).
const CORPUS_DOCS: f64 = 4.0;

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("token pattern failed to compile: {0}")]
    TokenPattern(String),

    #[error("empty vocabulary")]
    EmptyVocabulary,

    #[error("non-finite similarity for {0}")]
    NonFinite(Emotion),
}

/// Percentage split over the three emotions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreVector {
    pub happy: f64,
    pub sad: f64,
    pub angry: f64,
}

impl ScoreVector {
    /// Share assigned to each emotion by the fallback split.
    pub const UNIFORM_SHARE: f64 = 33.33;

    pub fn uniform() -> Self {
        Self {
            happy: Self::UNIFORM_SHARE,
            sad: Self::UNIFORM_SHARE,
            angry: Self::UNIFORM_SHARE,
        }
    }

    pub fn get(&self, emotion: Emotion) -> f64 {
        match emotion {
            Emotion::Happy => self.happy,
            Emotion::Sad => self.sad,
            Emotion::Angry => self.angry,
        }
    }

    /// `(emotion, score)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Emotion, f64)> + '_ {
        Emotion::ALL.into_iter().map(move |e| (e, self.get(e)))
    }

    pub fn total(&self) -> f64 {
        self.happy + self.sad + self.angry
    }

    fn from_fn(mut f: impl FnMut(Emotion) -> f64) -> Self {
        Self {
            happy: f(Emotion::Happy),
            sad: f(Emotion::Sad),
            angry: f(Emotion::Angry),
        }
    }
}

type TermCounts = HashMap<String, u32>;

/// Stateless scorer; safe to share across threads.
#[derive(Debug)]
pub struct VectorScorer {
    preprocessor: Preprocessor,
    token_re: Result<Regex, regex::Error>,
    lexicon_counts: [TermCounts; 3],
}

impl Default for VectorScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl VectorScorer {
    pub fn new() -> Self {
        let token_re = Regex::new(TOKEN_PATTERN);
        let lexicon_counts = Emotion::ALL.map(|e| match &token_re {
            Ok(re) => term_counts(re, &e.document()),
            Err(_) => TermCounts::new(),
        });
        Self {
            preprocessor: Preprocessor::new(),
            token_re,
            lexicon_counts,
        }
    }

    /// Score `comment` against the lexicons. Total over every input string.
    pub fn score(&self, comment: &str) -> ScoreVector {
        let cleaned = self.preprocessor.clean(comment);
        if cleaned.trim().is_empty() {
            counter!(FALLBACK_TOTAL, "reason" => "empty_input").increment(1);
            return ScoreVector::uniform();
        }

        let sims = match self.similarities(&cleaned) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "vector scoring failed, using uniform split");
                counter!(FALLBACK_TOTAL, "reason" => "vectorization").increment(1);
                return ScoreVector::uniform();
            }
        };

        let total: f64 = sims.iter().sum();
        if total <= 0.0 {
            debug!("no lexicon overlap, using uniform split");
            counter!(FALLBACK_TOTAL, "reason" => "no_overlap").increment(1);
            return ScoreVector::uniform();
        }

        ScoreVector::from_fn(|e| round2(sims[e as usize] / total * 100.0))
    }

    /// Raw cosine similarities `[happy, sad, angry]` of an already cleaned
    /// comment, each in `[0, 1]`.
    pub fn similarities(&self, cleaned: &str) -> Result<[f64; 3], ScoreError> {
        let re = self
            .token_re
            .as_ref()
            .map_err(|e| ScoreError::TokenPattern(e.to_string()))?;
        let comment = term_counts(re, cleaned);

        let vocabulary: HashSet<&str> = comment
            .keys()
            .chain(self.lexicon_counts.iter().flat_map(|c| c.keys()))
            .map(String::as_str)
            .collect();
        if vocabulary.is_empty() {
            return Err(ScoreError::EmptyVocabulary);
        }

        let idf: HashMap<&str, f64> = vocabulary
            .into_iter()
            .map(|term| {
                let df = u32::from(comment.contains_key(term))
                    + self
                        .lexicon_counts
                        .iter()
                        .map(|c| u32::from(c.contains_key(term)))
                        .sum::<u32>();
                let idf = ((1.0 + CORPUS_DOCS) / (1.0 + f64::from(df))).ln() + 1.0;
                (term, idf)
            })
            .collect();

        let comment_vec = normalized_weights(&comment, &idf);
        let mut out = [0.0; 3];
        for e in Emotion::ALL {
            let lexicon_vec = normalized_weights(&self.lexicon_counts[e as usize], &idf);
            let sim = cosine(&comment_vec, &lexicon_vec);
            if !sim.is_finite() {
                return Err(ScoreError::NonFinite(e));
            }
            out[e as usize] = sim.clamp(0.0, 1.0);
        }
        Ok(out)
    }
}

fn term_counts(re: &Regex, text: &str) -> TermCounts {
    let mut counts = TermCounts::new();
    for m in re.find_iter(text) {
        *counts.entry(m.as_str().to_lowercase()).or_insert(0) += 1;
    }
    counts
}

/// TF-IDF weights scaled to unit L2 norm. An all-zero row stays empty.
fn normalized_weights<'a>(counts: &'a TermCounts, idf: &HashMap<&str, f64>) -> HashMap<&'a str, f64> {
    let raw: HashMap<&str, f64> = counts
        .iter()
        .map(|(t, &c)| {
            let w = f64::from(c) * idf.get(t.as_str()).copied().unwrap_or(0.0);
            (t.as_str(), w)
        })
        .collect();
    let norm = raw.values().map(|w| w * w).sum::<f64>().sqrt();
    if norm == 0.0 {
        return HashMap::new();
    }
    raw.into_iter().map(|(t, w)| (t, w / norm)).collect()
}

/// Dot product of two unit vectors. No shared term gives `+0.0`
/// (`Iterator::sum` over nothing is `-0.0` for floats).
fn cosine<'a>(a: &HashMap<&'a str, f64>, b: &HashMap<&'a str, f64>) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .filter_map(|(t, w)| large.get(*t).map(|v| w * v))
        .fold(0.0, |acc, x| acc + x)
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
