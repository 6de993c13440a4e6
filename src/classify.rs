//! # Emotion Classifier
//! Pure mapping `ScoreVector` → dominant emotion + intensity band.
//! No I/O, suitable for unit tests and offline evaluation.
//!
//! Policy: the highest score wins; ties go to the earlier emotion in the
//! canonical order happy > sad > angry. Intensity is banded from the
//! dominant score in steps of 20 percentage points.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::lexicon::Emotion;
use crate::vsm::ScoreVector;

/// Ordinal intensity band of the dominant score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    #[serde(rename = "very low")]
    VeryLow,
    Low,
    Medium,
    High,
    #[serde(rename = "very high")]
    VeryHigh,
}

impl Intensity {
    pub fn as_str(self) -> &'static str {
        match self {
            Intensity::VeryLow => "very low",
            Intensity::Low => "low",
            Intensity::Medium => "medium",
            Intensity::High => "high",
            Intensity::VeryHigh => "very high",
        }
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dominant emotion and its intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub dominant: Emotion,
    pub intensity: Intensity,
}

impl Classification {
    /// Display-cased dominant label (`Happy`, `Sad`, `Angry`).
    pub fn label(&self) -> &'static str {
        self.dominant.display_label()
    }
}

/// Argmax over `scores` with the happy > sad > angry tie-break.
pub fn dominant(scores: &ScoreVector) -> Emotion {
    let mut best = Emotion::Happy;
    let mut best_score = scores.get(best);
    for (e, s) in scores.iter().skip(1) {
        // strict: an equal score never displaces an earlier emotion
        if s > best_score {
            best = e;
            best_score = s;
        }
    }
    best
}

/// Band a percentage: ≥80 very high, ≥60 high, ≥40 medium, ≥20 low, else very low.
pub fn intensity(score: f64) -> Intensity {
    if score >= 80.0 {
        Intensity::VeryHigh
    } else if score >= 60.0 {
        Intensity::High
    } else if score >= 40.0 {
        Intensity::Medium
    } else if score >= 20.0 {
        Intensity::Low
    } else {
        Intensity::VeryLow
    }
}

pub fn classify(scores: &ScoreVector) -> Classification {
    let dominant = dominant(scores);
    Classification {
        dominant,
        intensity: intensity(scores.get(dominant)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sv(happy: f64, sad: f64, angry: f64) -> ScoreVector {
        ScoreVector { happy, sad, angry }
    }

    #[test]
    fn intensity_boundaries() {
        assert_eq!(intensity(100.0), Intensity::VeryHigh);
        assert_eq!(intensity(80.0), Intensity::VeryHigh);
        assert_eq!(intensity(79.99), Intensity::High);
        assert_eq!(intensity(60.0), Intensity::High);
        assert_eq!(intensity(59.99), Intensity::Medium);
        assert_eq!(intensity(40.0), Intensity::Medium);
        assert_eq!(intensity(39.99), Intensity::Low);
        assert_eq!(intensity(20.0), Intensity::Low);
        assert_eq!(intensity(19.99), Intensity::VeryLow);
        assert_eq!(intensity(0.0), Intensity::VeryLow);
    }

    #[test]
    fn intensity_labels() {
        assert_eq!(Intensity::VeryHigh.to_string(), "very high");
        assert_eq!(
            serde_json::to_string(&Intensity::VeryLow).unwrap(),
            "\"very low\""
        );
        assert_eq!(serde_json::to_string(&Intensity::Medium).unwrap(), "\"medium\"");
    }

    #[test]
    fn dominant_picks_maximum() {
        assert_eq!(dominant(&sv(10.0, 20.0, 70.0)), Emotion::Angry);
        assert_eq!(dominant(&sv(10.0, 70.0, 20.0)), Emotion::Sad);
        assert_eq!(dominant(&sv(70.0, 10.0, 20.0)), Emotion::Happy);
    }

    #[test]
    fn ties_follow_canonical_order() {
        assert_eq!(dominant(&ScoreVector::uniform()), Emotion::Happy);
        assert_eq!(dominant(&sv(0.0, 50.0, 50.0)), Emotion::Sad);
        assert_eq!(dominant(&sv(50.0, 0.0, 50.0)), Emotion::Happy);
    }

    #[test]
    fn classify_uses_dominant_score() {
        let c = classify(&sv(12.5, 25.0, 62.5));
        assert_eq!(c.dominant, Emotion::Angry);
        assert_eq!(c.intensity, Intensity::High);
        assert_eq!(c.label(), "Angry");

        let fallback = classify(&ScoreVector::uniform());
        assert_eq!(fallback.label(), "Happy");
        assert_eq!(fallback.intensity, Intensity::Low);
    }
}
