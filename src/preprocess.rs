// src/preprocess.rs
//! Text preprocessing: cleaning, tokenization, stopword removal and a small
//! rule-based suffix stripper for Indonesian.
//!
//! Every step is total. The tokenizer keeps every non-blank character, so
//! emoji and typographic quotes survive as tokens of their own, and the
//! stemmer leaves a token alone when stripping would make it too short.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "saya", "aku", "kami", "kamu", "anda", "dia", "kita", "mereka", "yang", "dan", "di",
        "ke", "dari", "untuk", "pada", "ini", "itu", "adalah", "ada", "tidak", "nya", "atau",
        "dengan", "sebuah", "sebagai", "dalam", "oleh", "karena", "agar", "sehingga", "juga",
        "sudah", "belum", "masih",
    ]
    .into_iter()
    .collect()
});

/// Ordered suffix list; among matches the longest wins, ties keep list order.
const SUFFIXES: &[&str] = &["lah", "kah", "nya", "ku", "mu", "kan", "i", "an"];
const MIN_STEM_CHARS: usize = 3;
const STEM_PASSES: usize = 2;

/// All four intermediate artifacts of [`Preprocessor::preprocessing_steps`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreprocessingTrace {
    pub cleaned: String,
    pub tokens: Vec<String>,
    pub without_stopwords: Vec<String>,
    pub stems: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Lowercase and strip punctuation. Empty input yields an empty string.
    pub fn clean(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        text.to_lowercase()
            .chars()
            .filter(|c| !c.is_ascii_punctuation())
            .collect()
    }

    /// Split on whitespace, then split each chunk into runs of word
    /// characters; any other character becomes a token by itself.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let mut out = Vec::new();
        for chunk in text.split_whitespace() {
            let mut word = String::new();
            for c in chunk.chars() {
                if is_word_char(c) {
                    word.push(c);
                    continue;
                }
                if !word.is_empty() {
                    out.push(std::mem::take(&mut word));
                }
                out.push(c.to_string());
            }
            if !word.is_empty() {
                out.push(word);
            }
        }
        out
    }

    /// Drop stopwords (case-insensitive); everything else keeps order and case.
    pub fn remove_stopwords(&self, tokens: &[String]) -> Vec<String> {
        tokens
            .iter()
            .filter(|t| !STOPWORDS.contains(t.to_lowercase().as_str()))
            .cloned()
            .collect()
    }

    pub fn stem(&self, tokens: &[String]) -> Vec<String> {
        tokens.iter().map(|t| stem_word(t)).collect()
    }

    /// clean → tokenize → remove_stopwords → stem, with every stage kept.
    pub fn preprocessing_steps(&self, text: &str) -> PreprocessingTrace {
        let cleaned = self.clean(text);
        let tokens = self.tokenize(&cleaned);
        let without_stopwords = self.remove_stopwords(&tokens);
        let stems = self.stem(&without_stopwords);
        PreprocessingTrace {
            cleaned,
            tokens,
            without_stopwords,
            stems,
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Lowercase `word` and strip up to two suffixes.
pub fn stem_word(word: &str) -> String {
    let mut lowered = word.to_lowercase();
    for _ in 0..STEM_PASSES {
        let Some(suffix) = longest_suffix(&lowered) else {
            break;
        };
        let remaining = lowered.chars().count() - suffix.chars().count();
        if remaining < MIN_STEM_CHARS {
            break;
        }
        lowered.truncate(lowered.len() - suffix.len());
    }
    lowered
}

fn longest_suffix(word: &str) -> Option<&'static str> {
    SUFFIXES
        .iter()
        .copied()
        .filter(|s| word.ends_with(s))
        .fold(None, |best: Option<&'static str>, s| match best {
            Some(b) if b.len() >= s.len() => Some(b),
            _ => Some(s),
        })
}
