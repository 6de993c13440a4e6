//! # Lexicon Store
//! Three static word lists (happy / sad / angry) used as reference "documents"
//! by the vector scorer. Process-wide and read-only.
//!
//! Word lists are kept verbatim, including repeated entries (`jengkel`,
//! `kesal`) and multi-word phrases: repetitions raise the term count of the
//! lexicon document and phrases contribute every word they contain.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed label space of the scorer.
///
/// Declaration order is the canonical order: it drives serialization of score
/// maps and the dominant-label tie-break (happy > sad > angry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
}

impl Emotion {
    /// All emotions in canonical order.
    pub const ALL: [Emotion; 3] = [Emotion::Happy, Emotion::Sad, Emotion::Angry];

    /// Canonical lowercase key (`happy`, `sad`, `angry`).
    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
        }
    }

    /// Display form with a capitalized first letter (`Happy`, ...).
    pub fn display_label(self) -> &'static str {
        match self {
            Emotion::Happy => "Happy",
            Emotion::Sad => "Sad",
            Emotion::Angry => "Angry",
        }
    }

    /// Inverse of [`Emotion::as_str`] / [`Emotion::display_label`], case-insensitive.
    pub fn from_key(key: &str) -> Option<Emotion> {
        let k = key.trim();
        Emotion::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(k))
    }

    /// The lexicon words for this emotion.
    pub fn words(self) -> &'static [&'static str] {
        match self {
            Emotion::Happy => HAPPY_WORDS,
            Emotion::Sad => SAD_WORDS,
            Emotion::Angry => ANGRY_WORDS,
        }
    }

    /// Lexicon as a single space-joined document.
    pub fn document(self) -> String {
        self.words().join(" ")
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_label())
    }
}

pub const HAPPY_WORDS: &[&str] = &[
    "senang",
    "bahagia",
    "puas",
    "gembira",
    "optimis",
    "positif",
    "mantap",
    "bagus",
    "baik",
    "lega",
    "nyaman",
    "tenang",
    "bangga",
    "sukses",
    "hebat",
    "keren",
    "memuaskan",
    "menyenangkan",
    "fantastis",
    "luar biasa",
    "cinta",
    "suka",
    "antusias",
    "semangat",
    "percaya diri",
    "puas hati",
    "gembira ria",
];

pub const SAD_WORDS: &[&str] = &[
    "sedih",
    "kecewa",
    "frustasi",
    "bingung",
    "takut",
    "khawatir",
    "stress",
    "tekanan",
    "sulit",
    "berat",
    "rumit",
    "pelik",
    "masalah",
    "kendala",
    "hambatan",
    "kesulitan",
    "kesusahan",
    "ketakutan",
    "kekhawatiran",
    "galau",
    "resah",
    "gelisah",
    "putus asa",
    "pesimis",
    "murung",
    "frustrasi",
];

pub const ANGRY_WORDS: &[&str] = &[
    "marah",
    "kesal",
    "jengkel",
    "benci",
    "sebal",
    "geram",
    "frustasi",
    "tidak adil",
    "bosan",
    "gemas",
    "dongkol",
    "berang",
    "jengkel",
    "kesal",
    "menjengkelkan",
    "mengesalkan",
    "memuakkan",
    "menyebalkan",
    "kesumat",
    "dendam",
    "jengkel hati",
    "marah besar",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_three_non_empty_lexicons() {
        assert_eq!(Emotion::ALL.len(), 3);
        for e in Emotion::ALL {
            assert!(!e.words().is_empty(), "{e} lexicon must not be empty");
            assert!(e.words().iter().all(|w| !w.trim().is_empty()));
        }
    }

    #[test]
    fn document_is_space_joined() {
        let doc = Emotion::Happy.document();
        assert!(doc.starts_with("senang bahagia puas"));
        assert!(doc.contains("luar biasa"));
        assert_eq!(doc.split(' ').count(), 31);
    }

    #[test]
    fn keys_and_labels_round_trip() {
        for e in Emotion::ALL {
            assert_eq!(Emotion::from_key(e.as_str()), Some(e));
            assert_eq!(Emotion::from_key(e.display_label()), Some(e));
        }
        assert_eq!(Emotion::from_key("netral"), None);
        assert_eq!(Emotion::Sad.to_string(), "Sad");
    }
}
