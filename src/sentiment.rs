//! # Keyword sentiment
//! Coarse Positive / Negative / Neutral tagging for news headlines.
//!
//! The keyword table (English and Vietnamese terms) is embedded at build time
//! and flattened once into `(keyword, polarity)` pairs. Matching is
//! case-insensitive substring containment; each distinct keyword counts at
//! most once, however often it repeats in the text. Ties, including 0/0, are
//! Neutral.

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::model::Sentiment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
}

#[derive(Deserialize)]
struct KeywordFile {
    positive: Vec<String>,
    negative: Vec<String>,
}

static KEYWORDS: Lazy<Vec<(String, Polarity)>> = Lazy::new(|| {
    let raw = include_str!("../sentiment_keywords.json");
    let file: KeywordFile = serde_json::from_str(raw).expect("valid sentiment keyword list");
    let pos = file
        .positive
        .into_iter()
        .map(|k| (k.to_lowercase(), Polarity::Positive));
    let neg = file
        .negative
        .into_iter()
        .map(|k| (k.to_lowercase(), Polarity::Negative));
    pos.chain(neg).collect()
});

/// The flattened keyword table.
pub fn keywords() -> &'static [(String, Polarity)] {
    KEYWORDS.as_slice()
}

/// Returns `(positive_score, negative_score)` for already-lowercased text.
fn score(text: &str) -> (usize, usize) {
    let mut pos = 0usize;
    let mut neg = 0usize;
    for (kw, polarity) in keywords() {
        if text.contains(kw.as_str()) {
            match polarity {
                Polarity::Positive => pos += 1,
                Polarity::Negative => neg += 1,
            }
        }
    }
    (pos, neg)
}

/// Classify a headline plus optional description.
pub fn classify(title: &str, description: Option<&str>) -> Sentiment {
    let text = format!("{} {}", title, description.unwrap_or_default()).to_lowercase();
    let (pos, neg) = score(&text);
    if pos > neg {
        Sentiment::POSITIVE
    } else if neg > pos {
        Sentiment::NEGATIVE
    } else {
        Sentiment::NEUTRAL
    }
}
