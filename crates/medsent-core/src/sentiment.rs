//! Binary sentiment labels and the raw-label normalizer shared by the
//! Lambda handlers and the client.
//!
//! Classifiers disagree on vocabulary (`LABEL_0`/`LABEL_1`, `pos`/`neg`,
//! `positive`/`negative`) and report the confidence of their *own* predicted
//! class. [`normalize`] folds all of these into one canonical shape whose
//! score is always the probability of the positive class.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical sentiment class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }

    pub fn is_positive(&self) -> bool {
        matches!(self, Self::Positive)
    }

    /// Index in `[negative, positive]` order, matching `LABEL_0`/`LABEL_1`.
    pub fn index(&self) -> usize {
        match self {
            Self::Negative => 0,
            Self::Positive => 1,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of normalizing a raw `(label, score)` pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalized {
    pub sentiment: Sentiment,
    /// Probability of the positive class, in `[0, 1]`.
    pub prob_positive: f64,
}

impl Normalized {
    /// Confidence in [`sentiment`](Self::sentiment) itself.
    ///
    /// Feeding `(sentiment.as_str(), confidence())` back through [`normalize`]
    /// reproduces `self`.
    pub fn confidence(&self) -> f64 {
        if self.sentiment.is_positive() {
            self.prob_positive
        } else {
            1.0 - self.prob_positive
        }
    }
}

/// Classify a raw label token as positive or negative.
///
/// `label_N` tokens (case-insensitive) are positive iff they end in `1`;
/// any other token is positive iff it contains `pos`.
pub fn classify_label(raw_label: &str) -> Sentiment {
    let label = raw_label.to_lowercase();
    let positive = if label.starts_with("label_") {
        label.ends_with('1')
    } else {
        label.contains("pos")
    };
    if positive {
        Sentiment::Positive
    } else {
        Sentiment::Negative
    }
}

/// Map a raw classifier output to the canonical label and P(positive).
///
/// `raw_score` is the classifier's confidence in `raw_label`, so it is
/// flipped to `1 - raw_score` when the label is negative.
pub fn normalize(raw_label: &str, raw_score: f64) -> Normalized {
    let sentiment = classify_label(raw_label);
    let prob_positive = if sentiment.is_positive() {
        raw_score
    } else {
        1.0 - raw_score
    };
    Normalized {
        sentiment,
        prob_positive,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn label_1_is_positive_with_raw_score() {
        let n = normalize("LABEL_1", 0.92);
        assert_eq!(n.sentiment, Sentiment::Positive);
        assert!(approx(n.prob_positive, 0.92));
    }

    #[test]
    fn label_0_is_negative_with_flipped_score() {
        let n = normalize("LABEL_0", 0.81);
        assert_eq!(n.sentiment, Sentiment::Negative);
        assert!(approx(n.prob_positive, 0.19));
    }

    #[test]
    fn label_prefix_ignores_case() {
        assert_eq!(classify_label("label_1"), Sentiment::Positive);
        assert_eq!(classify_label("Label_0"), Sentiment::Negative);
        // Only the trailing digit matters for the label_N vocabulary.
        assert_eq!(classify_label("LABEL_11"), Sentiment::Positive);
        assert_eq!(classify_label("LABEL_10"), Sentiment::Negative);
    }

    #[test]
    fn label_prefix_wins_over_pos_substring() {
        assert_eq!(classify_label("label_pos0"), Sentiment::Negative);
    }

    #[test]
    fn pos_substring_vocabularies() {
        assert_eq!(classify_label("pos"), Sentiment::Positive);
        assert_eq!(classify_label("POSITIVE"), Sentiment::Positive);
        assert_eq!(classify_label("neg"), Sentiment::Negative);
        assert_eq!(classify_label("Negative"), Sentiment::Negative);
        assert_eq!(classify_label("1"), Sentiment::Negative);
        assert_eq!(classify_label(""), Sentiment::Negative);
    }

    #[test]
    fn exotic_negative_label_containing_pos_is_misread() {
        // Known limitation of the substring heuristic.
        assert_eq!(classify_label("not_positive"), Sentiment::Positive);
    }

    #[test]
    fn normalize_is_deterministic() {
        for (label, score) in [("LABEL_0", 0.3), ("pos", 0.7), ("neg", 0.55)] {
            assert_eq!(normalize(label, score), normalize(label, score));
        }
    }

    #[test]
    fn renormalizing_canonical_output_is_stable() {
        for (label, score) in [("LABEL_1", 0.92), ("LABEL_0", 0.81), ("pos", 0.6), ("NEG", 0.99)] {
            let first = normalize(label, score);
            let again = normalize(first.sentiment.as_str(), first.confidence());
            assert_eq!(again.sentiment, first.sentiment);
            assert!(approx(again.prob_positive, first.prob_positive));
        }
    }

    #[test]
    fn sentiment_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Sentiment::Positive).unwrap(),
            "\"positive\""
        );
        let parsed: Sentiment = serde_json::from_str("\"negative\"").unwrap();
        assert_eq!(parsed, Sentiment::Negative);
    }
}
