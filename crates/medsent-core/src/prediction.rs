//! Prediction types exchanged between the inference layer, the Lambda
//! handlers, and clients.

use serde::{Deserialize, Serialize};

use crate::sentiment::{Sentiment, normalize};

/// Opaque classifier output: the predicted label token and the classifier's
/// confidence in that label (not necessarily in the positive class).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPrediction {
    pub label: String,
    pub score: f64,
}

impl RawPrediction {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// One canonical prediction per input text, as carried in the batch list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionEntry {
    pub text: String,
    pub label: Sentiment,
    /// Probability of the positive class.
    pub score: f64,
}

impl PredictionEntry {
    pub fn from_raw(text: impl Into<String>, raw: &RawPrediction) -> Self {
        let n = normalize(&raw.label, raw.score);
        Self {
            text: text.into(),
            label: n.sentiment,
            score: n.prob_positive,
        }
    }
}

/// Canonical prediction returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPrediction {
    pub label: Sentiment,
    /// Probability of the positive class.
    pub score: f64,
    pub model: String,
    pub elapsed_ms: u64,
}

/// Success body: the first prediction at the top level, plus the full list
/// when more than one text was classified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessBody {
    #[serde(flatten)]
    pub prediction: NormalizedPrediction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predictions: Option<Vec<PredictionEntry>>,
}

impl SuccessBody {
    /// Build the body from the per-text entries. Returns `None` for an empty batch.
    pub fn from_entries(
        entries: Vec<PredictionEntry>,
        model: impl Into<String>,
        elapsed_ms: u64,
    ) -> Option<Self> {
        let first = entries.first()?;
        let prediction = NormalizedPrediction {
            label: first.label,
            score: first.score,
            model: model.into(),
            elapsed_ms,
        };
        let predictions = (entries.len() > 1).then_some(entries);
        Some(Self {
            prediction,
            predictions,
        })
    }
}

/// Error body for 4xx/5xx responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_from_raw_normalizes_score() {
        let entry = PredictionEntry::from_raw("terrible wait", &RawPrediction::new("LABEL_0", 0.81));
        assert_eq!(entry.label, Sentiment::Negative);
        assert!((entry.score - 0.19).abs() < 1e-9);
    }

    #[test]
    fn single_entry_body_is_flat() {
        let entries = vec![PredictionEntry::from_raw(
            "great service",
            &RawPrediction::new("LABEL_1", 0.92),
        )];
        let body = SuccessBody::from_entries(entries, "distilbert-sentiment-v1", 12).unwrap();
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "label": "positive",
                "score": 0.92,
                "model": "distilbert-sentiment-v1",
                "elapsed_ms": 12
            })
        );
    }

    #[test]
    fn batch_body_lists_every_entry_in_order() {
        let entries = vec![
            PredictionEntry::from_raw("a", &RawPrediction::new("pos", 0.7)),
            PredictionEntry::from_raw("b", &RawPrediction::new("neg", 0.9)),
        ];
        let body = SuccessBody::from_entries(entries, "m", 3).unwrap();
        assert_eq!(body.prediction.label, Sentiment::Positive);
        let list = body.predictions.as_ref().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].text, "b");
        assert_eq!(list[1].label, Sentiment::Negative);

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["predictions"][0]["text"], "a");
        assert_eq!(json["label"], "positive");
    }

    #[test]
    fn empty_batch_has_no_body() {
        assert!(SuccessBody::from_entries(vec![], "m", 0).is_none());
    }

    #[test]
    fn success_body_parses_back() {
        let json = r#"{"label":"negative","score":0.19,"model":"sklearn-logreg-v1","elapsed_ms":4}"#;
        let body: SuccessBody = serde_json::from_str(json).unwrap();
        assert_eq!(body.prediction.label, Sentiment::Negative);
        assert_eq!(body.prediction.elapsed_ms, 4);
        assert!(body.predictions.is_none());
    }
}
