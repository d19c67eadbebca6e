//! Best-effort reading of prediction responses on the client side.
//!
//! The two backends have drifted over time (`label` vs `sentiment`,
//! `score` vs `confidence`), so lookups try several keys in order and the
//! first present, non-null value wins.

use serde_json::Value;

use crate::sentiment::{Sentiment, classify_label, normalize};

const LABEL_KEYS: &[&str] = &["label", "prediction", "sentiment", "output"];
const SCORE_KEYS: &[&str] = &["score", "confidence", "probability"];
const MODEL_KEYS: &[&str] = &["model", "model_name"];
const LATENCY_KEYS: &[&str] = &["elapsed_ms", "latency_ms"];

/// Label reported when the response carries none of [`LABEL_KEYS`].
pub const UNKNOWN_LABEL: &str = "UNKNOWN";
/// Model name reported when the response carries none of [`MODEL_KEYS`].
pub const UNKNOWN_MODEL: &str = "N/A";

/// Normalized view of a prediction response body.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseView {
    /// Label as reported by the server, or [`UNKNOWN_LABEL`].
    pub label: String,
    /// Canonical class, `None` when the server reported no label.
    pub sentiment: Option<Sentiment>,
    /// Score after the shared positive/negative flip; the raw score when
    /// the label is unknown.
    pub certainty: Option<f64>,
    pub model: String,
    pub server_elapsed_ms: Option<u64>,
}

impl ResponseView {
    /// Label for display: underscores become spaces, words are title-cased.
    pub fn display_label(&self) -> String {
        self.label
            .trim()
            .replace('_', " ")
            .split(' ')
            .map(title_case)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Read label, certainty, model name and server latency from a response body.
///
/// Non-object bodies (for example `{"raw_text": ...}` wrappers or arrays)
/// yield an `UNKNOWN` view rather than an error.
pub fn normalize_response(data: &Value) -> ResponseView {
    let label = first_present(data, LABEL_KEYS).map(value_to_string);
    let score = first_present(data, SCORE_KEYS).and_then(value_to_f64);

    let (sentiment, certainty) = match &label {
        Some(label) => (
            Some(classify_label(label)),
            score.map(|s| normalize(label, s).prob_positive),
        ),
        None => (None, score),
    };

    let model = first_present(data, MODEL_KEYS)
        .map(value_to_string)
        .unwrap_or_else(|| UNKNOWN_MODEL.to_string());

    let server_elapsed_ms = first_present(data, LATENCY_KEYS)
        .and_then(value_to_f64)
        .filter(|ms| *ms >= 0.0)
        .map(|ms| ms.round() as u64);

    ResponseView {
        label: label.unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
        sentiment,
        certainty,
        model,
        server_elapsed_ms,
    }
}

fn first_present<'a>(data: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let obj = data.as_object()?;
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| match v {
            Value::Null => false,
            Value::String(s) => !s.is_empty(),
            _ => true,
        })
}

fn value_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn value_to_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}
