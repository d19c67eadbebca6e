//! Label vocabulary of an exported transformer and turning its logits into
//! a raw prediction.
//!
//! `config.json` follows the Hugging Face layout; only `id2label` and
//! `model_type` are read. Without a config the head is assumed to use the
//! default `LABEL_{index}` names.

use std::collections::HashMap;
use std::path::Path;

use medsent_core::RawPrediction;
use serde::Deserialize;

use crate::ModelError;

/// Model types whose encoders take a `token_type_ids` input.
const TOKEN_TYPE_MODELS: &[&str] = &["bert", "albert", "electra", "mobilebert"];

/// The parts of a transformer `config.json` the classifier needs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub id2label: HashMap<String, String>,
    #[serde(default)]
    pub model_type: Option<String>,
}

impl ModelConfig {
    /// Read `config.json` from `model_dir`, or fall back to defaults if absent.
    pub fn load(model_dir: &Path) -> Result<Self, ModelError> {
        let path = model_dir.join("config.json");
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Label token for class `index`.
    pub fn label_for(&self, index: usize) -> String {
        self.id2label
            .get(&index.to_string())
            .cloned()
            .unwrap_or_else(|| format!("LABEL_{index}"))
    }

    pub fn uses_token_type_ids(&self) -> bool {
        self.model_type
            .as_deref()
            .is_some_and(|t| TOKEN_TYPE_MODELS.contains(&t))
    }
}

/// Numerically stable softmax.
pub fn softmax(logits: &[f32]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max) as f64;
    let exps: Vec<f64> = logits.iter().map(|&l| (l as f64 - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Pick the top class from one row of logits.
///
/// Multi-output heads use softmax and report the winning class with its
/// probability. A single-output head is read as P(class 1): the winner is
/// class 1 when that probability is at least 0.5, else class 0 with the
/// complement.
pub fn top_prediction(logits: &[f32], config: &ModelConfig) -> Result<RawPrediction, ModelError> {
    match logits.len() {
        0 => Err(ModelError::Inference("model produced no logits".into())),
        1 => {
            let p = sigmoid(logits[0] as f64);
            Ok(if p >= 0.5 {
                RawPrediction::new(config.label_for(1), p)
            } else {
                RawPrediction::new(config.label_for(0), 1.0 - p)
            })
        }
        _ => {
            let probs = softmax(logits);
            let mut best = 0;
            for (i, p) in probs.iter().enumerate() {
                if *p > probs[best] {
                    best = i;
                }
            }
            Ok(RawPrediction::new(config.label_for(best), probs[best]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(pairs: &[(&str, &str)]) -> ModelConfig {
        ModelConfig {
            id2label: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            model_type: Some("distilbert".into()),
        }
    }

    #[test]
    fn softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0]);
        let sum: f64 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(probs[2] > probs[1] && probs[1] > probs[0]);
    }

    #[test]
    fn softmax_handles_large_logits() {
        let probs = softmax(&[1000.0, 1000.0]);
        assert!((probs[0] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn default_labels_when_config_has_none() {
        let pred = top_prediction(&[-1.2, 2.3], &ModelConfig::default()).unwrap();
        assert_eq!(pred.label, "LABEL_1");
        let expected = sigmoid(3.5);
        assert!((pred.score - expected).abs() < 1e-6);
    }

    #[test]
    fn id2label_names_are_used() {
        let cfg = config(&[("0", "NEGATIVE"), ("1", "POSITIVE")]);
        let pred = top_prediction(&[3.0, -1.0], &cfg).unwrap();
        assert_eq!(pred.label, "NEGATIVE");
        assert!(pred.score > 0.9);
    }

    #[test]
    fn single_logit_head_reads_as_class_one() {
        let cfg = ModelConfig::default();
        let pos = top_prediction(&[2.0], &cfg).unwrap();
        assert_eq!(pos.label, "LABEL_1");
        assert!((pos.score - sigmoid(2.0)).abs() < 1e-9);

        let neg = top_prediction(&[-2.0], &cfg).unwrap();
        assert_eq!(neg.label, "LABEL_0");
        assert!((neg.score - sigmoid(2.0)).abs() < 1e-9);
    }

    #[test]
    fn empty_logits_error() {
        assert!(top_prediction(&[], &ModelConfig::default()).is_err());
    }

    #[test]
    fn token_type_ids_only_for_bert_family() {
        assert!(!config(&[]).uses_token_type_ids());
        let bert = ModelConfig {
            model_type: Some("bert".into()),
            ..Default::default()
        };
        assert!(bert.uses_token_type_ids());
        assert!(!ModelConfig::default().uses_token_type_ids());
    }

    #[test]
    fn config_parses_hf_layout() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("config.json"),
            r#"{"model_type": "distilbert", "id2label": {"0": "LABEL_0", "1": "LABEL_1"}, "dim": 768}"#,
        )
        .unwrap();
        let cfg = ModelConfig::load(tmp.path()).unwrap();
        assert_eq!(cfg.label_for(1), "LABEL_1");
        assert_eq!(cfg.model_type.as_deref(), Some("distilbert"));
    }

    #[test]
    fn missing_config_is_default() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cfg = ModelConfig::load(tmp.path()).unwrap();
        assert!(cfg.id2label.is_empty());
        assert_eq!(cfg.label_for(0), "LABEL_0");
    }
}
