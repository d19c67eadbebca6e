//! TF-IDF + logistic regression pipeline.
//!
//! Loads a portable JSON export of a fitted `TfidfVectorizer` and binary
//! `LogisticRegression` (`pipeline.json`) and reproduces their transform
//! and `predict`/`predict_proba` without any Python runtime.

use std::collections::HashMap;
use std::path::Path;

use medsent_core::RawPrediction;
use serde::{Deserialize, Deserializer};
use tracing::info;

use crate::labels::sigmoid;
use crate::{Classifier, ModelError};

const PIPELINE_FILE: &str = "pipeline.json";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Norm {
    #[default]
    L2,
    L1,
    None,
}

/// `null` (an unset norm in the exporting pipeline) means no normalisation;
/// an absent field keeps the `l2` default.
fn norm_or_null<'de, D: Deserializer<'de>>(d: D) -> Result<Norm, D::Error> {
    Ok(Option::<Norm>::deserialize(d)?.unwrap_or(Norm::None))
}

/// On-disk layout of `pipeline.json`.
#[derive(Debug, Deserialize)]
struct PipelineExport {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    coef: Vec<f64>,
    intercept: f64,
    #[serde(default = "default_ngram_range")]
    ngram_range: (usize, usize),
    #[serde(default = "default_true")]
    lowercase: bool,
    #[serde(default)]
    sublinear_tf: bool,
    #[serde(default, deserialize_with = "norm_or_null")]
    norm: Norm,
    /// Raw label tokens for class 0 and class 1.
    #[serde(default = "default_labels")]
    labels: [String; 2],
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_true() -> bool {
    true
}

fn default_labels() -> [String; 2] {
    ["LABEL_0".into(), "LABEL_1".into()]
}

/// Fitted TF-IDF vectorizer + binary logistic-regression classifier.
pub struct LinearClassifier {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    coef: Vec<f64>,
    intercept: f64,
    ngram_range: (usize, usize),
    lowercase: bool,
    sublinear_tf: bool,
    norm: Norm,
    labels: [String; 2],
}

impl LinearClassifier {
    /// Load `pipeline.json` from `model_dir`.
    pub fn load(model_dir: &Path) -> Result<Self, ModelError> {
        let path = model_dir.join(PIPELINE_FILE);
        if !path.exists() {
            return Err(ModelError::MissingFile {
                file: PIPELINE_FILE,
                dir: model_dir.to_path_buf(),
            });
        }
        let raw = std::fs::read_to_string(&path)?;
        let classifier = Self::from_json(&raw)?;
        info!(
            features = classifier.idf.len(),
            model = %path.display(),
            "loaded tf-idf pipeline"
        );
        Ok(classifier)
    }

    /// Build from the JSON export, validating shapes.
    pub fn from_json(raw: &str) -> Result<Self, ModelError> {
        let export: PipelineExport = serde_json::from_str(raw)?;
        let n = export.idf.len();

        if export.vocabulary.is_empty() {
            return Err(ModelError::Invalid("empty vocabulary".into()));
        }
        if export.coef.len() != n {
            return Err(ModelError::Invalid(format!(
                "coef has {} weights but idf has {n}",
                export.coef.len()
            )));
        }
        if let Some((term, &idx)) = export.vocabulary.iter().find(|(_, i)| **i >= n) {
            return Err(ModelError::Invalid(format!(
                "term '{term}' maps to column {idx}, outside {n} features"
            )));
        }
        let (lo, hi) = export.ngram_range;
        if lo == 0 || lo > hi {
            return Err(ModelError::Invalid(format!("bad ngram_range ({lo}, {hi})")));
        }

        Ok(Self {
            vocabulary: export.vocabulary,
            idf: export.idf,
            coef: export.coef,
            intercept: export.intercept,
            ngram_range: export.ngram_range,
            lowercase: export.lowercase,
            sublinear_tf: export.sublinear_tf,
            norm: export.norm,
            labels: export.labels,
        })
    }

    /// Sparse TF-IDF row for `text`: `(column, weight)` pairs.
    fn transform(&self, text: &str) -> Vec<(usize, f64)> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };
        let tokens = tokenize(&text);

        let mut counts: HashMap<usize, f64> = HashMap::new();
        let (lo, hi) = self.ngram_range;
        for n in lo..=hi {
            for gram in tokens.windows(n) {
                if let Some(&col) = self.vocabulary.get(&gram.join(" ")) {
                    *counts.entry(col).or_insert(0.0) += 1.0;
                }
            }
        }

        let mut row: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(col, tf)| {
                let tf = if self.sublinear_tf { 1.0 + tf.ln() } else { tf };
                (col, tf * self.idf[col])
            })
            .collect();

        let norm = match self.norm {
            Norm::L2 => row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt(),
            Norm::L1 => row.iter().map(|(_, w)| w.abs()).sum::<f64>(),
            Norm::None => 0.0,
        };
        if norm > 0.0 {
            for (_, w) in &mut row {
                *w /= norm;
            }
        }
        row
    }

    /// Logistic-regression decision value for `text`.
    pub fn decision_function(&self, text: &str) -> f64 {
        self.transform(text)
            .iter()
            .map(|&(col, w)| self.coef[col] * w)
            .sum::<f64>()
            + self.intercept
    }

    /// Probability of class 1.
    pub fn predict_proba(&self, text: &str) -> f64 {
        sigmoid(self.decision_function(text))
    }

    pub fn num_features(&self) -> usize {
        self.idf.len()
    }
}

impl Classifier for LinearClassifier {
    fn predict(&self, texts: &[&str]) -> Result<Vec<RawPrediction>, ModelError> {
        Ok(texts
            .iter()
            .map(|text| {
                let decision = self.decision_function(text);
                let p1 = sigmoid(decision);
                // Class 1 only on a strictly positive decision value.
                if decision > 0.0 {
                    RawPrediction::new(self.labels[1].clone(), p1)
                } else {
                    RawPrediction::new(self.labels[0].clone(), 1.0 - p1)
                }
            })
            .collect())
    }
}

/// Split into runs of two or more word characters (letters, digits, `_`).
fn tokenize(text: &str) -> Vec<&str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| t.chars().count() >= 2)
        .collect()
}
