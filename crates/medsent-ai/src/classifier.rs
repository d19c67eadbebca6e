//! The uniform prediction interface and model loading by kind.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;

use medsent_core::RawPrediction;
use tracing::info;

use crate::{LinearClassifier, ModelError};

/// A loaded binary sentiment classifier.
///
/// Implementations return exactly one [`RawPrediction`] per input, in input
/// order. The raw label vocabulary is model-specific; callers normalize it.
pub trait Classifier: Send + Sync {
    fn predict(&self, texts: &[&str]) -> Result<Vec<RawPrediction>, ModelError>;
}

/// Which artifact format a model directory holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    /// `pipeline.json`: TF-IDF vocabulary and logistic-regression weights.
    Linear,
    /// `model.onnx` + `tokenizer.json` (+ optional `config.json`).
    Transformer,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Transformer => "transformer",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linear" | "sklearn" | "tfidf" => Ok(Self::Linear),
            "transformer" | "distilbert" | "onnx" => Ok(Self::Transformer),
            other => Err(ModelError::Unsupported(format!("unknown model kind '{other}'"))),
        }
    }
}

/// Load a classifier of `kind` from `model_dir`.
pub fn load_classifier(kind: ModelKind, model_dir: &Path) -> Result<Box<dyn Classifier>, ModelError> {
    let start = Instant::now();
    let classifier: Box<dyn Classifier> = match kind {
        ModelKind::Linear => Box::new(LinearClassifier::load(model_dir)?),
        #[cfg(feature = "onnx")]
        ModelKind::Transformer => Box::new(crate::TransformerClassifier::load(model_dir)?),
        #[cfg(not(feature = "onnx"))]
        ModelKind::Transformer => {
            return Err(ModelError::Unsupported(
                "transformer models require the `onnx` feature".into(),
            ));
        }
    };
    info!(
        kind = %kind,
        dir = %model_dir.display(),
        load_ms = start.elapsed().as_millis() as u64,
        "loaded classifier"
    );
    Ok(classifier)
}
