//! ONNX Runtime sequence-classification pipeline for exported transformers.
//!
//! The model directory must contain `model.onnx` and `tokenizer.json`;
//! `config.json` is optional and supplies `id2label` and `model_type`.
//! Export a fine-tuned DistilBERT with `optimum-cli export onnx --task
//! text-classification`.

use std::path::Path;
use std::sync::Mutex;

use medsent_core::RawPrediction;
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::labels::{ModelConfig, top_prediction};
use crate::{Classifier, ModelError};

/// Longest input the encoder accepts; longer texts are truncated.
const MAX_LENGTH: usize = 512;

/// Transformer sentiment classifier running on ONNX Runtime.
///
/// `Session::run` needs exclusive access, so the session sits behind a
/// mutex and concurrent callers are serialized.
pub struct TransformerClassifier {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    config: ModelConfig,
}

impl TransformerClassifier {
    /// Load a classifier from a directory containing `model.onnx` and `tokenizer.json`.
    pub fn load(model_dir: &Path) -> Result<Self, ModelError> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        if !model_path.exists() {
            return Err(ModelError::MissingFile {
                file: "model.onnx",
                dir: model_dir.to_path_buf(),
            });
        }
        if !tokenizer_path.exists() {
            return Err(ModelError::MissingFile {
                file: "tokenizer.json",
                dir: model_dir.to_path_buf(),
            });
        }

        let config = ModelConfig::load(model_dir)?;
        let session = Session::builder()
            .map_err(|e| ModelError::Invalid(format!("onnx session builder: {e}")))?
            .commit_from_file(&model_path)
            .map_err(|e| ModelError::Invalid(format!("load {}: {e}", model_path.display())))?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| ModelError::Tokenizer(format!("load tokenizer: {e}")))?;

        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: MAX_LENGTH,
                ..Default::default()
            }))
            .map_err(|e| ModelError::Tokenizer(format!("set truncation: {e}")))?;

        // Pad every input in a batch to the longest one.
        tokenizer.with_padding(Some(tokenizers::PaddingParams {
            ..Default::default()
        }));

        info!(
            model = %model_path.display(),
            model_type = config.model_type.as_deref().unwrap_or("unknown"),
            labels = config.id2label.len(),
            "loaded transformer classifier"
        );
        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            config,
        })
    }

    /// Run the encoder and return one row of logits per input.
    fn logits(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, ModelError> {
        let batch_size = texts.len();

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| ModelError::Tokenizer(format!("tokenize: {e}")))?;

        let seq_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0);

        // Flat input tensors: [batch_size, seq_len].
        let mut input_ids = vec![0i64; batch_size * seq_len];
        let mut attention_mask = vec![0i64; batch_size * seq_len];
        let mut token_type_ids = vec![0i64; batch_size * seq_len];

        for (i, encoding) in encodings.iter().enumerate() {
            let offset = i * seq_len;
            for (j, &id) in encoding.get_ids().iter().enumerate() {
                input_ids[offset + j] = id as i64;
            }
            for (j, &mask) in encoding.get_attention_mask().iter().enumerate() {
                attention_mask[offset + j] = mask as i64;
            }
            for (j, &tid) in encoding.get_type_ids().iter().enumerate() {
                token_type_ids[offset + j] = tid as i64;
            }
        }

        let shape = [batch_size as i64, seq_len as i64];
        let ids_tensor = Tensor::from_array((shape, input_ids.into_boxed_slice()))?;
        let mask_tensor = Tensor::from_array((shape, attention_mask.into_boxed_slice()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| ModelError::Inference(format!("session mutex poisoned: {e}")))?;

        // DistilBERT-style encoders have no segment embeddings.
        let outputs = if self.config.uses_token_type_ids() {
            let type_tensor = Tensor::from_array((shape, token_type_ids.into_boxed_slice()))?;
            session.run(ort::inputs![
                "input_ids" => ids_tensor,
                "attention_mask" => mask_tensor,
                "token_type_ids" => type_tensor,
            ])?
        } else {
            session.run(ort::inputs![
                "input_ids" => ids_tensor,
                "attention_mask" => mask_tensor,
            ])?
        };

        // Logits: [batch_size, num_labels].
        let (output_shape, output_data) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: &[i64] = output_shape;
        if dims.len() != 2 || dims[0] as usize != batch_size || dims[1] < 1 {
            return Err(ModelError::Inference(format!(
                "unexpected logits shape {dims:?}, expected [{batch_size}, num_labels]"
            )));
        }

        let num_labels = dims[1] as usize;
        debug!(batch_size, seq_len, num_labels, "ran classifier");
        Ok(output_data
            .chunks(num_labels)
            .map(|row| row.to_vec())
            .collect())
    }
}

impl Classifier for TransformerClassifier {
    fn predict(&self, texts: &[&str]) -> Result<Vec<RawPrediction>, ModelError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }
        self.logits(texts)?
            .iter()
            .map(|row| top_prediction(row, &self.config))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medsent_core::{Sentiment, normalize};
    use std::path::PathBuf;

    fn model_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("models")
            .join("distilbert-sentiment")
    }

    #[test]
    fn missing_model_file_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = TransformerClassifier::load(tmp.path()).err().unwrap();
        assert!(matches!(err, ModelError::MissingFile { file: "model.onnx", .. }));
    }

    #[test]
    #[ignore = "requires an exported model under models/distilbert-sentiment"]
    fn predicts_one_result_per_input_in_order() {
        let clf = TransformerClassifier::load(&model_dir()).unwrap();
        let texts = [
            "The staff were incredibly kind and the doctor listened carefully.",
            "The waiting room was dirty, and the staff were rude.",
            "Great service.",
        ];
        let preds = clf.predict(&texts).unwrap();
        assert_eq!(preds.len(), 3);
        for p in &preds {
            assert!((0.0..=1.0).contains(&p.score), "score out of range: {p:?}");
        }

        let first = normalize(&preds[0].label, preds[0].score);
        let second = normalize(&preds[1].label, preds[1].score);
        assert_eq!(first.sentiment, Sentiment::Positive);
        assert_eq!(second.sentiment, Sentiment::Negative);
    }

    #[test]
    #[ignore = "requires an exported model under models/distilbert-sentiment"]
    fn empty_batch() {
        let clf = TransformerClassifier::load(&model_dir()).unwrap();
        assert!(clf.predict(&[]).unwrap().is_empty());
    }
}
