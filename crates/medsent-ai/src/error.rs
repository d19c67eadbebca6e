use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("{file} not found in {dir}")]
    MissingFile { file: &'static str, dir: PathBuf },

    #[error("invalid model artifact: {0}")]
    Invalid(String),

    #[error("unsupported model: {0}")]
    Unsupported(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    #[cfg(feature = "onnx")]
    #[error("onnx runtime error: {0}")]
    Ort(#[from] ort::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
