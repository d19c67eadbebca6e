//! Inference layer: a uniform `predict(texts)` over the TF-IDF + logistic
//! regression pipeline and the ONNX Runtime transformer classifier.

mod classifier;
pub use classifier::{Classifier, ModelKind, load_classifier};

mod error;
pub use error::ModelError;

pub mod labels;
pub use labels::ModelConfig;

mod linear;
pub use linear::LinearClassifier;

#[cfg(feature = "onnx")]
mod transformer;
#[cfg(feature = "onnx")]
pub use transformer::TransformerClassifier;
