pub mod evaluation;
pub mod prediction;
pub mod request;
pub mod response;
pub mod sentiment;

pub use evaluation::{ClassMetrics, Evaluation, EvaluationError};
pub use prediction::{ErrorBody, NormalizedPrediction, PredictionEntry, RawPrediction, SuccessBody};
pub use request::{MISSING_TEXT_MESSAGE, PredictionRequest};
pub use response::{ResponseView, normalize_response};
pub use sentiment::{Normalized, Sentiment, classify_label, normalize};
