//! Inbound prediction request body.

use serde::{Deserialize, Serialize};

/// Error message returned with status 400 when no usable text was supplied.
pub const MISSING_TEXT_MESSAGE: &str = "Provide 'text' or 'texts'.";

/// JSON body accepted by both prediction endpoints.
///
/// Exactly one field is used, in priority order `texts`, `text`, `review`.
/// `review` is the field older sklearn clients send.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texts: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
}

impl PredictionRequest {
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            texts: Some(texts.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn from_review(review: impl Into<String>) -> Self {
        Self {
            review: Some(review.into()),
            ..Default::default()
        }
    }

    /// Resolve the list of texts to classify.
    ///
    /// A `texts` list counts only if it holds at least one non-empty string.
    /// Returns `None` when every source is absent or empty; the caller
    /// answers that with a 400.
    pub fn resolve_texts(&self) -> Option<Vec<String>> {
        if let Some(texts) = &self.texts
            && texts.iter().any(|t| !t.is_empty())
        {
            return Some(texts.clone());
        }
        [&self.text, &self.review]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .map(|s| vec![s.clone()])
    }
}
