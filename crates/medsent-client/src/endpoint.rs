use medsent_core::PredictionRequest;

/// Request body layout an endpoint expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// `{"review": "..."}`, as the sklearn endpoint was first deployed.
    Review,
    /// `{"texts": ["..."]}`.
    Texts,
}

impl PayloadShape {
    pub fn request(&self, review: &str) -> PredictionRequest {
        match self {
            Self::Review => PredictionRequest::from_review(review),
            Self::Texts => PredictionRequest::from_texts([review]),
        }
    }
}

/// A deployed model endpoint.
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// Display name, used in errors.
    pub name: String,
    /// `None` until configured.
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub shape: PayloadShape,
}

impl Endpoint {
    pub fn new(
        name: impl Into<String>,
        url: Option<String>,
        api_key: Option<String>,
        shape: PayloadShape,
    ) -> Self {
        Self {
            name: name.into(),
            url,
            api_key,
            shape,
        }
    }
}
