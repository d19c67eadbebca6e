use medsent_ai::ModelError;
use medsent_core::MISSING_TEXT_MESSAGE;
use medsent_store::FetchError;
use thiserror::Error;

/// Everything that can go wrong while answering one request.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("{}", MISSING_TEXT_MESSAGE)]
    MissingText,

    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error("invalid base64 body: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("inference task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl HandlerError {
    /// HTTP status reported to the caller.
    pub fn status(&self) -> u16 {
        match self {
            Self::MissingText => 400,
            _ => 500,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not valid unicode")]
    NotUnicode(&'static str),

    #[error("environment variable {0} is set but empty")]
    Blank(&'static str),

    #[error("environment variable {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("S3_BUCKET is set but this build has no S3 support")]
    S3Disabled,
}
