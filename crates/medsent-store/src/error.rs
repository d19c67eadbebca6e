use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no model artifacts found at {0}")]
    NotFound(String),

    #[error("object storage error: {0}")]
    Remote(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
