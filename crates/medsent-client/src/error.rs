use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request to {url} failed after {attempts} attempt(s): {source}")]
    Transport {
        url: String,
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("no endpoint URL configured for {0}")]
    MissingUrl(String),

    #[error("review text is empty")]
    EmptyText,
}
