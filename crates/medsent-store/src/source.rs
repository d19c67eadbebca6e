use std::path::Path;

use async_trait::async_trait;

use crate::FetchError;

/// Remote object storage holding model artifacts.
#[async_trait]
pub trait ObjectSource: Send + Sync {
    /// Human-readable location of `prefix`, used in logs and errors.
    fn location(&self, prefix: &str) -> String;

    /// List every object key under `prefix`, across all result pages.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, FetchError>;

    /// Download one object to `dest`, returning the number of bytes written.
    async fn download(&self, key: &str, dest: &Path) -> Result<u64, FetchError>;
}
