use std::env::VarError;
use std::path::PathBuf;

use crate::ConfigError;

pub const DEFAULT_PREFIX: &str = "model/";
pub const DEFAULT_MODEL_DIR: &str = "/tmp/model";

/// Runtime settings for one Lambda deployment, read once at cold start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LambdaConfig {
    /// Bucket holding the model artifacts. `None` means the model ships
    /// inside the deployment package at `model_dir`.
    pub bucket: Option<String>,
    pub prefix: String,
    pub model_dir: PathBuf,
    /// Reported as `model` in every success body.
    pub model_name: String,
}

impl LambdaConfig {
    /// Read `S3_BUCKET`, `S3_PREFIX`, `MODEL_DIR` and `MODEL_NAME`.
    pub fn from_env(default_model_name: &str) -> Result<Self, ConfigError> {
        Self::from_lookup(default_model_name, |key| match std::env::var(key) {
            Ok(value) => Ok(Some(value)),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode(key)),
        })
    }

    pub fn from_lookup<F>(default_model_name: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Result<Option<String>, ConfigError>,
    {
        // A blank bucket is how the console "unsets" a variable.
        let bucket = lookup("S3_BUCKET")?
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty());
        if let Some(b) = &bucket
            && b.contains('/')
        {
            return Err(ConfigError::Invalid {
                var: "S3_BUCKET",
                reason: format!("'{b}' is not a bucket name"),
            });
        }

        let prefix = lookup("S3_PREFIX")?.unwrap_or_else(|| DEFAULT_PREFIX.to_string());
        let model_dir = non_blank("MODEL_DIR", lookup("MODEL_DIR")?)?
            .unwrap_or_else(|| DEFAULT_MODEL_DIR.to_string());
        let model_name = non_blank("MODEL_NAME", lookup("MODEL_NAME")?)?
            .unwrap_or_else(|| default_model_name.to_string());

        Ok(Self {
            bucket,
            prefix,
            model_dir: PathBuf::from(model_dir),
            model_name,
        })
    }
}

fn non_blank(var: &'static str, value: Option<String>) -> Result<Option<String>, ConfigError> {
    match value {
        Some(v) if v.trim().is_empty() => Err(ConfigError::Blank(var)),
        other => Ok(other),
    }
}
