//! Cold-start artifact mirroring.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::{FetchError, ObjectSource};

/// Mirrors every object under a remote prefix into a flat local directory.
///
/// A non-empty local directory is taken as a complete model and returned
/// without touching the network. Downloads land in a sibling `.partial`
/// directory that is renamed into place only once every object is written,
/// so an interrupted fetch never leaves a half-populated model directory.
pub struct ArtifactFetcher {
    source: Arc<dyn ObjectSource>,
    prefix: String,
    local_dir: PathBuf,
}

impl ArtifactFetcher {
    pub fn new(
        source: Arc<dyn ObjectSource>,
        prefix: impl Into<String>,
        local_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source,
            prefix: prefix.into(),
            local_dir: local_dir.into(),
        }
    }

    pub fn local_dir(&self) -> &Path {
        &self.local_dir
    }

    /// Ensure the model is present locally and return its directory.
    pub async fn ensure_model(&self) -> Result<PathBuf, FetchError> {
        if dir_has_entries(&self.local_dir).await? {
            info!(dir = %self.local_dir.display(), "model artifacts already present");
            return Ok(self.local_dir.clone());
        }

        let location = self.source.location(&self.prefix);
        let keys: Vec<String> = self
            .source
            .list(&self.prefix)
            .await?
            .into_iter()
            .filter(|k| !k.ends_with('/'))
            .collect();
        if keys.is_empty() {
            return Err(FetchError::NotFound(location));
        }

        let start = Instant::now();
        let staging = staging_dir(&self.local_dir);
        if let Err(e) = self.download_all(&keys, &staging).await {
            if let Err(cleanup) = tokio::fs::remove_dir_all(&staging).await {
                warn!(
                    dir = %staging.display(),
                    error = %cleanup,
                    "failed to remove staging directory"
                );
            }
            return Err(e);
        }

        // An empty target directory may already exist from an earlier probe.
        if tokio::fs::try_exists(&self.local_dir).await? {
            tokio::fs::remove_dir(&self.local_dir).await?;
        }
        tokio::fs::rename(&staging, &self.local_dir).await?;

        info!(
            objects = keys.len(),
            from = %location,
            dir = %self.local_dir.display(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "downloaded model artifacts"
        );
        Ok(self.local_dir.clone())
    }

    async fn download_all(&self, keys: &[String], staging: &Path) -> Result<(), FetchError> {
        if tokio::fs::try_exists(staging).await? {
            tokio::fs::remove_dir_all(staging).await?;
        }
        tokio::fs::create_dir_all(staging).await?;

        for key in keys {
            // Flatten: only the final path segment survives locally.
            let Some(name) = Path::new(key).file_name() else {
                continue;
            };
            let dest = staging.join(name);
            let bytes = self.source.download(key, &dest).await?;
            info!(key = %key, bytes, "downloaded object");
        }
        Ok(())
    }
}

/// True when `dir` exists and contains at least one entry.
pub async fn dir_has_entries(dir: &Path) -> Result<bool, FetchError> {
    match tokio::fs::read_dir(dir).await {
        Ok(mut entries) => Ok(entries.next_entry().await?.is_some()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

fn staging_dir(local_dir: &Path) -> PathBuf {
    let mut name = local_dir
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "model".into());
    name.push(".partial");
    local_dir.with_file_name(name)
}
