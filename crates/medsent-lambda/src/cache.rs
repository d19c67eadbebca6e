//! Process-wide model cache.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use medsent_ai::{Classifier, ModelKind, load_classifier};
use medsent_store::ArtifactFetcher;
use tokio::sync::OnceCell;
use tracing::info;

use crate::{ConfigError, HandlerError, LambdaConfig};

/// Produces a ready classifier: fetch artifacts if needed, then load.
#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn Classifier>, HandlerError>;
}

/// Loads a model from a local directory, mirroring it from object storage
/// first when a fetcher is configured.
pub struct ArtifactLoader {
    kind: ModelKind,
    model_dir: PathBuf,
    fetcher: Option<ArtifactFetcher>,
}

impl ArtifactLoader {
    pub fn new(kind: ModelKind, model_dir: impl Into<PathBuf>, fetcher: Option<ArtifactFetcher>) -> Self {
        Self {
            kind,
            model_dir: model_dir.into(),
            fetcher,
        }
    }

    /// Build a loader from the deployment config, wiring S3 when a bucket is set.
    pub async fn from_config(config: &LambdaConfig, kind: ModelKind) -> Result<Self, ConfigError> {
        let fetcher = match &config.bucket {
            #[cfg(feature = "s3")]
            Some(bucket) => {
                let source = medsent_store::S3Source::from_env(bucket.clone()).await;
                Some(ArtifactFetcher::new(
                    Arc::new(source),
                    config.prefix.clone(),
                    config.model_dir.clone(),
                ))
            }
            #[cfg(not(feature = "s3"))]
            Some(_) => return Err(ConfigError::S3Disabled),
            None => None,
        };
        info!(
            kind = %kind,
            bucket = config.bucket.as_deref().unwrap_or("-"),
            prefix = %config.prefix,
            dir = %config.model_dir.display(),
            "configured model loader"
        );
        Ok(Self::new(kind, config.model_dir.clone(), fetcher))
    }
}

#[async_trait]
impl ModelLoader for ArtifactLoader {
    async fn load(&self) -> Result<Arc<dyn Classifier>, HandlerError> {
        let dir = match &self.fetcher {
            Some(fetcher) => fetcher.ensure_model().await?,
            None => self.model_dir.clone(),
        };
        let kind = self.kind;
        // Model loading is blocking file IO plus session setup.
        let classifier = tokio::task::spawn_blocking(move || load_classifier(kind, &dir)).await??;
        Ok(Arc::from(classifier))
    }
}

/// Holds at most one loaded classifier for the life of the process.
///
/// The first caller runs the loader; concurrent callers wait for it. A
/// failed load leaves the cache empty so the next request retries.
pub struct ModelCache {
    loader: Box<dyn ModelLoader>,
    cell: OnceCell<Arc<dyn Classifier>>,
}

impl ModelCache {
    pub fn new(loader: impl ModelLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            cell: OnceCell::new(),
        }
    }

    pub async fn get(&self) -> Result<Arc<dyn Classifier>, HandlerError> {
        self.cell
            .get_or_try_init(|| self.loader.load())
            .await
            .cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PredictionService, ProxyEvent};
    use medsent_ai::ModelError;
    use medsent_store::{FetchError, ObjectSource};
    use std::collections::BTreeMap;
    use std::path::Path;

    /// Object store backed by a map of key to contents.
    struct MemorySource(BTreeMap<String, String>);

    impl MemorySource {
        fn with(objects: &[(&str, &str)]) -> Arc<Self> {
            Arc::new(Self(
                objects
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ))
        }
    }

    #[async_trait]
    impl ObjectSource for MemorySource {
        fn location(&self, prefix: &str) -> String {
            format!("s3://med-models/{prefix}")
        }

        async fn list(&self, prefix: &str) -> Result<Vec<String>, FetchError> {
            Ok(self.0.keys().filter(|k| k.starts_with(prefix)).cloned().collect())
        }

        async fn download(&self, key: &str, dest: &Path) -> Result<u64, FetchError> {
            let data = self
                .0
                .get(key)
                .ok_or_else(|| FetchError::Remote(format!("no such key {key}")))?;
            tokio::fs::write(dest, data).await?;
            Ok(data.len() as u64)
        }
    }

    fn fetching_service(source: Arc<MemorySource>, tmp: &Path) -> PredictionService {
        let dir = tmp.join("model");
        let fetcher = ArtifactFetcher::new(source, "model/", &dir);
        PredictionService::new(
            ArtifactLoader::new(ModelKind::Linear, dir, Some(fetcher)),
            "sklearn-logreg-v1",
        )
    }

    const PIPELINE: &str = r#"{"vocabulary": {"kind": 0}, "idf": [1.0], "coef": [2.0], "intercept": 0.0}"#;

    #[tokio::test]
    async fn bundled_model_loads_from_dir() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("pipeline.json"), PIPELINE).unwrap();
        let cache = ModelCache::new(ArtifactLoader::new(ModelKind::Linear, tmp.path(), None));

        assert!(!cache.is_loaded());
        let clf = cache.get().await.unwrap();
        assert!(cache.is_loaded());
        assert_eq!(clf.predict(&["kind nurse"]).unwrap()[0].label, "LABEL_1");
    }

    #[tokio::test]
    async fn missing_bundle_is_a_model_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cache = ModelCache::new(ArtifactLoader::new(ModelKind::Linear, tmp.path(), None));
        let err = cache.get().await.err().unwrap();
        assert!(matches!(err, HandlerError::Model(ModelError::MissingFile { .. })));
        assert!(!cache.is_loaded());
    }

    #[tokio::test]
    async fn config_without_bucket_has_no_fetcher() {
        let config = LambdaConfig::from_lookup("sklearn-logreg-v1", |_| Ok(None)).unwrap();
        let loader = ArtifactLoader::from_config(&config, ModelKind::Linear).await.unwrap();
        assert!(loader.fetcher.is_none());
        assert_eq!(loader.model_dir, PathBuf::from("/tmp/model"));
    }

    #[tokio::test]
    async fn empty_bucket_on_cold_start_is_500() {
        let tmp = tempfile::TempDir::new().unwrap();
        let svc = fetching_service(MemorySource::with(&[("model/", "")]), tmp.path());

        let resp = svc
            .handle(ProxyEvent::with_body(r#"{"text": "kind nurse"}"#))
            .await;
        assert_eq!(resp.status_code, 500);
        assert_eq!(
            resp.error_body().unwrap().error,
            "no model artifacts found at s3://med-models/model/"
        );
        assert!(!tmp.path().join("model").exists());
    }

    #[tokio::test]
    async fn cold_start_fetches_then_serves() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = MemorySource::with(&[("model/", ""), ("model/pipeline.json", PIPELINE)]);
        let svc = fetching_service(source, tmp.path());

        let resp = svc
            .handle(ProxyEvent::with_body(r#"{"text": "kind nurse"}"#))
            .await;
        assert_eq!(resp.status_code, 200, "{}", resp.body);
        let body: serde_json::Value = serde_json::from_str(&resp.body).unwrap();
        assert_eq!(body["label"], "positive");
        assert_eq!(body["model"], "sklearn-logreg-v1");
        assert!(tmp.path().join("model").join("pipeline.json").is_file());
    }
}
