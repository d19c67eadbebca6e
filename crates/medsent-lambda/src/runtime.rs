use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use medsent_ai::ModelKind;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{ArtifactLoader, LambdaConfig, PredictionService, ProxyEvent};

/// Workspace crates at `info`; the AWS SDK and HTTP stack only when noisy.
const DEFAULT_FILTER: &str =
    "info,aws_config=warn,aws_smithy_runtime=warn,aws_sdk_s3=warn,hyper=warn,hyper_util=warn,h2=warn,rustls=warn";

/// Install the fmt subscriber, honouring `RUST_LOG` when set.
pub fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // CloudWatch stamps every line itself.
    let _tracing = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().without_time())
        .with(env_filter)
        .try_init();
}

/// Read the config, build the model loader and run the Lambda event loop.
pub async fn serve(kind: ModelKind, default_model_name: &str) -> Result<(), Error> {
    let config = LambdaConfig::from_env(default_model_name)?;
    let loader = ArtifactLoader::from_config(&config, kind).await?;
    let service = PredictionService::new(loader, config.model_name.clone());
    info!(
        kind = %kind,
        model = %service.model_name(),
        version = env!("CARGO_PKG_VERSION"),
        "starting lambda runtime"
    );

    let service = &service;
    run(service_fn(move |event: LambdaEvent<ProxyEvent>| async move {
        Ok::<_, Error>(service.handle(event.payload).await)
    }))
    .await
}
