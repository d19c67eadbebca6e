mod display;
mod evaluate;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use medsent_ai::{ModelKind, load_classifier};
use medsent_client::{Endpoint, EndpointClient, PayloadShape, RetryPolicy};
use medsent_store::{ArtifactFetcher, S3Source};

#[derive(Parser)]
#[command(name = "medsent", version, about = "Sentiment of medical reviews: call deployed models, fetch artifacts, evaluate locally")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify one review with a deployed endpoint.
    Predict(PredictArgs),

    /// Mirror model artifacts from S3 into a local directory.
    Fetch {
        #[arg(long, env = "S3_BUCKET")]
        bucket: String,
        #[arg(long, env = "S3_PREFIX", default_value = "model/")]
        prefix: String,
        #[arg(long, env = "MODEL_DIR", default_value = "model")]
        dest: PathBuf,
    },

    /// Score a local model against a labelled JSON-lines file.
    Evaluate {
        #[arg(long)]
        model_dir: PathBuf,
        /// linear (pipeline.json) or transformer (model.onnx + tokenizer.json).
        #[arg(long, default_value = "linear")]
        kind: ModelKind,
        /// One `{"text": ..., "label": ...}` object per line.
        #[arg(long)]
        data: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModelChoice {
    Sklearn,
    Distilbert,
}

#[derive(Args)]
struct PredictArgs {
    #[arg(long, value_enum, default_value_t = ModelChoice::Distilbert)]
    model: ModelChoice,

    #[arg(long, env = "SKLEARN_API_URL")]
    sklearn_url: Option<String>,
    #[arg(long, env = "SKLEARN_API_KEY", hide_env_values = true)]
    sklearn_key: Option<String>,
    #[arg(long, env = "DISTILBERT_API_URL")]
    distilbert_url: Option<String>,
    #[arg(long, env = "DISTILBERT_API_KEY", hide_env_values = true)]
    distilbert_key: Option<String>,

    #[arg(long, default_value_t = medsent_client::http::DEFAULT_TIMEOUT.as_secs())]
    timeout_secs: u64,
    /// Extra attempts after a connection failure or timeout.
    #[arg(long, default_value_t = RetryPolicy::default().retries)]
    retries: u32,

    /// Review text.
    review: String,
}

impl PredictArgs {
    fn endpoint(&self) -> Endpoint {
        match self.model {
            ModelChoice::Sklearn => Endpoint::new(
                "Sklearn (TF-IDF + Logistic Regression)",
                self.sklearn_url.clone(),
                self.sklearn_key.clone(),
                PayloadShape::Review,
            ),
            ModelChoice::Distilbert => Endpoint::new(
                "DistilBERT (Transformer)",
                self.distilbert_url.clone(),
                self.distilbert_key.clone(),
                PayloadShape::Texts,
            ),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    tracing::info!("medsent v{}", env!("CARGO_PKG_VERSION"));

    match Cli::parse().command {
        Command::Predict(args) => predict(args).await,
        Command::Fetch {
            bucket,
            prefix,
            dest,
        } => fetch(bucket, prefix, dest).await,
        Command::Evaluate {
            model_dir,
            kind,
            data,
        } => run_evaluate(model_dir, kind, data).await,
    }
}

async fn predict(args: PredictArgs) -> anyhow::Result<()> {
    let endpoint = args.endpoint();
    let retry = RetryPolicy {
        retries: args.retries,
        ..RetryPolicy::default()
    };
    let client = EndpointClient::new(Duration::from_secs(args.timeout_secs), retry)?;

    let start = Instant::now();
    let outcome = client
        .predict(&endpoint, &args.review)
        .await
        .with_context(|| format!("calling {}", endpoint.name))?;
    let total_ms = start.elapsed().as_millis() as u64;

    display::print_result_card(&endpoint.name, &outcome, total_ms);
    Ok(())
}

async fn fetch(bucket: String, prefix: String, dest: PathBuf) -> anyhow::Result<()> {
    let source = Arc::new(S3Source::from_env(bucket).await);
    let fetcher = ArtifactFetcher::new(source, prefix, dest);
    let dir = fetcher
        .ensure_model()
        .await
        .context("fetching model artifacts")?;
    println!("Model ready in {}", dir.display());
    Ok(())
}

async fn run_evaluate(model_dir: PathBuf, kind: ModelKind, data: PathBuf) -> anyhow::Result<()> {
    let samples = evaluate::read_samples(&data)?;
    eprintln!("  Read {} samples from {}", samples.len(), data.display());

    let report = tokio::task::spawn_blocking(move || {
        let classifier = load_classifier(kind, &model_dir)
            .with_context(|| format!("loading {kind} model from {}", model_dir.display()))?;
        evaluate::evaluate(classifier.as_ref(), &samples)
    })
    .await??;

    evaluate::print_report(&report);
    Ok(())
}
