//! Lambda entry points for the sentiment endpoints.
//!
//! Both deployables share one handler: decode the proxy event, resolve the
//! texts, lazily fetch and load the model once per process, classify, and
//! answer with a normalized JSON body.

mod cache;
pub use cache::{ArtifactLoader, ModelCache, ModelLoader};

mod config;
pub use config::LambdaConfig;

mod error;
pub use error::{ConfigError, HandlerError};

mod event;
pub use event::{ProxyEvent, ProxyResponse};

mod handler;
pub use handler::PredictionService;

mod runtime;
pub use runtime::{init_tracing, serve};
