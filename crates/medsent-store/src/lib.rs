//! Artifact layer: lists model files under a remote prefix and mirrors them
//! into a local directory on cold start.

mod error;
pub use error::FetchError;

mod fetch;
pub use fetch::{ArtifactFetcher, dir_has_entries};

mod source;
pub use source::ObjectSource;

#[cfg(feature = "s3")]
mod s3;
#[cfg(feature = "s3")]
pub use s3::S3Source;
