//! Client side of the sentiment endpoints: calls a deployed model over
//! HTTP and normalizes whatever shape the backend answers with.

mod endpoint;
pub use endpoint::{Endpoint, PayloadShape};

mod error;
pub use error::ClientError;

pub mod http;
pub use http::{CallOutcome, EndpointClient, RetryPolicy};

#[cfg(test)]
mod testing;
