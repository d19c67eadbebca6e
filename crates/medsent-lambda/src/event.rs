//! API Gateway proxy-integration envelope.

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use medsent_core::{ErrorBody, PredictionRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::HandlerError;

/// The subset of a proxy event the handler reads.
///
/// `body` is normally a JSON string, possibly base64-encoded. Direct
/// invocations may pass the body as an object; a missing or `null` body is
/// read as `{}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProxyEvent {
    #[serde(default)]
    pub body: Value,
    #[serde(rename = "isBase64Encoded", default)]
    pub is_base64_encoded: bool,
}

impl ProxyEvent {
    /// Event carrying a plain JSON string body.
    pub fn with_body(body: impl Into<String>) -> Self {
        Self {
            body: Value::String(body.into()),
            is_base64_encoded: false,
        }
    }

    /// Event carrying a base64-encoded JSON body.
    pub fn with_base64_body(body: &[u8]) -> Self {
        Self {
            body: Value::String(STANDARD.encode(body)),
            is_base64_encoded: true,
        }
    }

    /// Decode the body into a prediction request.
    pub fn prediction_request(&self) -> Result<PredictionRequest, HandlerError> {
        let value = match &self.body {
            Value::Null => return Ok(PredictionRequest::default()),
            Value::String(raw) if self.is_base64_encoded => {
                let bytes = STANDARD.decode(raw.trim())?;
                serde_json::from_slice::<Value>(&bytes)?
            }
            Value::String(raw) => serde_json::from_str::<Value>(raw)?,
            Value::Object(_) if !self.is_base64_encoded => self.body.clone(),
            other => {
                return Err(HandlerError::InvalidBody(format!(
                    "expected a JSON string or object, got {}",
                    kind_of(other)
                )));
            }
        };

        match value {
            Value::Null => Ok(PredictionRequest::default()),
            Value::Object(_) => Ok(serde_json::from_value(value)?),
            other => Err(HandlerError::InvalidBody(format!(
                "expected a JSON object, got {}",
                kind_of(&other)
            ))),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Proxy-integration response: status, CORS-enabled JSON headers, and a
/// JSON-encoded body string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl ProxyResponse {
    pub fn json<T: Serialize>(status_code: u16, body: &T) -> Self {
        match serde_json::to_string(body) {
            Ok(body) => Self::raw(status_code, body),
            Err(e) => Self::error(500, e.to_string()),
        }
    }

    pub fn error(status_code: u16, message: impl Into<String>) -> Self {
        let body = serde_json::json!({ "error": message.into() }).to_string();
        Self::raw(status_code, body)
    }

    fn raw(status_code: u16, body: String) -> Self {
        let headers = BTreeMap::from([
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
        ]);
        Self {
            status_code,
            headers,
            body,
        }
    }

    /// Parse the body back as an error payload, if it is one.
    pub fn error_body(&self) -> Option<ErrorBody> {
        serde_json::from_str(&self.body).ok()
    }
}
