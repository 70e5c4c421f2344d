//! Minimal JSON-RPC 2.0 client for the aria2 endpoint.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;

use downpour_core::Error as CoreError;

const REQUEST_ID: &str = "downpour";

/// Failures from one RPC round trip, kept separate from the core taxonomy
/// so call sites can inspect engine messages before classifying.
#[derive(Debug, Error)]
pub(crate) enum RpcError {
    /// The HTTP transport failed.
    #[error("rpc transport failure")]
    Transport {
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// The response body was not a valid JSON-RPC envelope.
    #[error("rpc decode failure")]
    Decode {
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// The engine answered with a JSON-RPC error object.
    #[error("engine rejected the call: {message}")]
    Engine {
        /// JSON-RPC error code.
        code: i64,
        /// Engine-provided message; only private helpers may match on it.
        message: String,
    },
}

impl RpcError {
    /// Engine-provided failure message, when the engine produced one.
    pub(crate) fn engine_message(&self) -> Option<&str> {
        match self {
            Self::Engine { message, .. } => Some(message),
            Self::Transport { .. } | Self::Decode { .. } => None,
        }
    }

    /// Default classification into the core taxonomy; call sites map
    /// recognised engine messages to `Conflict`/`NotFound` beforehand.
    pub(crate) fn into_core(self, operation: &'static str) -> CoreError {
        match self {
            Self::Transport { source } => CoreError::transport(operation, source),
            Self::Decode { source } => CoreError::decode(operation, source),
            Self::Engine { .. } => CoreError::transport(operation, self),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: serde::Deserialize<'de>"))]
struct Envelope<T> {
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    error: Option<EnvelopeError>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// HTTP JSON-RPC client with a fixed request id and optional secret token.
#[derive(Clone)]
pub(crate) struct RpcClient {
    http: reqwest::Client,
    url: String,
    secret: Option<String>,
}

impl RpcClient {
    pub(crate) fn new(
        url: String,
        secret: Option<String>,
        timeout: Duration,
    ) -> Result<Self, CoreError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| CoreError::transport("rpc_client.build", err))?;
        Ok(Self { http, url, secret })
    }

    /// Invoke `method` with `params`, prepending the secret token when
    /// configured.
    pub(crate) async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, RpcError> {
        let mut full_params = Vec::with_capacity(params.len() + 1);
        if let Some(secret) = &self.secret {
            full_params.push(json!(format!("token:{secret}")));
        }
        full_params.extend(params);

        let body = json!({
            "jsonrpc": "2.0",
            "id": REQUEST_ID,
            "method": method,
            "params": full_params,
        });

        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|source| RpcError::Transport { source })?;
        let text = response
            .text()
            .await
            .map_err(|source| RpcError::Transport { source })?;
        let envelope: Envelope<T> =
            serde_json::from_str(&text).map_err(|source| RpcError::Decode { source })?;

        if let Some(error) = envelope.error {
            return Err(RpcError::Engine {
                code: error.code,
                message: error.message,
            });
        }
        envelope.result.ok_or_else(|| RpcError::Decode {
            source: serde::de::Error::custom("response carried neither result nor error"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use downpour_core::ErrorKind;

    #[test]
    fn envelope_with_error_surfaces_engine_message() {
        let envelope: Envelope<String> = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":"downpour","error":{"code":1,"message":"File already exists"}}"#,
        )
        .expect("envelope decodes");
        let error = envelope.error.expect("error present");
        assert_eq!(error.code, 1);
        assert_eq!(error.message, "File already exists");
    }

    #[test]
    fn envelope_with_result_decodes_payload() {
        let envelope: Envelope<String> =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":"downpour","result":"gid1"}"#)
                .expect("envelope decodes");
        assert_eq!(envelope.result.as_deref(), Some("gid1"));
        assert!(envelope.error.is_none());
    }

    #[test]
    fn engine_errors_classify_as_transport_by_default() {
        let engine = RpcError::Engine {
            code: 1,
            message: "boom".to_string(),
        };
        assert_eq!(engine.engine_message(), Some("boom"));
        assert_eq!(engine.into_core("aria2.remove").kind(), ErrorKind::Transport);
    }

    #[test]
    fn decode_errors_classify_as_decode() {
        let source = serde_json::from_str::<Value>("{").unwrap_err();
        let error = RpcError::Decode { source };
        assert_eq!(
            error.into_core("aria2.tellStatus").kind(),
            ErrorKind::Decode
        );
    }
}
