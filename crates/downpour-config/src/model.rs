//! Settings model and environment loader.

use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, ConfigResult};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:6800/jsonrpc";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_RPC_TIMEOUT_MS: u64 = 3_000;
const DEFAULT_POLL_MS: u64 = 1_000;

/// Log output encoding selected via `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable single-line output.
    #[default]
    Text,
    /// Structured JSON output.
    Json,
}

/// Resolved runtime settings for the control plane.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL for the engine JSON-RPC endpoint.
    pub rpc_url: String,
    /// Token prepended to RPC params, when configured.
    pub rpc_secret: Option<String>,
    /// Per-RPC HTTP timeout.
    pub rpc_timeout: Duration,
    /// Progress poll period.
    pub poll_interval: Duration,
    /// Bearer token required on the API surface.
    pub api_token: String,
    /// Log output encoding.
    pub log_format: LogFormat,
    /// SQL DSN for the persistent repository; in-memory when absent.
    pub store_dsn: Option<String>,
    /// Socket address for the API listener.
    pub bind_addr: SocketAddr,
}

impl Settings {
    /// Load settings from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when `API_TOKEN` is missing or any variable fails
    /// validation.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings via a caller-provided lookup, used by tests.
    ///
    /// # Errors
    ///
    /// Returns an error when `API_TOKEN` is missing or any variable fails
    /// validation.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_token = lookup("API_TOKEN")
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or(ConfigError::MissingEnv { name: "API_TOKEN" })?;

        let rpc_url = lookup("RPC_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
        if !rpc_url.starts_with("http://") && !rpc_url.starts_with("https://") {
            return Err(ConfigError::InvalidField {
                name: "RPC_URL",
                reason: "scheme_not_http",
                value: Some(rpc_url),
            });
        }

        let rpc_secret = lookup("RPC_SECRET").filter(|secret| !secret.is_empty());

        let rpc_timeout =
            Duration::from_millis(parse_millis(&lookup, "RPC_TIMEOUT_MS", DEFAULT_RPC_TIMEOUT_MS)?);
        let poll_interval =
            Duration::from_millis(parse_millis(&lookup, "POLL_MS", DEFAULT_POLL_MS)?);

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("") | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::InvalidField {
                    name: "LOG_FORMAT",
                    reason: "unknown_format",
                    value: Some(other.to_string()),
                });
            }
        };

        let store_dsn = lookup("STORE_DSN").filter(|dsn| !dsn.is_empty());
        if store_dsn.is_none() {
            warn!("STORE_DSN not set; downloads will not survive a restart");
        }

        let bind_value =
            lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr =
            bind_value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidField {
                    name: "BIND_ADDR",
                    reason: "not_a_socket_addr",
                    value: Some(bind_value.clone()),
                })?;

        Ok(Self {
            rpc_url,
            rpc_secret,
            rpc_timeout,
            poll_interval,
            api_token,
            log_format,
            store_dsn,
            bind_addr,
        })
    }
}

fn parse_millis<F>(lookup: &F, name: &'static str, default: u64) -> ConfigResult<u64>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(default);
            }
            let parsed: u64 = trimmed.parse().map_err(|_| ConfigError::InvalidField {
                name,
                reason: "not_a_number",
                value: Some(raw.clone()),
            })?;
            if parsed == 0 {
                return Err(ConfigError::InvalidField {
                    name,
                    reason: "zero",
                    value: Some(raw),
                });
            }
            Ok(parsed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        move |name| map.get(name).map(|value| (*value).to_string())
    }

    #[test]
    fn defaults_applied_when_only_token_is_set() {
        let settings = Settings::from_lookup(lookup_from(&[("API_TOKEN", "secret")]))
            .expect("settings should load");
        assert_eq!(settings.rpc_url, DEFAULT_RPC_URL);
        assert_eq!(settings.rpc_timeout, Duration::from_millis(3_000));
        assert_eq!(settings.poll_interval, Duration::from_millis(1_000));
        assert_eq!(settings.log_format, LogFormat::Text);
        assert!(settings.rpc_secret.is_none());
        assert!(settings.store_dsn.is_none());
        assert_eq!(settings.bind_addr.port(), 8080);
    }

    #[test]
    fn missing_api_token_is_rejected() {
        let err = Settings::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv { name: "API_TOKEN" }));
    }

    #[test]
    fn overrides_are_honoured() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("API_TOKEN", "secret"),
            ("RPC_URL", "https://aria2.internal:6800/jsonrpc"),
            ("RPC_SECRET", "s3cr3t"),
            ("RPC_TIMEOUT_MS", "500"),
            ("POLL_MS", "250"),
            ("LOG_FORMAT", "json"),
            ("STORE_DSN", "postgres://localhost/downpour"),
            ("BIND_ADDR", "127.0.0.1:9090"),
        ]))
        .expect("settings should load");
        assert_eq!(settings.rpc_url, "https://aria2.internal:6800/jsonrpc");
        assert_eq!(settings.rpc_secret.as_deref(), Some("s3cr3t"));
        assert_eq!(settings.rpc_timeout, Duration::from_millis(500));
        assert_eq!(settings.poll_interval, Duration::from_millis(250));
        assert_eq!(settings.log_format, LogFormat::Json);
        assert_eq!(
            settings.store_dsn.as_deref(),
            Some("postgres://localhost/downpour")
        );
        assert_eq!(settings.bind_addr.port(), 9090);
    }

    #[test]
    fn malformed_numbers_and_formats_are_rejected() {
        let err = Settings::from_lookup(lookup_from(&[
            ("API_TOKEN", "secret"),
            ("POLL_MS", "often"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidField {
                name: "POLL_MS",
                reason: "not_a_number",
                ..
            }
        ));

        let err = Settings::from_lookup(lookup_from(&[
            ("API_TOKEN", "secret"),
            ("RPC_TIMEOUT_MS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidField {
                name: "RPC_TIMEOUT_MS",
                reason: "zero",
                ..
            }
        ));

        let err = Settings::from_lookup(lookup_from(&[
            ("API_TOKEN", "secret"),
            ("LOG_FORMAT", "yaml"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidField {
                name: "LOG_FORMAT",
                reason: "unknown_format",
                ..
            }
        ));

        let err = Settings::from_lookup(lookup_from(&[
            ("API_TOKEN", "secret"),
            ("RPC_URL", "ftp://mirror/jsonrpc"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidField {
                name: "RPC_URL",
                reason: "scheme_not_http",
                ..
            }
        ));
    }
}
