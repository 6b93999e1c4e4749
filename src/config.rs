use crate::error::{ChainwatchError, Result};
use std::env;
use url::Url;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend endpoints
    pub server: ServerConfig,
    /// Session timing knobs
    pub session: SessionConfig,
    /// Optional analysis to start automatically once connected
    pub analysis: Option<AnalysisConfig>,
    /// Logging configuration
    pub log: LogConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// WebSocket endpoint of the analysis backend
    pub ws_url: Url,
    /// Base URL for side-channel fragment fetches
    pub http_url: Url,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Delay before a reconnect attempt after the socket drops (milliseconds)
    pub reconnect_delay_ms: u64,
    /// Grace delay between a successful open and submit re-enablement (milliseconds)
    pub submit_grace_ms: u64,
    /// How long the positive connection banner stays up (seconds)
    pub banner_ttl_secs: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Root address to analyze
    pub address: String,
    /// Number of layers to expand
    pub layers: u32,
    /// RTO threshold passed through to the backend
    pub rto_threshold: f64,
    /// Whether to run in manual disambiguation mode
    pub manual: bool,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level (debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            server: ServerConfig {
                ws_url: parse_endpoint(
                    "SERVER_WS_URL",
                    "ws://127.0.0.1:8000/ws/connect/",
                    &["ws", "wss"],
                )?,
                http_url: parse_endpoint(
                    "SERVER_HTTP_URL",
                    "http://127.0.0.1:8000/",
                    &["http", "https"],
                )?,
            },
            session: SessionConfig {
                reconnect_delay_ms: get_env_or("RECONNECT_DELAY_MS", "2000")
                    .parse()
                    .map_err(|_| {
                        ChainwatchError::InvalidConfig(
                            "RECONNECT_DELAY_MS must be a valid number".into(),
                        )
                    })?,
                submit_grace_ms: get_env_or("SUBMIT_GRACE_MS", "500").parse().map_err(|_| {
                    ChainwatchError::InvalidConfig("SUBMIT_GRACE_MS must be a valid number".into())
                })?,
                banner_ttl_secs: get_env_or("BANNER_TTL_SECS", "3").parse().unwrap_or(3),
            },
            analysis: parse_analysis()?,
            log: LogConfig {
                level: get_env_or("LOG_LEVEL", "info"),
                format: get_env_or("LOG_FORMAT", "pretty"),
            },
        })
    }
}

fn parse_endpoint(key: &str, default: &str, schemes: &[&str]) -> Result<Url> {
    let raw = get_env_or(key, default);
    let url = Url::parse(&raw)
        .map_err(|e| ChainwatchError::InvalidConfig(format!("{} must be a valid URL: {}", key, e)))?;

    if !schemes.contains(&url.scheme()) {
        return Err(ChainwatchError::InvalidConfig(format!(
            "{} has unsupported scheme: {} (expected one of {:?})",
            key,
            url.scheme(),
            schemes
        )));
    }
    if url.host_str().is_none() {
        return Err(ChainwatchError::InvalidConfig(format!(
            "{} must include a host",
            key
        )));
    }

    Ok(url)
}

/// An analysis auto-start is configured by setting CHAINWATCH_ADDRESS;
/// the remaining knobs fall back to defaults.
fn parse_analysis() -> Result<Option<AnalysisConfig>> {
    let address = env::var("CHAINWATCH_ADDRESS").unwrap_or_default();
    let address = address.trim();
    if address.is_empty() {
        return Ok(None);
    }

    let layers: u32 = get_env_or("CHAINWATCH_LAYERS", "2").parse().map_err(|_| {
        ChainwatchError::InvalidConfig("CHAINWATCH_LAYERS must be a valid number".into())
    })?;
    if layers == 0 {
        return Err(ChainwatchError::InvalidConfig(
            "CHAINWATCH_LAYERS must be at least 1".into(),
        ));
    }

    let rto_threshold: f64 = get_env_or("CHAINWATCH_RTO", "0").parse().map_err(|_| {
        ChainwatchError::InvalidConfig("CHAINWATCH_RTO must be a valid number".into())
    })?;

    Ok(Some(AnalysisConfig {
        address: address.to_string(),
        layers,
        rto_threshold,
        manual: get_env_or("CHAINWATCH_MANUAL", "false").parse().unwrap_or(false),
    }))
}

/// Get environment variable with a default value
fn get_env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
