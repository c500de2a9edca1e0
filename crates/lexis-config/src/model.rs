// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level Lexis configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LexisConfig {
    /// Process identity and logging.
    #[serde(default)]
    pub server: ServerConfig,

    /// WebSocket gateway that hosts client contexts.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// SQLite vocabulary store.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Anthropic upstream for enrichment and translation.
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    /// Passive-encounter policy.
    #[serde(default)]
    pub familiarity: FamiliarityConfig,

    /// Streaming relay settings.
    #[serde(default)]
    pub relay: RelayConfig,
}

impl LexisConfig {
    /// Copy with every secret replaced, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.gateway.bearer_token.is_some() {
            copy.gateway.bearer_token = Some("[redacted]".to_string());
        }
        if copy.anthropic.api_key.is_some() {
            copy.anthropic.api_key = Some("[redacted]".to_string());
        }
        copy
    }
}

/// Process identity and logging.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Display name used in logs and the health endpoint.
    #[serde(default = "default_server_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_server_name() -> String {
    "lexis".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// WebSocket gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// When set, WebSocket clients must connect with `?token=<value>`.
    #[serde(default)]
    pub bearer_token: Option<String>,

    /// Outbound frames buffered per client before it counts as stalled.
    #[serde(default = "default_client_buffer")]
    pub client_buffer: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
            bearer_token: None,
            client_buffer: default_client_buffer(),
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    7878
}

fn default_client_buffer() -> usize {
    256
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("lexis").join("lexis.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("lexis.db"))
        .display()
        .to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Anthropic API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnthropicConfig {
    /// API key. `None` falls back to the `ANTHROPIC_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model used for enrichment and translation.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Maximum tokens to generate per response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Anthropic API version header.
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_model: default_model(),
            max_tokens: default_max_tokens(),
            api_version: default_api_version(),
        }
    }
}

fn default_model() -> String {
    "claude-haiku-4-5-20251001".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

/// Passive-encounter policy for automatic familiarity increases.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FamiliarityConfig {
    /// Encounters of a family needed before its level is raised by one.
    #[serde(default = "default_encounter_threshold")]
    pub encounter_threshold: u32,

    /// Sliding window in seconds. Absent means cumulative counting.
    #[serde(default)]
    pub encounter_window_secs: Option<u64>,
}

impl Default for FamiliarityConfig {
    fn default() -> Self {
        Self {
            encounter_threshold: default_encounter_threshold(),
            encounter_window_secs: None,
        }
    }
}

fn default_encounter_threshold() -> u32 {
    3
}

/// Streaming relay configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    /// Seconds without a chunk before a session ends with a stream error.
    #[serde(default = "default_stream_timeout_secs")]
    pub stream_timeout_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            stream_timeout_secs: default_stream_timeout_secs(),
        }
    }
}

fn default_stream_timeout_secs() -> u64 {
    120
}
