// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Claude upstream adapter for Lexis.
//!
//! This crate implements [`UpstreamAdapter`] over the streaming Messages
//! API. Each call returns a [`ChunkStream`] of text deltas; dropping the
//! stream drops the HTTP body and closes the connection.

pub mod client;
pub mod prompts;
pub mod sse;
pub mod types;

use async_trait::async_trait;
use lexis_config::model::AnthropicConfig;
use lexis_core::{
    AdapterType, ChunkStream, EnrichRequest, HealthStatus, LexisError, PluginAdapter,
    TranslateRequest, UpstreamAdapter,
};
use tracing::{debug, info};

use crate::client::AnthropicClient;
use crate::types::{ApiMessage, MessageRequest};

/// Anthropic-backed enrichment and translation.
///
/// API key resolution order: config -> `ANTHROPIC_API_KEY` env var -> error.
pub struct AnthropicUpstream {
    client: AnthropicClient,
    max_tokens: u32,
}

impl AnthropicUpstream {
    pub fn new(config: &AnthropicConfig) -> Result<Self, LexisError> {
        let api_key = resolve_api_key(config.api_key.as_deref())?;
        let client = AnthropicClient::new(
            &api_key,
            &config.api_version,
            config.default_model.clone(),
        )?;
        info!(model = %config.default_model, "Anthropic upstream initialized");
        Ok(Self::with_client(client, config.max_tokens))
    }

    pub fn with_client(client: AnthropicClient, max_tokens: u32) -> Self {
        Self { client, max_tokens }
    }

    fn request(&self, system: &str, prompt: String) -> MessageRequest {
        MessageRequest {
            model: self.client.default_model().to_string(),
            messages: vec![ApiMessage::user(prompt)],
            system: Some(system.to_string()),
            max_tokens: self.max_tokens,
            stream: true,
        }
    }
}

fn resolve_api_key(config_key: Option<&str>) -> Result<String, LexisError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.to_string());
    }

    std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
        LexisError::Config(
            "Anthropic API key not found. Set anthropic.api_key in config or ANTHROPIC_API_KEY environment variable.".into(),
        )
    })
}

#[async_trait]
impl PluginAdapter for AnthropicUpstream {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Upstream
    }

    async fn health_check(&self) -> Result<HealthStatus, LexisError> {
        // No API call: a health check should not spend tokens.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LexisError> {
        debug!("Anthropic upstream shutting down");
        Ok(())
    }
}

#[async_trait]
impl UpstreamAdapter for AnthropicUpstream {
    async fn enrich(&self, request: EnrichRequest) -> Result<ChunkStream, LexisError> {
        debug!(word = %request.word, "starting enrichment");
        let api_request = self.request(prompts::enrich_system(), prompts::enrich_prompt(&request));
        let events = self.client.stream_message(&api_request).await?;
        Ok(sse::text_chunks(events))
    }

    async fn translate(&self, request: TranslateRequest) -> Result<ChunkStream, LexisError> {
        debug!(chars = request.sentence.len(), "starting translation");
        let api_request =
            self.request(prompts::translate_system(), prompts::translate_prompt(&request));
        let events = self.client.stream_message(&api_request).await?;
        Ok(sse::text_chunks(events))
    }
}
