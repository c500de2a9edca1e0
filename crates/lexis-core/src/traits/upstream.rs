// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Upstream AI collaborator trait for word enrichment and translation.

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::error::LexisError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{EnrichRequest, TranslateRequest};

/// Ordered text chunks produced by a slow upstream generation.
///
/// Dropping the stream cancels the upstream call.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<String, LexisError>> + Send>>;

/// Adapter for the AI service that generates enrichments and translations.
#[async_trait]
pub trait UpstreamAdapter: PluginAdapter {
    /// Starts an enrichment for a word in its reading context.
    async fn enrich(&self, request: EnrichRequest) -> Result<ChunkStream, LexisError>;

    /// Starts a translation of a sentence, optionally with its paragraph.
    async fn translate(&self, request: TranslateRequest) -> Result<ChunkStream, LexisError>;
}
