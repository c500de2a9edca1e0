// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Enrichment and translation, collected or streamed.

use std::future::Future;
use std::sync::Arc;

use futures::StreamExt;
use lexis_core::{ChunkStream, ClientId, EnrichRequest, LexisError, TranslateRequest};
use lexis_protocol::{EnrichPayload, Response, TranslatePayload};
use lexis_relay::{SessionKey, StartOutcome, StreamTarget};
use serde_json::json;
use tracing::{debug, warn};

use crate::router::MessageRouter;

impl MessageRouter {
    pub(crate) async fn enrich_word(
        &self,
        client: &ClientId,
        payload: &EnrichPayload,
    ) -> Result<Response, LexisError> {
        require("word", &payload.word)?;
        self.encounter_by_word(&payload.word).await;
        let content = self
            .collect_for(client, self.upstream.enrich(enrich_request(payload)))
            .await?;
        Ok(Response::with_data(json!({
            "word": payload.word,
            "content": content,
            "source": "ai",
        })))
    }

    pub(crate) async fn translate_sentence(
        &self,
        client: &ClientId,
        payload: &TranslatePayload,
    ) -> Result<Response, LexisError> {
        require("sentence", &payload.sentence)?;
        let translation = self
            .collect_for(client, self.upstream.translate(translate_request(payload)))
            .await?;
        Ok(Response::with_data(json!({
            "sentence": payload.sentence,
            "translation": translation,
        })))
    }

    pub(crate) async fn enrich_word_stream(
        &self,
        client: &ClientId,
        payload: EnrichPayload,
    ) -> Result<Response, LexisError> {
        require("word", &payload.word)?;
        let target = self.stream_target(client)?;
        self.encounter_by_word(&payload.word).await;

        let key = SessionKey::enrich(client.clone(), &payload.word, payload.context.as_deref());
        let upstream = Arc::clone(&self.upstream);
        let request = enrich_request(&payload);
        let outcome = self.relay.start(key, payload.word, &target, async move {
            upstream.enrich(request).await
        });
        Ok(stream_response(outcome))
    }

    pub(crate) async fn translate_sentence_stream(
        &self,
        client: &ClientId,
        payload: TranslatePayload,
    ) -> Result<Response, LexisError> {
        require("sentence", &payload.sentence)?;
        let target = self.stream_target(client)?;

        let key = SessionKey::translate(client.clone(), &payload.sentence);
        let upstream = Arc::clone(&self.upstream);
        let request = translate_request(&payload);
        let outcome = self.relay.start(key, payload.sentence, &target, async move {
            upstream.translate(request).await
        });
        Ok(stream_response(outcome))
    }

    fn stream_target(&self, client: &ClientId) -> Result<StreamTarget, LexisError> {
        self.clients
            .stream_target(client)
            .ok_or_else(|| LexisError::Internal(format!("client {client} is not connected")))
    }

    async fn encounter_by_word(&self, word: &str) {
        match self.persistence.family_by_word(word).await {
            Ok(Some(family)) => self.note_encounter(word, &family).await,
            Ok(None) => {}
            Err(err) => warn!(error = %err, "encounter lookup failed"),
        }
    }

    /// Opens and drains an upstream stream on behalf of `client`.
    ///
    /// The upstream call is dropped as soon as the client disconnects.
    async fn collect_for<F>(&self, client: &ClientId, open: F) -> Result<String, LexisError>
    where
        F: Future<Output = Result<ChunkStream, LexisError>>,
    {
        let cancel = self.clients.cancel_token(client).unwrap_or_default();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(client_id = %client, "client disconnected, upstream call dropped");
                Err(LexisError::StreamCancelled)
            }
            collected = async { self.collect(open.await?).await } => collected,
        }
    }

    /// Drains a stream into one string, bounded by the inactivity timeout.
    async fn collect(&self, mut stream: ChunkStream) -> Result<String, LexisError> {
        let timeout = self.settings.stream_timeout;
        let mut text = String::new();
        loop {
            match tokio::time::timeout(timeout, stream.next()).await {
                Err(_) => return Err(LexisError::Timeout { duration: timeout }),
                Ok(None) => return Ok(text),
                Ok(Some(chunk)) => text.push_str(&chunk?),
            }
        }
    }
}

fn require(field: &str, value: &str) -> Result<(), LexisError> {
    if value.trim().is_empty() {
        return Err(LexisError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

fn enrich_request(payload: &EnrichPayload) -> EnrichRequest {
    EnrichRequest {
        word: payload.word.trim().to_string(),
        context: payload.context.clone(),
        options: payload.options(),
    }
}

fn translate_request(payload: &TranslatePayload) -> TranslateRequest {
    TranslateRequest {
        sentence: payload.sentence.trim().to_string(),
        paragraph: payload.paragraph.clone(),
    }
}

fn stream_response(outcome: StartOutcome) -> Response {
    match outcome {
        StartOutcome::Started => Response::ok().message("stream started"),
        StartOutcome::Coalesced => Response::ok().message("stream already in progress"),
    }
}
