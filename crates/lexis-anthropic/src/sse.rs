// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SSE stream parser for Anthropic Messages API streaming responses.
//!
//! Only the events that matter for relaying text are decoded: text deltas,
//! the stop marker and errors. Every other event is skipped.

use std::pin::Pin;

use eventsource_stream::Eventsource;
use futures::stream::{Stream, StreamExt};
use lexis_core::{ChunkStream, LexisError};

use crate::types::{SseContentBlockDelta, SseDelta, SseError};

/// Typed SSE events from the Anthropic streaming protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    TextDelta(String),
    MessageStop,
    /// API error during streaming, as `type: message`.
    Error(String),
}

pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, LexisError>> + Send>>;

fn decode_error(event: &str, e: serde_json::Error) -> LexisError {
    LexisError::Upstream {
        message: format!("failed to parse {event}: {e}"),
        source: Some(Box::new(e)),
    }
}

/// Parses a streaming response body into [`StreamEvent`]s.
///
/// Unknown event types are skipped per Anthropic's API versioning policy.
pub fn parse_sse_stream(response: reqwest::Response) -> EventStream {
    let events = response.bytes_stream().eventsource();

    let mapped = events.filter_map(|result| async move {
        match result {
            Ok(event) => match event.event.as_str() {
                "content_block_delta" => {
                    match serde_json::from_str::<SseContentBlockDelta>(&event.data) {
                        Ok(SseContentBlockDelta {
                            delta: SseDelta::TextDelta { text },
                            ..
                        }) => Some(Ok(StreamEvent::TextDelta(text))),
                        Ok(_) => None,
                        Err(e) => Some(Err(decode_error("content_block_delta", e))),
                    }
                }
                "message_stop" => Some(Ok(StreamEvent::MessageStop)),
                "error" => Some(
                    serde_json::from_str::<SseError>(&event.data)
                        .map(|e| StreamEvent::Error(format!("{}: {}", e.error.type_, e.error.message)))
                        .map_err(|e| decode_error("error event", e)),
                ),
                _ => None,
            },
            Err(e) => Some(Err(LexisError::Upstream {
                message: format!("SSE stream error: {e}"),
                source: None,
            })),
        }
    });

    Box::pin(mapped)
}

/// Narrows an event stream to relayable text chunks.
///
/// The chunk stream ends at `message_stop` or after the first error, so a
/// failed generation yields exactly one `Err` and nothing after it.
pub fn text_chunks(events: EventStream) -> ChunkStream {
    let chunks = events
        .map(|event| match event {
            Ok(StreamEvent::TextDelta(text)) => Some(Ok(text)),
            Ok(StreamEvent::MessageStop) => None,
            Ok(StreamEvent::Error(message)) => Some(Err(LexisError::Upstream {
                message,
                source: None,
            })),
            Err(e) => Some(Err(e)),
        })
        .scan(false, |failed, item| {
            let next = match item {
                _ if *failed => None,
                Some(Err(e)) => {
                    *failed = true;
                    Some(Err(e))
                }
                other => other,
            };
            futures::future::ready(next)
        });
    Box::pin(chunks)
}
