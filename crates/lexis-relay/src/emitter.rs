// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-session event emitter.
//!
//! `complete` and `fail` take `self`, so once a terminal event is sent the
//! emitter is gone and nothing else can be emitted for that session.

use lexis_protocol::{Notification, ServerFrame};
use tokio::sync::mpsc;

use crate::session::StreamKind;

/// The client's outbound channel has closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelClosed;

pub struct SessionEmitter {
    kind: StreamKind,
    subject: String,
    context: Option<String>,
    outbound: mpsc::Sender<ServerFrame>,
    assembled: String,
}

impl SessionEmitter {
    /// `subject` is the word or sentence exactly as the client sent it and
    /// `context` the enrichment's reading context; every event carries both so
    /// the client can route events to the right listener.
    pub fn new(
        kind: StreamKind,
        subject: String,
        context: Option<String>,
        outbound: mpsc::Sender<ServerFrame>,
    ) -> Self {
        Self {
            kind,
            subject,
            context,
            outbound,
            assembled: String::new(),
        }
    }

    /// Forwards one chunk as a `*_STREAM_DATA` event.
    pub async fn data(&mut self, chunk: String) -> Result<(), ChannelClosed> {
        self.assembled.push_str(&chunk);
        let event = match self.kind {
            StreamKind::Enrich => Notification::EnrichStreamData {
                word: self.subject.clone(),
                context: self.context.clone(),
                content: chunk,
            },
            StreamKind::Translate => Notification::TranslateStreamData {
                sentence: self.subject.clone(),
                content: chunk,
            },
        };
        self.send(event).await
    }

    /// Everything forwarded so far.
    pub fn assembled(&self) -> &str {
        &self.assembled
    }

    /// Sends `*_STREAM_COMPLETE` carrying the assembled text.
    pub async fn complete(self) -> Result<(), ChannelClosed> {
        let content = (!self.assembled.is_empty()).then(|| self.assembled.clone());
        let event = match self.kind {
            StreamKind::Enrich => Notification::EnrichStreamComplete {
                word: self.subject.clone(),
                context: self.context.clone(),
                content,
            },
            StreamKind::Translate => Notification::TranslateStreamComplete {
                sentence: self.subject.clone(),
                translation: content,
            },
        };
        self.send(event).await
    }

    /// Sends `*_STREAM_ERROR` with a plain-language message.
    pub async fn fail(self, error: String) -> Result<(), ChannelClosed> {
        let event = match self.kind {
            StreamKind::Enrich => Notification::EnrichStreamError {
                word: self.subject.clone(),
                context: self.context.clone(),
                error,
            },
            StreamKind::Translate => Notification::TranslateStreamError {
                sentence: self.subject.clone(),
                error,
            },
        };
        self.send(event).await
    }

    async fn send(&self, event: Notification) -> Result<(), ChannelClosed> {
        self.outbound
            .send(ServerFrame::from(event))
            .await
            .map_err(|_| ChannelClosed)
    }
}
