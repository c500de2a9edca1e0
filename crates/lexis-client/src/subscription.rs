// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stream subscriptions.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use futures_core::Stream;
use lexis_core::{normalize_context, normalize_word};
use lexis_protocol::Notification;
use tokio::sync::mpsc;

/// One event of a relayed stream, as a page sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Data(String),
    /// Final content, when the background sent it.
    Complete(Option<String>),
    Error(String),
}

impl StreamEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Data(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Topic {
    Enrich,
    Translate,
}

/// What a subscription listens for. Mirrors the background's session
/// identity, so one session's events reach exactly its own subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StreamSubject {
    topic: Topic,
    subject: String,
    context: Option<String>,
}

impl StreamSubject {
    pub(crate) fn enrich(word: &str, context: Option<&str>) -> Self {
        Self {
            topic: Topic::Enrich,
            subject: normalize_word(word),
            context: normalize_context(context),
        }
    }

    pub(crate) fn translate(sentence: &str) -> Self {
        Self {
            topic: Topic::Translate,
            subject: sentence.trim().to_string(),
            context: None,
        }
    }
}

/// Matches stream notifications to the subscriptions waiting on them.
#[derive(Debug, Default)]
pub(crate) struct SubscriptionTable {
    next_id: u64,
    entries: HashMap<u64, (StreamSubject, mpsc::UnboundedSender<StreamEvent>)>,
}

impl SubscriptionTable {
    fn insert(&mut self, subject: StreamSubject, tx: mpsc::UnboundedSender<StreamEvent>) -> u64 {
        self.next_id += 1;
        self.entries.insert(self.next_id, (subject, tx));
        self.next_id
    }

    pub(crate) fn remove(&mut self, id: u64) {
        self.entries.remove(&id);
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Delivers a stream notification. Terminal events retire the matching
    /// subscriptions. Returns how many subscriptions received it.
    pub(crate) fn dispatch(&mut self, notification: &Notification) -> usize {
        let Some((subject, event)) = classify(notification) else {
            return 0;
        };
        let terminal = event.is_terminal();

        let matching: Vec<u64> = self
            .entries
            .iter()
            .filter(|(_, (s, _))| *s == subject)
            .map(|(id, _)| *id)
            .collect();
        for id in &matching {
            if let Some((_, tx)) = self.entries.get(id) {
                let _ = tx.send(event.clone());
            }
            if terminal {
                self.entries.remove(id);
            }
        }
        matching.len()
    }
}

fn classify(notification: &Notification) -> Option<(StreamSubject, StreamEvent)> {
    Some(match notification {
        Notification::EnrichStreamData {
            word,
            context,
            content,
        } => (
            StreamSubject::enrich(word, context.as_deref()),
            StreamEvent::Data(content.clone()),
        ),
        Notification::EnrichStreamComplete {
            word,
            context,
            content,
        } => (
            StreamSubject::enrich(word, context.as_deref()),
            StreamEvent::Complete(content.clone()),
        ),
        Notification::EnrichStreamError {
            word,
            context,
            error,
        } => (
            StreamSubject::enrich(word, context.as_deref()),
            StreamEvent::Error(error.clone()),
        ),
        Notification::TranslateStreamData { sentence, content } => (
            StreamSubject::translate(sentence),
            StreamEvent::Data(content.clone()),
        ),
        Notification::TranslateStreamComplete {
            sentence,
            translation,
        } => (
            StreamSubject::translate(sentence),
            StreamEvent::Complete(translation.clone()),
        ),
        Notification::TranslateStreamError { sentence, error } => (
            StreamSubject::translate(sentence),
            StreamEvent::Error(error.clone()),
        ),
        _ => return None,
    })
}

/// Events of one stream, ending after its terminal event.
///
/// Dropping the subscription deregisters it; later events for the same
/// subject are simply not delivered here.
#[derive(Debug)]
pub struct StreamSubscription {
    id: u64,
    table: Arc<Mutex<SubscriptionTable>>,
    events: mpsc::UnboundedReceiver<StreamEvent>,
    done: bool,
}

impl StreamSubscription {
    pub(crate) fn register(table: &Arc<Mutex<SubscriptionTable>>, subject: StreamSubject) -> Self {
        let (tx, events) = mpsc::unbounded_channel();
        let id = table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(subject, tx);
        Self {
            id,
            table: Arc::clone(table),
            events,
            done: false,
        }
    }

    /// Next event, or `None` once the stream has ended or the client closed.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        if self.done {
            return None;
        }
        let event = self.events.recv().await;
        self.done = event.as_ref().is_none_or(StreamEvent::is_terminal);
        event
    }

    /// Drains the stream and returns the final text.
    ///
    /// Uses the content carried by the complete event when present,
    /// otherwise the concatenated chunks.
    pub async fn collect_text(mut self) -> Result<String, String> {
        let mut text = String::new();
        while let Some(event) = self.next_event().await {
            match event {
                StreamEvent::Data(chunk) => text.push_str(&chunk),
                StreamEvent::Complete(Some(full)) => return Ok(full),
                StreamEvent::Complete(None) => return Ok(text),
                StreamEvent::Error(error) => return Err(error),
            }
        }
        Err("stream cancelled".to_string())
    }
}

impl Stream for StreamSubscription {
    type Item = StreamEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<StreamEvent>> {
        if self.done {
            return Poll::Ready(None);
        }
        let polled = self.events.poll_recv(cx);
        if let Poll::Ready(event) = &polled {
            self.done = event.as_ref().is_none_or(StreamEvent::is_terminal);
        }
        polled
    }
}

impl Drop for StreamSubscription {
    fn drop(&mut self) {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(self.id);
    }
}
