// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session table and the per-session relay task.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::StreamExt;
use lexis_core::{ChunkStream, ClientId, LexisError};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{Instrument, debug, info_span, warn};

use crate::emitter::SessionEmitter;
use crate::session::{SessionKey, StreamTarget};

/// Whether a start request opened a new session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// An identical session was already running; no second upstream call.
    Coalesced,
}

#[derive(Debug)]
struct SessionHandle {
    id: u64,
    cancel: CancellationToken,
}

/// How a session ended, before the terminal event is sent.
enum Outcome {
    Completed,
    Failed(String),
    Cancelled,
}

/// Bridges upstream chunk streams to requesting clients.
///
/// Cloning shares the session table.
#[derive(Clone)]
pub struct StreamRelay {
    sessions: Arc<DashMap<SessionKey, SessionHandle>>,
    next_id: Arc<AtomicU64>,
    tracker: TaskTracker,
    inactivity_timeout: Duration,
}

impl StreamRelay {
    /// `inactivity_timeout` bounds the wait for the stream to open and for
    /// every chunk after it.
    pub fn new(inactivity_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicU64::new(1)),
            tracker: TaskTracker::new(),
            inactivity_timeout,
        }
    }

    /// Opens a session for `key`, or joins the running one.
    ///
    /// `open` produces the upstream stream; it runs inside the session task so
    /// the caller can answer its request right away. `subject` and the key's
    /// context are echoed on every event.
    pub fn start<F>(
        &self,
        key: SessionKey,
        subject: String,
        target: &StreamTarget,
        open: F,
    ) -> StartOutcome
    where
        F: Future<Output = Result<ChunkStream, LexisError>> + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let cancel = target.cancel.child_token();

        match self.sessions.entry(key.clone()) {
            Entry::Occupied(_) => {
                debug!(client_id = %key.client, kind = %key.kind, "coalesced into running session");
                return StartOutcome::Coalesced;
            }
            Entry::Vacant(slot) => {
                slot.insert(SessionHandle {
                    id,
                    cancel: cancel.clone(),
                });
            }
        }

        let span = info_span!("relay_session", session = id, client_id = %key.client, kind = %key.kind);
        let emitter = SessionEmitter::new(
            key.kind,
            subject,
            key.context().map(str::to_string),
            target.outbound.clone(),
        );
        let watch = target.outbound.clone();
        let sessions = Arc::clone(&self.sessions);
        let timeout = self.inactivity_timeout;

        self.tracker.spawn(
            async move {
                let mut emitter = emitter;
                let outcome = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Outcome::Cancelled,
                    _ = watch.closed() => Outcome::Cancelled,
                    outcome = pump(&mut emitter, open, timeout) => outcome,
                };
                sessions.remove_if(&key, |_, handle| handle.id == id);

                let delivered = match outcome {
                    Outcome::Completed => {
                        debug!(bytes = emitter.assembled().len(), "session complete");
                        emitter.complete().await
                    }
                    Outcome::Failed(error) => {
                        warn!(%error, "session failed");
                        emitter.fail(error).await
                    }
                    Outcome::Cancelled => {
                        debug!("session cancelled, upstream dropped");
                        Ok(())
                    }
                };
                if delivered.is_err() {
                    debug!("client went away before the terminal event");
                }
            }
            .instrument(span),
        );
        StartOutcome::Started
    }

    /// Aborts every session owned by `client`. Returns how many were live.
    pub fn cancel_client(&self, client: &ClientId) -> usize {
        let keys: Vec<SessionKey> = self
            .sessions
            .iter()
            .filter(|entry| &entry.key().client == client)
            .map(|entry| entry.key().clone())
            .collect();

        let mut cancelled = 0;
        for key in keys {
            if let Some((_, handle)) = self.sessions.remove(&key) {
                handle.cancel.cancel();
                cancelled += 1;
            }
        }
        if cancelled > 0 {
            debug!(client_id = %client, cancelled, "cancelled client sessions");
        }
        cancelled
    }

    /// Number of sessions still relaying.
    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Cancels every session and waits for their tasks to finish.
    pub async fn shutdown(&self) {
        for entry in self.sessions.iter() {
            entry.value().cancel.cancel();
        }
        self.tracker.close();
        self.tracker.wait().await;
    }
}

/// Drives the upstream stream into the emitter until it ends.
async fn pump<F>(emitter: &mut SessionEmitter, open: F, timeout: Duration) -> Outcome
where
    F: Future<Output = Result<ChunkStream, LexisError>>,
{
    let timed_out = || Outcome::Failed(format!("stream timed out after {}s", timeout.as_secs()));

    let mut stream = match tokio::time::timeout(timeout, open).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(err)) => return Outcome::Failed(err.user_message()),
        Err(_) => return timed_out(),
    };

    loop {
        match tokio::time::timeout(timeout, stream.next()).await {
            Err(_) => return timed_out(),
            Ok(None) => return Outcome::Completed,
            Ok(Some(Err(err))) => return Outcome::Failed(err.user_message()),
            Ok(Some(Ok(chunk))) if chunk.is_empty() => continue,
            Ok(Some(Ok(chunk))) => {
                if emitter.data(chunk).await.is_err() {
                    return Outcome::Cancelled;
                }
            }
        }
    }
}
