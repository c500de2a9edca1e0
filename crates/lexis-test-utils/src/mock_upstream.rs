// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted upstream AI collaborator.
//!
//! `MockUpstream` pops one [`Script`] per `enrich`/`translate` call from a
//! FIFO queue. When the queue is empty, a single "mock response" chunk is
//! produced. Streams that are dropped before they finish are counted as
//! cancellations.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use futures::stream;
use tokio::sync::watch;

use lexis_core::{
    AdapterType, ChunkStream, EnrichRequest, HealthStatus, LexisError, PluginAdapter,
    TranslateRequest, UpstreamAdapter,
};

/// What one upstream call does.
#[derive(Debug, Clone)]
pub enum Script {
    /// Yields the chunks, then ends.
    Chunks(Vec<String>),
    /// Yields the chunks, then fails with the message.
    FailAfter(Vec<String>, String),
    /// The call itself fails before any stream exists.
    FailOpen(String),
    /// Yields the chunks, then never produces anything again.
    Hang(Vec<String>),
    /// Yields the chunks, then waits for [`MockUpstream::release`] and ends.
    Held(Vec<String>),
}

impl Script {
    pub fn chunks<S: Into<String>>(chunks: impl IntoIterator<Item = S>) -> Self {
        Self::Chunks(chunks.into_iter().map(Into::into).collect())
    }

    pub fn fail_after<S: Into<String>>(
        chunks: impl IntoIterator<Item = S>,
        error: impl Into<String>,
    ) -> Self {
        Self::FailAfter(chunks.into_iter().map(Into::into).collect(), error.into())
    }

    pub fn hang<S: Into<String>>(chunks: impl IntoIterator<Item = S>) -> Self {
        Self::Hang(chunks.into_iter().map(Into::into).collect())
    }

    pub fn held<S: Into<String>>(chunks: impl IntoIterator<Item = S>) -> Self {
        Self::Held(chunks.into_iter().map(Into::into).collect())
    }
}

enum Step {
    Chunk(String),
    Fail(String),
    Forever,
    Release(watch::Receiver<bool>),
}

/// Marks a stream finished; dropping an unfinished one counts a cancellation.
struct CancelWatch {
    cancellations: Arc<AtomicUsize>,
    finished: bool,
}

impl Drop for CancelWatch {
    fn drop(&mut self) {
        if !self.finished {
            self.cancellations.fetch_add(1, Ordering::SeqCst);
        }
    }
}

pub struct MockUpstream {
    scripts: Mutex<VecDeque<Script>>,
    enrich_calls: AtomicUsize,
    translate_calls: AtomicUsize,
    cancellations: Arc<AtomicUsize>,
    release: watch::Sender<bool>,
}

impl MockUpstream {
    pub fn new() -> Self {
        Self::with_scripts(Vec::new())
    }

    pub fn with_scripts(scripts: Vec<Script>) -> Self {
        let (release, _) = watch::channel(false);
        Self {
            scripts: Mutex::new(VecDeque::from(scripts)),
            enrich_calls: AtomicUsize::new(0),
            translate_calls: AtomicUsize::new(0),
            cancellations: Arc::new(AtomicUsize::new(0)),
            release,
        }
    }

    pub fn push(&self, script: Script) {
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(script);
    }

    /// Lets every [`Script::Held`] stream finish.
    pub fn release(&self) {
        self.release.send_replace(true);
    }

    pub fn enrich_calls(&self) -> usize {
        self.enrich_calls.load(Ordering::SeqCst)
    }

    pub fn translate_calls(&self) -> usize {
        self.translate_calls.load(Ordering::SeqCst)
    }

    /// Streams dropped before they finished.
    pub fn cancellations(&self) -> usize {
        self.cancellations.load(Ordering::SeqCst)
    }

    fn next_script(&self) -> Script {
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Script::chunks(["mock response"]))
    }

    fn open(&self) -> Result<ChunkStream, LexisError> {
        let steps: VecDeque<Step> = match self.next_script() {
            Script::FailOpen(message) => {
                return Err(LexisError::Upstream {
                    message,
                    source: None,
                });
            }
            Script::Chunks(chunks) => chunks.into_iter().map(Step::Chunk).collect(),
            Script::FailAfter(chunks, error) => chunks
                .into_iter()
                .map(Step::Chunk)
                .chain([Step::Fail(error)])
                .collect(),
            Script::Hang(chunks) => chunks
                .into_iter()
                .map(Step::Chunk)
                .chain([Step::Forever])
                .collect(),
            Script::Held(chunks) => chunks
                .into_iter()
                .map(Step::Chunk)
                .chain([Step::Release(self.release.subscribe())])
                .collect(),
        };
        let guard = CancelWatch {
            cancellations: Arc::clone(&self.cancellations),
            finished: false,
        };

        Ok(Box::pin(stream::unfold(
            (steps, guard),
            |(mut steps, mut guard)| async move {
                loop {
                    match steps.pop_front() {
                        None => {
                            guard.finished = true;
                            return None;
                        }
                        Some(Step::Chunk(chunk)) => return Some((Ok(chunk), (steps, guard))),
                        Some(Step::Fail(message)) => {
                            guard.finished = true;
                            let err = LexisError::Upstream {
                                message,
                                source: None,
                            };
                            return Some((Err(err), (steps, guard)));
                        }
                        Some(Step::Forever) => std::future::pending::<()>().await,
                        Some(Step::Release(mut released)) => {
                            let _ = released.wait_for(|r| *r).await;
                        }
                    }
                }
            },
        )))
    }
}

impl Default for MockUpstream {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockUpstream {
    fn name(&self) -> &str {
        "mock-upstream"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Upstream
    }

    async fn health_check(&self) -> Result<HealthStatus, LexisError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LexisError> {
        Ok(())
    }
}

#[async_trait]
impl UpstreamAdapter for MockUpstream {
    async fn enrich(&self, _request: EnrichRequest) -> Result<ChunkStream, LexisError> {
        self.enrich_calls.fetch_add(1, Ordering::SeqCst);
        self.open()
    }

    async fn translate(&self, _request: TranslateRequest) -> Result<ChunkStream, LexisError> {
        self.translate_calls.fetch_add(1, Ordering::SeqCst);
        self.open()
    }
}
