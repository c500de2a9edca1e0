// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The content-script side of the message boundary.
//!
//! A [`ContentScriptClient`] owns one reader task. The reader routes
//! responses to the pending request that asked for them, folds familiarity
//! notifications into the [`LocalVocabulary`], hands stream events to
//! their subscriptions, and republishes every notification to listeners.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use lexis_core::{FamiliarityStatus, LexisError, WordFamilyInfo};
use lexis_protocol::{
    BatchUpdateEntry, ClientFrame, EnrichPayload, Notification, Request, RequestId, Response,
    ServerFrame, TranslatePayload, WordStatusUpdate,
};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::subscription::{StreamSubject, StreamSubscription, SubscriptionTable};
use crate::vocabulary::LocalVocabulary;

const LISTENER_CAPACITY: usize = 64;

#[derive(Debug)]
struct Shared {
    pending: Mutex<HashMap<RequestId, oneshot::Sender<Response>>>,
    vocabulary: RwLock<LocalVocabulary>,
    subscriptions: Arc<Mutex<SubscriptionTable>>,
    listeners: broadcast::Sender<Notification>,
    closed: AtomicBool,
}

impl Shared {
    fn teardown(&self) {
        self.closed.store(true, Ordering::SeqCst);
        // Dropping the senders wakes every waiter with a closed channel.
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn on_frame(&self, frame: ServerFrame) {
        match frame {
            ServerFrame::Response {
                request_id,
                response,
            } => {
                let waiter = self
                    .pending
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .remove(&request_id);
                match waiter {
                    Some(tx) => {
                        let _ = tx.send(response);
                    }
                    None => debug!(request_id, "response for unknown request"),
                }
            }
            ServerFrame::Notification { notification } => {
                self.vocabulary
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .apply(&notification);
                self.subscriptions
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .dispatch(&notification);
                // No listeners is fine.
                let _ = self.listeners.send(notification);
            }
        }
    }
}

/// One page context's connection to the background coordinator.
///
/// Dropping the client tears it down: the reader stops, pending requests
/// fail with [`LexisError::StreamCancelled`], subscriptions end, and the
/// background sees the channel close.
#[derive(Debug)]
pub struct ContentScriptClient {
    outbound: mpsc::Sender<ClientFrame>,
    next_id: AtomicU64,
    shared: Arc<Shared>,
    reader: JoinHandle<()>,
}

impl ContentScriptClient {
    /// Builds a client over an already-established frame channel pair.
    pub fn from_channels(
        outbound: mpsc::Sender<ClientFrame>,
        mut inbound: mpsc::Receiver<ServerFrame>,
    ) -> Self {
        let (listeners, _) = broadcast::channel(LISTENER_CAPACITY);
        let shared = Arc::new(Shared {
            pending: Mutex::new(HashMap::new()),
            vocabulary: RwLock::new(LocalVocabulary::new()),
            subscriptions: Arc::new(Mutex::new(SubscriptionTable::default())),
            listeners,
            closed: AtomicBool::new(false),
        });

        let reader_shared = Arc::clone(&shared);
        let reader = tokio::spawn(async move {
            while let Some(frame) = inbound.recv().await {
                reader_shared.on_frame(frame);
            }
            debug!("background channel closed");
            reader_shared.teardown();
        });

        Self {
            outbound,
            next_id: AtomicU64::new(1),
            shared,
            reader,
        }
    }

    /// Sends a request and waits for its correlated response.
    ///
    /// Fails only when the connection is gone; a `success: false` response
    /// is returned as-is.
    pub async fn request(&self, request: Request) -> Result<Response, LexisError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let frame = ClientFrame::new(id, &request)
            .map_err(|e| LexisError::Internal(format!("failed to encode request: {e}")))?;

        let (tx, rx) = oneshot::channel();
        self.shared
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, tx);
        if self.shared.closed.load(Ordering::SeqCst) || self.outbound.send(frame).await.is_err() {
            self.forget(id);
            return Err(LexisError::StreamCancelled);
        }
        rx.await.map_err(|_| LexisError::StreamCancelled)
    }

    fn forget(&self, id: RequestId) {
        self.shared
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }

    /// Queries familiarity for every word and seeds the local vocabulary.
    pub async fn query_words_status<S: AsRef<str>>(
        &self,
        words: &[S],
    ) -> Result<HashMap<String, WordFamilyInfo>, LexisError> {
        let words: Vec<String> = words.iter().map(|w| w.as_ref().to_string()).collect();
        let response = accepted(self.request(Request::QueryWordsStatus { words }).await?)?;
        let statuses: HashMap<String, WordFamilyInfo> = serde_json::from_value(
            response.data.unwrap_or_default(),
        )
        .map_err(|e| LexisError::Internal(format!("unexpected status map: {e}")))?;

        let mut vocabulary = self
            .shared
            .vocabulary
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        for (word, info) in &statuses {
            vocabulary.seed(word, info.clone());
        }
        Ok(statuses)
    }

    pub async fn update_word_status(
        &self,
        word: &str,
        status: Option<FamiliarityStatus>,
        familiarity_level: Option<u8>,
    ) -> Result<Response, LexisError> {
        self.request(Request::UpdateWordStatus(WordStatusUpdate {
            word: word.to_string(),
            status,
            familiarity_level,
        }))
        .await
    }

    pub async fn batch_update_word_status(
        &self,
        updates: Vec<BatchUpdateEntry>,
    ) -> Result<Response, LexisError> {
        self.request(Request::BatchUpdateWordStatus { updates }).await
    }

    pub async fn ignore_word(&self, word: &str) -> Result<Response, LexisError> {
        self.request(Request::IgnoreWord {
            word: word.to_string(),
        })
        .await
    }

    pub async fn batch_ignore_words<S: AsRef<str>>(
        &self,
        words: &[S],
    ) -> Result<Response, LexisError> {
        let words = words.iter().map(|w| w.as_ref().to_string()).collect();
        self.request(Request::BatchIgnoreWords { words }).await
    }

    pub async fn get_internal_definition(&self, word: &str) -> Result<Response, LexisError> {
        self.request(Request::GetInternalDefinition {
            word: word.to_string(),
        })
        .await
    }

    pub async fn get_word_details(&self, word: &str) -> Result<Response, LexisError> {
        self.request(Request::GetWordDetails {
            word: word.to_string(),
        })
        .await
    }

    pub async fn enrich_word(&self, payload: EnrichPayload) -> Result<Response, LexisError> {
        self.request(Request::EnrichWord(payload)).await
    }

    pub async fn translate_sentence(
        &self,
        payload: TranslatePayload,
    ) -> Result<Response, LexisError> {
        self.request(Request::TranslateSentence(payload)).await
    }

    /// Starts (or joins) an enrichment stream for a word.
    ///
    /// The subscription is registered before the request is sent so no
    /// early chunk is missed.
    pub async fn enrich_stream(
        &self,
        payload: EnrichPayload,
    ) -> Result<StreamSubscription, LexisError> {
        let subscription = StreamSubscription::register(
            &self.shared.subscriptions,
            StreamSubject::enrich(&payload.word, payload.context.as_deref()),
        );
        accepted(self.request(Request::EnrichWordStream(payload)).await?)?;
        Ok(subscription)
    }

    /// Starts (or joins) a translation stream for a sentence.
    pub async fn translate_stream(
        &self,
        payload: TranslatePayload,
    ) -> Result<StreamSubscription, LexisError> {
        let subscription = StreamSubscription::register(
            &self.shared.subscriptions,
            StreamSubject::translate(&payload.sentence),
        );
        accepted(self.request(Request::TranslateSentenceStream(payload)).await?)?;
        Ok(subscription)
    }

    /// Every notification received from now on.
    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.shared.listeners.subscribe()
    }

    /// The last known familiarity of a word, if it was ever queried or
    /// touched by a notification.
    pub fn status_of(&self, word: &str) -> Option<WordFamilyInfo> {
        self.shared
            .vocabulary
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(word)
            .cloned()
    }

    pub fn vocabulary(&self) -> LocalVocabulary {
        self.shared
            .vocabulary
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn active_subscriptions(&self) -> usize {
        self.shared
            .subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::SeqCst) || self.outbound.is_closed()
    }

    /// Tears the client down. Equivalent to dropping it.
    pub fn close(self) {}
}

impl Drop for ContentScriptClient {
    fn drop(&mut self) {
        self.reader.abort();
        self.shared.teardown();
    }
}

fn accepted(response: Response) -> Result<Response, LexisError> {
    if response.success {
        Ok(response)
    } else {
        Err(LexisError::Rejected(
            response.error.unwrap_or_else(|| "request failed".to_string()),
        ))
    }
}
