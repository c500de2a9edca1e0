// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The process-wide message router.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use lexis_core::{
    ClientId, FamiliarityRecord, LexisError, PersistenceAdapter, UpstreamAdapter, WordFamily,
};
use lexis_familiarity::{EncounterTracker, merge};
use lexis_protocol::{Request, Response, decode_request};
use lexis_relay::StreamRelay;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::cache::{FamiliarityCache, FamilySlot};
use crate::registry::ClientRegistry;
use crate::settings::RouterSettings;

/// Single authoritative dispatcher for the background context.
///
/// Construct once at startup with the collaborators injected, then share the
/// `Arc` with whatever hosts the message loop. Only the router touches the
/// familiarity cache or the persistence collaborator.
pub struct MessageRouter {
    pub(crate) persistence: Arc<dyn PersistenceAdapter>,
    pub(crate) upstream: Arc<dyn UpstreamAdapter>,
    pub(crate) cache: FamiliarityCache,
    pub(crate) encounters: Mutex<EncounterTracker>,
    pub(crate) clients: ClientRegistry,
    pub(crate) relay: StreamRelay,
    pub(crate) settings: RouterSettings,
    pub(crate) shutdown: CancellationToken,
}

impl MessageRouter {
    pub fn new(
        persistence: Arc<dyn PersistenceAdapter>,
        upstream: Arc<dyn UpstreamAdapter>,
        settings: RouterSettings,
    ) -> Arc<Self> {
        info!(
            persistence = persistence.name(),
            upstream = upstream.name(),
            encounter_threshold = settings.encounter.threshold,
            "message router ready"
        );
        Arc::new(Self {
            persistence,
            upstream,
            cache: FamiliarityCache::new(),
            encounters: Mutex::new(EncounterTracker::new(settings.encounter)),
            clients: ClientRegistry::new(),
            relay: StreamRelay::new(settings.stream_timeout),
            settings,
            shutdown: CancellationToken::new(),
        })
    }

    /// Decodes one envelope from `client` and answers it.
    ///
    /// Never fails: every error becomes `{success:false, error}` with a
    /// plain-language message.
    pub async fn handle(&self, client: &ClientId, envelope: serde_json::Value) -> Response {
        let request = match decode_request(envelope) {
            Ok(request) => request,
            Err(err) => {
                warn!(client_id = %client, error = %err, "rejected envelope");
                return Response::failure(&err);
            }
        };

        let kind = request.kind();
        debug!(client_id = %client, %kind, "dispatching");
        let result = self.dispatch(client, request).await;
        if let Err(err) = &result {
            match err {
                LexisError::Persistence { .. } => {
                    error!(client_id = %client, %kind, error = %err, "persistence failure")
                }
                _ => warn!(client_id = %client, %kind, error = %err, "request failed"),
            }
        }
        Response::from(result)
    }

    /// Fixed handler table, one arm per request kind.
    async fn dispatch(&self, client: &ClientId, request: Request) -> Result<Response, LexisError> {
        match request {
            Request::QueryWordsStatus { words } => self.query_words_status(&words).await,
            Request::GetWordDetails { word } => self.get_word_details(&word).await,
            Request::GetInternalDefinition { word } => self.get_internal_definition(&word).await,
            Request::UpdateWordStatus(update) => self.update_word_status(&update).await,
            Request::IgnoreWord { word } => self.ignore_word(&word).await,
            Request::BatchIgnoreWords { words } => self.batch_ignore_words(&words).await,
            Request::BatchUpdateWordStatus { updates } => {
                self.batch_update_word_status(&updates).await
            }
            Request::EnrichWord(payload) => self.enrich_word(client, &payload).await,
            Request::EnrichWordStream(payload) => self.enrich_word_stream(client, payload).await,
            Request::TranslateSentence(payload) => self.translate_sentence(client, &payload).await,
            Request::TranslateSentenceStream(payload) => {
                self.translate_sentence_stream(client, payload).await
            }
        }
    }

    /// Resolves a word that is about to be written; no family is a per-item error.
    pub(crate) async fn family_for_write(&self, word: &str) -> Result<WordFamily, LexisError> {
        self.persistence
            .family_by_word(word)
            .await?
            .ok_or_else(|| LexisError::Validation(format!("no word family for `{}`", word.trim())))
    }

    /// Current record for a locked family, reconciling cache and store.
    pub(crate) async fn current_record(
        &self,
        family: &WordFamily,
        slot: &FamilySlot,
    ) -> Result<FamiliarityRecord, LexisError> {
        let stored = self.persistence.get_familiarity(family.id).await?;
        Ok(match (**slot, stored) {
            (Some(cached), Some(stored)) => merge(&cached, &stored),
            (Some(cached), None) => cached,
            (None, Some(stored)) => stored,
            (None, None) => FamiliarityRecord::unseen(),
        })
    }

    /// Record for a read-only lookup; served from cache when present.
    pub(crate) async fn read_record(
        &self,
        family: &WordFamily,
    ) -> Result<FamiliarityRecord, LexisError> {
        let mut slot = self.cache.lock(family.id).await;
        if let Some(cached) = *slot {
            return Ok(cached);
        }
        let record = self
            .persistence
            .get_familiarity(family.id)
            .await?
            .unwrap_or_else(FamiliarityRecord::unseen);
        *slot = Some(record);
        Ok(record)
    }

    /// Persists `next` and publishes it to the cache slot.
    pub(crate) async fn commit(
        &self,
        family: &WordFamily,
        slot: &mut FamilySlot,
        next: FamiliarityRecord,
    ) -> Result<(), LexisError> {
        self.persistence.upsert_familiarity(family.id, &next).await?;
        **slot = Some(next);
        debug!(family_id = family.id, level = next.level.get(), "familiarity committed");
        Ok(())
    }

    /// Counts an encounter and reports whether the family just became eligible.
    pub(crate) fn record_encounter(&self, family: &WordFamily) -> bool {
        self.encounters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(family.id, Utc::now())
    }

    pub(crate) fn forget_encounters(&self, family: &WordFamily) {
        self.encounters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .forget(family.id);
    }

    /// Live client contexts.
    pub fn connected_clients(&self) -> usize {
        self.clients.len()
    }

    /// Stream sessions still relaying.
    pub fn active_streams(&self) -> usize {
        self.relay.active_sessions()
    }

    pub fn settings(&self) -> RouterSettings {
        self.settings
    }

    /// Tears down every client and stream, then waits for sessions to stop.
    pub async fn shutdown(&self) {
        info!(clients = self.clients.len(), streams = self.relay.active_sessions(), "router shutting down");
        self.shutdown.cancel();
        self.relay.shutdown().await;
    }
}
