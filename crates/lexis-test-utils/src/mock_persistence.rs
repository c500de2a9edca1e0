// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory persistence collaborator with failure injection.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use lexis_core::{
    AdapterType, DictionaryEntry, FamiliarityRecord, FamilyId, HealthStatus, LexisError,
    PersistenceAdapter, PluginAdapter, TagInfo, WordFamily, normalize_word,
};

#[derive(Debug, Default)]
struct State {
    next_id: FamilyId,
    roots: HashMap<FamilyId, String>,
    words: HashMap<String, FamilyId>,
    familiarity: HashMap<FamilyId, FamiliarityRecord>,
    tags: HashMap<FamilyId, Vec<TagInfo>>,
    entries: HashMap<String, DictionaryEntry>,
}

/// A [`PersistenceAdapter`] backed by hash maps.
///
/// Reads and writes can be made to fail independently, and every successful
/// `upsert_familiarity` is counted so tests can assert that a no-op really
/// wrote nothing.
#[derive(Debug, Default)]
pub struct MockPersistence {
    state: Mutex<State>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    upserts: AtomicUsize,
}

impl MockPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a family; the root is always one of its words.
    pub fn add_family(&self, root: &str, words: &[&str]) -> FamilyId {
        let mut state = self.state();
        state.next_id += 1;
        let id = state.next_id;
        state.roots.insert(id, root.to_string());
        state.words.insert(normalize_word(root), id);
        for word in words {
            state.words.insert(normalize_word(word), id);
        }
        id
    }

    pub fn add_tag(&self, family_id: FamilyId, name: &str, description: Option<&str>) {
        self.state().tags.entry(family_id).or_default().push(TagInfo {
            name: name.to_string(),
            description: description.map(str::to_string),
        });
    }

    pub fn put_entry(&self, entry: DictionaryEntry) {
        self.state().entries.insert(normalize_word(&entry.word), entry);
    }

    /// Writes a record directly, bypassing the upsert counter.
    pub fn set_familiarity(&self, family_id: FamilyId, record: FamiliarityRecord) {
        self.state().familiarity.insert(family_id, record);
    }

    pub fn stored(&self, family_id: FamilyId) -> Option<FamiliarityRecord> {
        self.state().familiarity.get(&family_id).copied()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn upsert_count(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    fn check_read(&self) -> Result<(), LexisError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(LexisError::persistence(std::io::Error::other(
                "injected read failure",
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for MockPersistence {
    fn name(&self) -> &str {
        "mock-persistence"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Persistence
    }

    async fn health_check(&self) -> Result<HealthStatus, LexisError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LexisError> {
        Ok(())
    }
}

#[async_trait]
impl PersistenceAdapter for MockPersistence {
    async fn family_by_word(&self, word: &str) -> Result<Option<WordFamily>, LexisError> {
        self.check_read()?;
        let state = self.state();
        Ok(state.words.get(&normalize_word(word)).and_then(|id| {
            state.roots.get(id).map(|root| WordFamily {
                id: *id,
                root: root.clone(),
            })
        }))
    }

    async fn get_familiarity(
        &self,
        family_id: FamilyId,
    ) -> Result<Option<FamiliarityRecord>, LexisError> {
        self.check_read()?;
        Ok(self.stored(family_id))
    }

    async fn upsert_familiarity(
        &self,
        family_id: FamilyId,
        record: &FamiliarityRecord,
    ) -> Result<(), LexisError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(LexisError::persistence(std::io::Error::other(
                "injected write failure",
            )));
        }
        self.state().familiarity.insert(family_id, *record);
        self.upserts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn list_tags_for_family(&self, family_id: FamilyId) -> Result<Vec<TagInfo>, LexisError> {
        self.check_read()?;
        Ok(self.state().tags.get(&family_id).cloned().unwrap_or_default())
    }

    async fn dictionary_entry(&self, word: &str) -> Result<Option<DictionaryEntry>, LexisError> {
        self.check_read()?;
        Ok(self.state().entries.get(&normalize_word(word)).cloned())
    }
}
