// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for router and end-to-end tests.
//!
//! `TestHarness` assembles one `MessageRouter` over either the in-memory
//! persistence mock or a temp SQLite database, with a scripted upstream.
//! `client()` connects a new in-process content-script client.

use std::sync::Arc;
use std::time::Duration;

use lexis_client::ContentScriptClient;
use lexis_config::model::StorageConfig;
use lexis_core::{DictionaryEntry, FamiliarityRecord, FamilyId, LexisError, PersistenceAdapter};
use lexis_router::{MessageRouter, RouterSettings};
use lexis_storage::SqliteStorage;

use crate::mock_persistence::MockPersistence;
use crate::mock_upstream::{MockUpstream, Script};

enum Backend {
    Memory(Arc<MockPersistence>),
    Sqlite {
        storage: Arc<SqliteStorage>,
        _temp_dir: tempfile::TempDir,
    },
}

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    sqlite: bool,
    scripts: Vec<Script>,
    settings: RouterSettings,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            sqlite: false,
            scripts: Vec::new(),
            settings: RouterSettings::default(),
        }
    }

    /// Use a real SQLite database in a temp directory.
    pub fn with_sqlite(mut self) -> Self {
        self.sqlite = true;
        self
    }

    /// Queue upstream scripts, consumed one per call.
    pub fn with_scripts(mut self, scripts: Vec<Script>) -> Self {
        self.scripts = scripts;
        self
    }

    pub fn with_encounter_threshold(mut self, threshold: u32) -> Self {
        self.settings.encounter.threshold = threshold;
        self
    }

    pub fn with_encounter_window(mut self, window: Duration) -> Self {
        self.settings.encounter.window = Some(window);
        self
    }

    pub fn with_stream_timeout(mut self, timeout: Duration) -> Self {
        self.settings.stream_timeout = timeout;
        self
    }

    pub fn with_client_buffer(mut self, buffer: usize) -> Self {
        self.settings.client_buffer = buffer;
        self
    }

    /// Build the harness, creating storage and the router.
    pub async fn build(self) -> Result<TestHarness, LexisError> {
        let backend = if self.sqlite {
            let temp_dir = tempfile::TempDir::new().map_err(LexisError::persistence)?;
            let config = StorageConfig {
                database_path: temp_dir.path().join("test.db").to_string_lossy().to_string(),
                wal_mode: true,
            };
            let storage = SqliteStorage::new(config);
            storage.initialize().await?;
            Backend::Sqlite {
                storage: Arc::new(storage),
                _temp_dir: temp_dir,
            }
        } else {
            Backend::Memory(Arc::new(MockPersistence::new()))
        };

        let persistence: Arc<dyn PersistenceAdapter> = match &backend {
            Backend::Memory(store) => Arc::clone(store) as Arc<dyn PersistenceAdapter>,
            Backend::Sqlite { storage, .. } => Arc::clone(storage) as Arc<dyn PersistenceAdapter>,
        };
        let upstream = Arc::new(MockUpstream::with_scripts(self.scripts));
        let router = MessageRouter::new(persistence.clone(), upstream.clone(), self.settings);

        Ok(TestHarness {
            router,
            persistence,
            upstream,
            backend,
        })
    }
}

/// A router wired to mock collaborators.
pub struct TestHarness {
    pub router: Arc<MessageRouter>,
    pub persistence: Arc<dyn PersistenceAdapter>,
    pub upstream: Arc<MockUpstream>,
    backend: Backend,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// In-memory harness with default settings.
    pub async fn new() -> Result<Self, LexisError> {
        Self::builder().build().await
    }

    /// Connects a new page context to the router.
    pub fn client(&self) -> ContentScriptClient {
        let (_, sender, receiver) = self.router.connect().into_parts();
        ContentScriptClient::from_channels(sender, receiver)
    }

    /// The in-memory store, when the harness uses one.
    pub fn memory(&self) -> Option<&MockPersistence> {
        match &self.backend {
            Backend::Memory(store) => Some(store),
            Backend::Sqlite { .. } => None,
        }
    }

    /// Seeds a family with its surface words.
    pub async fn add_family(&self, root: &str, words: &[&str]) -> Result<FamilyId, LexisError> {
        match &self.backend {
            Backend::Memory(store) => Ok(store.add_family(root, words)),
            Backend::Sqlite { storage, .. } => storage.seed_family(root, words, &[]).await,
        }
    }

    pub async fn add_family_with_tags(
        &self,
        root: &str,
        words: &[&str],
        tags: &[(&str, Option<&str>)],
    ) -> Result<FamilyId, LexisError> {
        match &self.backend {
            Backend::Memory(store) => {
                let id = store.add_family(root, words);
                for (name, description) in tags {
                    store.add_tag(id, name, *description);
                }
                Ok(id)
            }
            Backend::Sqlite { storage, .. } => storage.seed_family(root, words, tags).await,
        }
    }

    pub async fn put_entry(&self, entry: DictionaryEntry) -> Result<(), LexisError> {
        match &self.backend {
            Backend::Memory(store) => {
                store.put_entry(entry);
                Ok(())
            }
            Backend::Sqlite { storage, .. } => storage.put_dictionary_entry(&entry).await,
        }
    }

    /// The familiarity persisted for a family, bypassing the router cache.
    pub async fn stored(&self, family_id: FamilyId) -> Result<Option<FamiliarityRecord>, LexisError> {
        self.persistence.get_familiarity(family_id).await
    }
}
