// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the PersistenceAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use lexis_config::model::StorageConfig;
use lexis_core::{
    AdapterType, DictionaryEntry, FamiliarityRecord, FamilyId, HealthStatus, LexisError,
    PersistenceAdapter, PluginAdapter, TagInfo, WordFamily,
};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed vocabulary store.
///
/// The database is opened lazily by [`SqliteStorage::initialize`]; every
/// trait method fails with a persistence error until then.
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Wrap an already opened database, e.g. an in-memory one.
    pub fn with_database(config: StorageConfig, db: Database) -> Self {
        Self {
            config,
            db: OnceCell::new_with(Some(db)),
        }
    }

    /// Open the configured database file and run migrations.
    pub async fn initialize(&self) -> Result<(), LexisError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| LexisError::Persistence {
            message: "storage already initialized".into(),
            source: None,
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    /// The underlying database, for fixtures and seeding.
    pub fn database(&self) -> Result<&Database, LexisError> {
        self.db.get().ok_or_else(|| LexisError::Persistence {
            message: "storage not initialized -- call initialize() first".into(),
            source: None,
        })
    }

    /// Create a family with its surface words and tags in one go.
    pub async fn seed_family(
        &self,
        root: &str,
        words: &[&str],
        tags: &[(&str, Option<&str>)],
    ) -> Result<FamilyId, LexisError> {
        let db = self.database()?;
        let family_id = queries::families::insert_family(db, root).await?;
        queries::families::insert_word(db, root, family_id).await?;
        for word in words {
            queries::families::insert_word(db, word, family_id).await?;
        }
        for (name, description) in tags {
            let tag_id = queries::tags::insert_tag(db, name, *description).await?;
            queries::tags::tag_family(db, family_id, tag_id).await?;
        }
        Ok(family_id)
    }

    /// Store a dictionary entry for its word.
    pub async fn put_dictionary_entry(&self, entry: &DictionaryEntry) -> Result<(), LexisError> {
        queries::dictionary::upsert_dictionary_entry(self.database()?, entry).await
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Persistence
    }

    async fn health_check(&self) -> Result<HealthStatus, LexisError> {
        let db = self.database()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LexisError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl PersistenceAdapter for SqliteStorage {
    async fn family_by_word(&self, word: &str) -> Result<Option<WordFamily>, LexisError> {
        queries::families::family_by_word(self.database()?, word).await
    }

    async fn get_familiarity(
        &self,
        family_id: FamilyId,
    ) -> Result<Option<FamiliarityRecord>, LexisError> {
        queries::familiarity::get_familiarity(self.database()?, family_id).await
    }

    async fn upsert_familiarity(
        &self,
        family_id: FamilyId,
        record: &FamiliarityRecord,
    ) -> Result<(), LexisError> {
        queries::familiarity::upsert_familiarity(self.database()?, family_id, record).await
    }

    async fn list_tags_for_family(&self, family_id: FamilyId) -> Result<Vec<TagInfo>, LexisError> {
        queries::tags::list_tags_for_family(self.database()?, family_id).await
    }

    async fn dictionary_entry(&self, word: &str) -> Result<Option<DictionaryEntry>, LexisError> {
        queries::dictionary::dictionary_entry(self.database()?, word).await
    }
}
