// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the SQLite vocabulary store.

use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use lexis_config::model::StorageConfig;
use lexis_core::{
    DefinitionEntry, DictionaryEntry, EntrySource, FamiliarityLevel, FamiliarityRecord,
    FamiliarityStatus, HealthStatus, PersistenceAdapter, PluginAdapter, TagInfo,
};
use lexis_storage::{Database, SqliteStorage, queries};

async fn file_storage(dir: &tempfile::TempDir) -> SqliteStorage {
    let config = StorageConfig {
        database_path: dir.path().join("nested/lexis.db").display().to_string(),
        wal_mode: true,
    };
    let storage = SqliteStorage::new(config);
    storage.initialize().await.unwrap();
    storage
}

async fn memory_storage() -> SqliteStorage {
    let db = Database::open_in_memory().await.unwrap();
    SqliteStorage::with_database(StorageConfig::default(), db)
}

#[tokio::test]
async fn uninitialized_storage_reports_persistence_error() {
    let storage = SqliteStorage::new(StorageConfig::default());
    let err = storage.family_by_word("run").await.unwrap_err();
    assert!(err.to_string().contains("not initialized"));
}

#[tokio::test]
async fn opens_file_database_and_reports_healthy() {
    let dir = tempfile::tempdir().unwrap();
    let storage = file_storage(&dir).await;
    assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);
    storage.shutdown().await.unwrap();
    assert!(dir.path().join("nested/lexis.db").exists());
}

#[tokio::test]
async fn initialize_twice_fails() {
    let dir = tempfile::tempdir().unwrap();
    let storage = file_storage(&dir).await;
    assert!(storage.initialize().await.is_err());
}

#[tokio::test]
async fn surface_words_resolve_to_their_family() {
    let storage = memory_storage().await;
    let id = storage
        .seed_family("run", &["running", "Ran", "runs"], &[])
        .await
        .unwrap();

    for word in ["run", "running", "RAN", "  runs "] {
        let family = storage.family_by_word(word).await.unwrap().unwrap();
        assert_eq!(family.id, id);
        assert_eq!(family.root, "run");
    }
    assert!(storage.family_by_word("walk").await.unwrap().is_none());

    let db = storage.database().unwrap();
    assert_eq!(queries::families::count_words(db, id).await.unwrap(), 4);
}

#[tokio::test]
async fn reinserting_family_root_returns_same_id() {
    let storage = memory_storage().await;
    let db = storage.database().unwrap();
    let a = queries::families::insert_family(db, "cat").await.unwrap();
    let b = queries::families::insert_family(db, "Cat").await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn familiarity_upsert_and_reload() {
    let storage = memory_storage().await;
    let id = storage.seed_family("run", &["running"], &[]).await.unwrap();
    assert!(storage.get_familiarity(id).await.unwrap().is_none());

    let stamp = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    let record = FamiliarityRecord::new(FamiliarityLevel::new(3).unwrap(), stamp);
    storage.upsert_familiarity(id, &record).await.unwrap();
    let loaded = storage.get_familiarity(id).await.unwrap().unwrap();
    assert_eq!(loaded, record);
    assert_eq!(loaded.status(), FamiliarityStatus::Learning);

    let later = FamiliarityRecord::new(FamiliarityLevel::MAX, stamp + chrono::Duration::seconds(5));
    storage.upsert_familiarity(id, &later).await.unwrap();
    assert_eq!(storage.get_familiarity(id).await.unwrap().unwrap(), later);
}

#[tokio::test]
async fn status_column_tracks_level() {
    let storage = memory_storage().await;
    let id = storage.seed_family("cat", &[], &[]).await.unwrap();
    let record = FamiliarityRecord::new(FamiliarityLevel::MAX, Utc::now());
    storage.upsert_familiarity(id, &record).await.unwrap();

    let status: String = storage
        .database()
        .unwrap()
        .connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT status FROM familiarity WHERE family_id = ?1",
                [id],
                |row| row.get(0),
            )
        })
        .await
        .unwrap();
    assert_eq!(status, "known");
}

#[tokio::test]
async fn tags_are_listed_by_name() {
    let storage = memory_storage().await;
    let id = storage
        .seed_family(
            "run",
            &["running"],
            &[("oxford-3000", Some("Oxford 3000 core list")), ("a1", None)],
        )
        .await
        .unwrap();
    let tags = storage.list_tags_for_family(id).await.unwrap();
    assert_eq!(
        tags,
        vec![
            TagInfo {
                name: "a1".into(),
                description: None
            },
            TagInfo {
                name: "oxford-3000".into(),
                description: Some("Oxford 3000 core list".into())
            },
        ]
    );
}

#[tokio::test]
async fn dictionary_entry_round_trip() {
    let storage = memory_storage().await;
    let entry = DictionaryEntry {
        word: "Running".into(),
        phonetics: vec!["/ˈrʌnɪŋ/".into()],
        audio: vec![],
        forms: vec!["run".into(), "ran".into()],
        definitions: vec![DefinitionEntry {
            pos: "verb".into(),
            senses: vec!["moving swiftly on foot".into()],
        }],
        short_glosses: BTreeMap::from([("es".to_string(), "corriendo".to_string())]),
        source: EntrySource::Db,
        tags: vec![],
    };
    storage.put_dictionary_entry(&entry).await.unwrap();

    let loaded = storage.dictionary_entry("running").await.unwrap().unwrap();
    assert_eq!(loaded, entry);
    assert!(storage.dictionary_entry("walk").await.unwrap().is_none());
}
