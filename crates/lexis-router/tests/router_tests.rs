// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Envelope-level tests for the message router.
//!
//! Requests go straight through `MessageRouter::handle`; broadcasts are read
//! off raw `ClientConnection` receivers.

use std::time::Duration;

use lexis_core::{
    DefinitionEntry, DictionaryEntry, EntrySource, FamiliarityLevel, FamiliarityRecord,
    FamiliarityStatus,
};
use lexis_protocol::{Notification, Response, ServerFrame};
use lexis_router::ClientConnection;
use lexis_test_utils::{Script, TestHarness};
use serde_json::json;
use tokio::sync::mpsc;

async fn next_notification(rx: &mut mpsc::Receiver<ServerFrame>) -> Notification {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("timed out waiting for a notification")
            .expect("connection closed");
        if let ServerFrame::Notification { notification } = frame {
            return notification;
        }
    }
}

async fn assert_quiet(rx: &mut mpsc::Receiver<ServerFrame>) {
    let next = tokio::time::timeout(Duration::from_millis(50), rx.recv()).await;
    assert!(next.is_err(), "unexpected frame: {next:?}");
}

fn entry(word: &str) -> DictionaryEntry {
    DictionaryEntry {
        word: word.into(),
        phonetics: vec!["/kæt/".into()],
        audio: vec![],
        forms: vec!["cats".into()],
        definitions: vec![DefinitionEntry {
            pos: "noun".into(),
            senses: vec!["a small domesticated feline".into()],
        }],
        short_glosses: Default::default(),
        source: EntrySource::Db,
        tags: vec![],
    }
}

async fn handle(harness: &TestHarness, conn: &ClientConnection, envelope: serde_json::Value) -> Response {
    harness.router.handle(&conn.id, envelope).await
}

// ---- Envelope decoding ----

#[tokio::test]
async fn unknown_type_is_rejected_with_plain_error() {
    let harness = TestHarness::new().await.unwrap();
    let conn = harness.router.connect();

    let response = handle(&harness, &conn, json!({"type": "DELETE_EVERYTHING"})).await;
    assert!(!response.success);
    assert_eq!(
        response.error.as_deref(),
        Some("Unrecognized message type: DELETE_EVERYTHING")
    );
}

#[tokio::test]
async fn broadcast_kind_cannot_be_requested() {
    let harness = TestHarness::new().await.unwrap();
    let conn = harness.router.connect();

    let response = handle(
        &harness,
        &conn,
        json!({"type": "AUTO_INCREASE_FAMILIARITY", "word": "cat"}),
    )
    .await;
    assert!(!response.success);
    assert!(response.error.unwrap().contains("broadcast"));
}

// ---- Vocabulary queries ----

#[tokio::test]
async fn query_returns_one_entry_per_input_word() {
    let harness = TestHarness::new().await.unwrap();
    harness.add_family("run", &["running", "ran"]).await.unwrap();
    let conn = harness.router.connect();

    let response = handle(
        &harness,
        &conn,
        json!({"type": "QUERY_WORDS_STATUS", "words": ["Running", "ran", "running", "zzyzx"]}),
    )
    .await;
    assert!(response.success);
    let data = response.data.unwrap();
    let map = data.as_object().unwrap();
    assert_eq!(map.len(), 4);
    assert_eq!(map["Running"]["familyRoot"], "run");
    assert_eq!(map["ran"]["familyRoot"], "run");
    assert_eq!(map["running"]["familyRoot"], "run");
    assert_eq!(map["running"]["status"], "unknown");
    assert_eq!(map["zzyzx"], json!({"status": "unknown", "familyRoot": null, "familiarityLevel": 0}));
}

#[tokio::test]
async fn update_then_query_round_trips() {
    let harness = TestHarness::new().await.unwrap();
    harness.add_family("run", &["running"]).await.unwrap();
    let conn = harness.router.connect();

    let update = handle(
        &harness,
        &conn,
        json!({"type": "UPDATE_WORD_STATUS", "word": "running", "familiarityLevel": 3}),
    )
    .await;
    assert!(update.success, "{update:?}");

    let query = handle(
        &harness,
        &conn,
        json!({"type": "QUERY_WORDS_STATUS", "words": ["running"]}),
    )
    .await;
    let data = query.data.unwrap();
    assert_eq!(data["running"]["familiarityLevel"], 3);
    assert_eq!(data["running"]["status"], "learning");
}

#[tokio::test]
async fn update_requires_status_or_level() {
    let harness = TestHarness::new().await.unwrap();
    harness.add_family("cat", &[]).await.unwrap();
    let conn = harness.router.connect();

    let response = handle(&harness, &conn, json!({"type": "UPDATE_WORD_STATUS", "word": "cat"})).await;
    assert!(!response.success);
    assert!(response.error.unwrap().contains("status or familiarityLevel"));
    assert_eq!(harness.memory().unwrap().upsert_count(), 0);
}

#[tokio::test]
async fn update_of_word_without_family_is_a_validation_error() {
    let harness = TestHarness::new().await.unwrap();
    let conn = harness.router.connect();

    let response = handle(
        &harness,
        &conn,
        json!({"type": "UPDATE_WORD_STATUS", "word": "zzyzx", "status": "known"}),
    )
    .await;
    assert!(!response.success);
    assert!(response.error.unwrap().contains("no word family"));
    assert_eq!(harness.memory().unwrap().upsert_count(), 0);
}

#[tokio::test]
async fn status_only_update_keeps_partial_progress() {
    let harness = TestHarness::new().await.unwrap();
    let id = harness.add_family("cat", &[]).await.unwrap();
    harness.memory().unwrap().set_familiarity(
        id,
        FamiliarityRecord::new(FamiliarityLevel::new(4).unwrap(), chrono::Utc::now()),
    );
    let conn = harness.router.connect();

    let response = handle(
        &harness,
        &conn,
        json!({"type": "UPDATE_WORD_STATUS", "word": "cat", "status": "learning"}),
    )
    .await;
    assert_eq!(response.data.unwrap()["familiarityLevel"], 4);
}

// ---- Ignore ----

#[tokio::test]
async fn ignore_is_idempotent_and_broadcasts_once() {
    let harness = TestHarness::new().await.unwrap();
    let id = harness.add_family("cat", &["cats"]).await.unwrap();
    let mut conn = harness.router.connect();

    for _ in 0..2 {
        let response = handle(&harness, &conn, json!({"type": "IGNORE_WORD", "word": "cats"})).await;
        assert!(response.success);
        let data = response.data.unwrap();
        assert_eq!(data["status"], "known");
        assert_eq!(data["familiarityLevel"], 7);
    }

    assert_eq!(harness.memory().unwrap().upsert_count(), 1);
    assert_eq!(harness.stored(id).await.unwrap().unwrap().level, FamiliarityLevel::MAX);
    assert_eq!(
        next_notification(&mut conn.receiver).await,
        Notification::WordIgnored {
            word: "cats".into(),
            family_root: "cat".into()
        }
    );
    assert_quiet(&mut conn.receiver).await;
}

#[tokio::test]
async fn batch_ignore_counts_newly_ignored_families() {
    let harness = TestHarness::new().await.unwrap();
    harness.add_family("cat", &["cats"]).await.unwrap();
    harness.add_family("dog", &[]).await.unwrap();
    let conn = harness.router.connect();

    let response = handle(
        &harness,
        &conn,
        json!({"type": "BATCH_IGNORE_WORDS", "words": ["cat", "cats", "dog", "zzyzx"]}),
    )
    .await;
    assert!(response.success);
    assert_eq!(response.added_count, Some(2));
    let errors = response.data.unwrap()["errors"].as_array().unwrap().clone();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["word"], "zzyzx");
}

// ---- Batch update ----

#[tokio::test]
async fn batch_update_isolates_malformed_tuple() {
    let harness = TestHarness::new().await.unwrap();
    harness.add_family("cat", &[]).await.unwrap();
    harness.add_family("dog", &[]).await.unwrap();
    harness.add_family("run", &[]).await.unwrap();
    let conn = harness.router.connect();

    let response = handle(
        &harness,
        &conn,
        json!({
            "type": "BATCH_UPDATE_WORD_STATUS",
            "updates": [
                {"word": "cat", "familiarityLevel": 2},
                {"word": "dog"},
                {"word": "run", "status": "known"},
                42,
                {"word": "cat", "status": "learning"}
            ]
        }),
    )
    .await;
    assert!(response.success);
    assert_eq!(response.updated_count, Some(3));
    let errors = response.data.unwrap()["errors"].as_array().unwrap().clone();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0]["index"], 1);
    assert_eq!(errors[1]["index"], 3);
}

// ---- Broadcasts and passive encounters ----

#[tokio::test]
async fn updates_are_broadcast_to_every_client() {
    let harness = TestHarness::new().await.unwrap();
    harness.add_family("run", &["ran"]).await.unwrap();
    let origin = harness.router.connect();
    let mut other = harness.router.connect();

    handle(
        &harness,
        &origin,
        json!({"type": "UPDATE_WORD_STATUS", "word": "ran", "status": "known"}),
    )
    .await;

    assert_eq!(
        next_notification(&mut other.receiver).await,
        Notification::WordStatusUpdated {
            word: "ran".into(),
            family_root: "run".into(),
            status: FamiliarityStatus::Known,
            familiarity_level: 7,
        }
    );
}

#[tokio::test]
async fn encounters_trigger_auto_increase_for_all_clients() {
    let harness = TestHarness::builder()
        .with_encounter_threshold(2)
        .build()
        .await
        .unwrap();
    let id = harness.add_family("cat", &["cats"]).await.unwrap();
    harness.put_entry(entry("cat")).await.unwrap();
    let reader = harness.router.connect();
    let mut other = harness.router.connect();

    handle(&harness, &reader, json!({"type": "GET_INTERNAL_DEFINITION", "word": "cat"})).await;
    assert_quiet(&mut other.receiver).await;
    handle(&harness, &reader, json!({"type": "GET_INTERNAL_DEFINITION", "word": "cats"})).await;

    let expected_level = 1;
    assert!(matches!(
        next_notification(&mut other.receiver).await,
        Notification::AutoIncreaseFamiliarity { familiarity_level, .. } if familiarity_level == expected_level
    ));
    assert!(matches!(
        next_notification(&mut other.receiver).await,
        Notification::WordStatusUpdated { familiarity_level, status: FamiliarityStatus::Learning, .. }
            if familiarity_level == expected_level
    ));
    assert_eq!(harness.stored(id).await.unwrap().unwrap().level.get(), 1);
}

#[tokio::test]
async fn auto_increase_is_monotonic_and_clamped() {
    let harness = TestHarness::builder()
        .with_encounter_threshold(1)
        .build()
        .await
        .unwrap();
    let id = harness.add_family("cat", &[]).await.unwrap();
    let mut conn = harness.router.connect();

    let mut last = 0;
    for _ in 0..10 {
        handle(&harness, &conn, json!({"type": "GET_WORD_DETAILS", "word": "cat"})).await;
        let level = harness.stored(id).await.unwrap().map_or(0, |r| r.level.get());
        assert!(level >= last);
        assert!(level <= 7);
        last = level;
    }
    assert_eq!(last, 7);

    // Seven increases, two notifications each, and nothing once known.
    for _ in 0..14 {
        next_notification(&mut conn.receiver).await;
    }
    assert_quiet(&mut conn.receiver).await;
}

#[tokio::test]
async fn explicit_update_resets_encounter_count() {
    let harness = TestHarness::builder()
        .with_encounter_threshold(2)
        .build()
        .await
        .unwrap();
    let id = harness.add_family("cat", &[]).await.unwrap();
    let conn = harness.router.connect();

    handle(&harness, &conn, json!({"type": "GET_WORD_DETAILS", "word": "cat"})).await;
    handle(
        &harness,
        &conn,
        json!({"type": "UPDATE_WORD_STATUS", "word": "cat", "familiarityLevel": 2}),
    )
    .await;
    handle(&harness, &conn, json!({"type": "GET_WORD_DETAILS", "word": "cat"})).await;

    assert_eq!(harness.stored(id).await.unwrap().unwrap().level.get(), 2);
}

// ---- Lookups ----

#[tokio::test]
async fn internal_definition_merges_family_tags() {
    let harness = TestHarness::new().await.unwrap();
    harness
        .add_family_with_tags("cat", &["cats"], &[("cefr-a1", Some("Beginner"))])
        .await
        .unwrap();
    harness.put_entry(entry("cats")).await.unwrap();
    let conn = harness.router.connect();

    let response = handle(&harness, &conn, json!({"type": "GET_INTERNAL_DEFINITION", "word": "cats"})).await;
    let data = response.data.unwrap();
    assert_eq!(data["source"], "db");
    assert_eq!(data["tags"][0]["name"], "cefr-a1");

    let missing = handle(&harness, &conn, json!({"type": "GET_INTERNAL_DEFINITION", "word": "zzyzx"})).await;
    assert!(missing.success);
    assert_eq!(missing.data, Some(serde_json::Value::Null));
}

#[tokio::test]
async fn word_details_include_familiarity() {
    let harness = TestHarness::new().await.unwrap();
    harness.add_family("cat", &[]).await.unwrap();
    let conn = harness.router.connect();

    let response = handle(&harness, &conn, json!({"type": "GET_WORD_DETAILS", "word": "cat"})).await;
    let data = response.data.unwrap();
    assert_eq!(data["word"], "cat");
    assert!(data["entry"].is_null());
    assert_eq!(data["familiarity"]["familyRoot"], "cat");
}

#[tokio::test]
async fn persistence_failure_is_reported_without_internals() {
    let harness = TestHarness::new().await.unwrap();
    harness.add_family("cat", &[]).await.unwrap();
    harness.memory().unwrap().fail_writes(true);
    let conn = harness.router.connect();

    let response = handle(
        &harness,
        &conn,
        json!({"type": "UPDATE_WORD_STATUS", "word": "cat", "familiarityLevel": 1}),
    )
    .await;
    assert!(!response.success);
    let error = response.error.unwrap();
    assert!(!error.contains("injected"));
    assert!(error.contains("vocabulary store"));
}

// ---- AI ----

#[tokio::test]
async fn enrich_word_returns_assembled_content() {
    let harness = TestHarness::builder()
        .with_scripts(vec![Script::chunks(["A small ", "feline."])])
        .build()
        .await
        .unwrap();
    let conn = harness.router.connect();

    let response = handle(&harness, &conn, json!({"type": "ENRICH_WORD", "word": "cat"})).await;
    assert_eq!(
        response.data.unwrap(),
        json!({"word": "cat", "content": "A small feline.", "source": "ai"})
    );
}

#[tokio::test]
async fn translate_failure_is_a_failed_response() {
    let harness = TestHarness::builder()
        .with_scripts(vec![Script::fail_after(["Hel"], "overloaded")])
        .build()
        .await
        .unwrap();
    let conn = harness.router.connect();

    let response = handle(&harness, &conn, json!({"type": "TRANSLATE_SENTENCE", "sentence": "Hola"})).await;
    assert!(!response.success);
    assert!(response.error.unwrap().contains("overloaded"));
}

#[tokio::test]
async fn stream_delivers_chunks_then_one_complete() {
    let harness = TestHarness::builder()
        .with_scripts(vec![Script::chunks(["Hel", "lo"])])
        .build()
        .await
        .unwrap();
    let mut conn = harness.router.connect();

    let response = handle(&harness, &conn, json!({"type": "TRANSLATE_SENTENCE_STREAM", "sentence": "Hola"})).await;
    assert_eq!(response.message.as_deref(), Some("stream started"));

    let events = [
        next_notification(&mut conn.receiver).await,
        next_notification(&mut conn.receiver).await,
        next_notification(&mut conn.receiver).await,
    ];
    assert_eq!(
        events,
        [
            Notification::TranslateStreamData {
                sentence: "Hola".into(),
                content: "Hel".into()
            },
            Notification::TranslateStreamData {
                sentence: "Hola".into(),
                content: "lo".into()
            },
            Notification::TranslateStreamComplete {
                sentence: "Hola".into(),
                translation: Some("Hello".into())
            },
        ]
    );
    assert_quiet(&mut conn.receiver).await;
}

#[tokio::test]
async fn duplicate_stream_request_is_coalesced() {
    let harness = TestHarness::builder()
        .with_scripts(vec![Script::held(["feline"])])
        .build()
        .await
        .unwrap();
    let mut conn = harness.router.connect();

    let first = handle(&harness, &conn, json!({"type": "ENRICH_WORD_STREAM", "word": "cat"})).await;
    let second = handle(&harness, &conn, json!({"type": "ENRICH_WORD_STREAM", "word": "Cat "})).await;
    assert_eq!(first.message.as_deref(), Some("stream started"));
    assert_eq!(second.message.as_deref(), Some("stream already in progress"));
    assert_eq!(harness.upstream.enrich_calls(), 1);

    assert!(matches!(
        next_notification(&mut conn.receiver).await,
        Notification::EnrichStreamData { .. }
    ));
    harness.upstream.release();
    assert!(matches!(
        next_notification(&mut conn.receiver).await,
        Notification::EnrichStreamComplete { .. }
    ));
    assert_quiet(&mut conn.receiver).await;
}

#[tokio::test]
async fn disconnect_cancels_upstream() {
    let harness = TestHarness::builder()
        .with_scripts(vec![Script::hang(["partial"])])
        .build()
        .await
        .unwrap();
    let mut conn = harness.router.connect();

    handle(&harness, &conn, json!({"type": "ENRICH_WORD_STREAM", "word": "cat"})).await;
    next_notification(&mut conn.receiver).await;
    assert_eq!(harness.router.active_streams(), 1);

    drop(conn);
    tokio::time::timeout(Duration::from_secs(2), async {
        while harness.upstream.cancellations() == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("upstream was not cancelled");
    assert_eq!(harness.router.connected_clients(), 0);
    assert_eq!(harness.router.active_streams(), 0);
}

#[tokio::test]
async fn disconnect_cancels_pending_enrichment() {
    let harness = TestHarness::builder()
        .with_scripts(vec![Script::hang(["partial"])])
        .build()
        .await
        .unwrap();
    let conn = harness.router.connect();

    let router = harness.router.clone();
    let client = conn.id.clone();
    let pending = tokio::spawn(async move {
        router
            .handle(&client, json!({"type": "ENRICH_WORD", "word": "cat"}))
            .await
    });
    tokio::time::timeout(Duration::from_secs(2), async {
        while harness.upstream.enrich_calls() == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("upstream was never called");

    drop(conn);
    let response = tokio::time::timeout(Duration::from_secs(2), pending)
        .await
        .expect("handler kept running after disconnect")
        .unwrap();
    assert!(!response.success);
    assert_eq!(harness.upstream.cancellations(), 1);
    assert_eq!(harness.router.connected_clients(), 0);
}

#[tokio::test]
async fn stream_from_unconnected_client_fails() {
    let harness = TestHarness::new().await.unwrap();
    let stranger = lexis_core::ClientId::generate();

    let response = harness
        .router
        .handle(&stranger, json!({"type": "ENRICH_WORD_STREAM", "word": "cat"}))
        .await;
    assert!(!response.success);
    assert_eq!(harness.upstream.enrich_calls(), 0);
}

// ---- Concurrency ----

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_updates_to_one_family_stay_consistent() {
    let harness = std::sync::Arc::new(TestHarness::new().await.unwrap());
    let id = harness.add_family("run", &["running", "ran", "runs"]).await.unwrap();
    let conn = harness.router.connect();

    let mut tasks = Vec::new();
    for level in 0..8u8 {
        for word in ["running", "ran", "runs"] {
            let harness = std::sync::Arc::clone(&harness);
            let client = conn.id.clone();
            tasks.push(tokio::spawn(async move {
                harness
                    .router
                    .handle(
                        &client,
                        json!({"type": "UPDATE_WORD_STATUS", "word": word, "familiarityLevel": level}),
                    )
                    .await
            }));
        }
    }
    for task in tasks {
        assert!(task.await.unwrap().success);
    }

    let stored = harness.stored(id).await.unwrap().unwrap();
    let query = harness
        .router
        .handle(&conn.id, json!({"type": "QUERY_WORDS_STATUS", "words": ["run"]}))
        .await;
    assert_eq!(query.data.unwrap()["run"]["familiarityLevel"], stored.level.get());
    assert_eq!(harness.memory().unwrap().upsert_count(), 24);
}

// ---- SQLite backend ----

#[tokio::test]
async fn sqlite_backend_round_trips_updates() {
    let harness = TestHarness::builder().with_sqlite().build().await.unwrap();
    let id = harness.add_family("run", &["running"]).await.unwrap();
    let conn = harness.router.connect();

    let update = handle(
        &harness,
        &conn,
        json!({"type": "UPDATE_WORD_STATUS", "word": "Running", "familiarityLevel": 5}),
    )
    .await;
    assert!(update.success, "{update:?}");
    assert_eq!(harness.stored(id).await.unwrap().unwrap().level.get(), 5);
}
