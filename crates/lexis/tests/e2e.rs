// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end behaviour through content-script clients attached to one
//! router, with scripted upstream output and in-memory persistence.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use lexis_client::{ContentScriptClient, StreamEvent};
use lexis_core::{
    DefinitionEntry, DictionaryEntry, EntrySource, FamiliarityStatus, LexisError,
};
use lexis_protocol::{
    BatchUpdateEntry, EnrichPayload, Notification, TranslatePayload, WordStatusUpdate,
};
use lexis_test_utils::{Script, TestHarness};
use serde_json::json;
use tokio::sync::{broadcast, mpsc};

async fn next_notification(rx: &mut broadcast::Receiver<Notification>) -> Notification {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for a notification")
        .expect("notification channel closed")
}

async fn eventually(what: &str, mut check: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {what}"));
}

fn enrich(word: &str) -> EnrichPayload {
    EnrichPayload {
        word: word.into(),
        context: None,
        enhanced_phrase_detection: false,
        sentence_analysis_mode: Default::default(),
    }
}

fn enrich_in(word: &str, context: &str) -> EnrichPayload {
    EnrichPayload {
        context: Some(context.into()),
        ..enrich(word)
    }
}

fn translate(sentence: &str) -> TranslatePayload {
    TranslatePayload {
        sentence: sentence.into(),
        paragraph: None,
    }
}

fn update(word: &str, status: Option<FamiliarityStatus>, level: Option<u8>) -> BatchUpdateEntry {
    BatchUpdateEntry::Valid(WordStatusUpdate {
        word: word.into(),
        status,
        familiarity_level: level,
    })
}

fn entry(word: &str) -> DictionaryEntry {
    DictionaryEntry {
        word: word.into(),
        phonetics: vec![],
        audio: vec![],
        forms: vec![],
        definitions: vec![DefinitionEntry {
            pos: "noun".into(),
            senses: vec!["a small domesticated feline".into()],
        }],
        short_glosses: Default::default(),
        source: EntrySource::Db,
        tags: vec![],
    }
}

// ---- Queries ----

#[tokio::test]
async fn query_answers_every_input_word_with_original_casing() {
    let harness = TestHarness::new().await.unwrap();
    harness.add_family("run", &["running", "ran"]).await.unwrap();
    let client = harness.client();

    let words = ["Running", "running", "RAN", " ran ", "Zzyzx", "zzyzx"];
    let statuses = client.query_words_status(&words).await.unwrap();

    assert_eq!(statuses.len(), words.len());
    for word in ["Running", "running", "RAN", " ran "] {
        assert_eq!(statuses[word].family_root.as_deref(), Some("run"), "{word}");
        assert_eq!(statuses[word].status, FamiliarityStatus::Unknown);
    }
    for word in ["Zzyzx", "zzyzx"] {
        assert_eq!(statuses[word].family_root, None);
        assert_eq!(statuses[word].familiarity_level, 0);
    }
}

#[tokio::test]
async fn update_then_query_round_trips_through_the_client() {
    let harness = TestHarness::new().await.unwrap();
    harness.add_family("run", &["running"]).await.unwrap();
    let client = harness.client();

    let response = client.update_word_status("running", None, Some(3)).await.unwrap();
    assert!(response.success, "{response:?}");

    let statuses = client.query_words_status(&["running"]).await.unwrap();
    assert_eq!(statuses["running"].familiarity_level, 3);
    assert_eq!(statuses["running"].status, FamiliarityStatus::Learning);
}

// ---- Ignore ----

#[tokio::test]
async fn ignoring_twice_stays_known() {
    let harness = TestHarness::new().await.unwrap();
    let id = harness.add_family("cat", &["cats"]).await.unwrap();
    let client = harness.client();

    for word in ["cats", "cat"] {
        let response = client.ignore_word(word).await.unwrap();
        assert!(response.success, "{response:?}");
        let statuses = client.query_words_status(&[word]).await.unwrap();
        assert_eq!(statuses[word].status, FamiliarityStatus::Known);
        assert_eq!(statuses[word].familiarity_level, 7);
    }
    assert_eq!(harness.stored(id).await.unwrap().unwrap().level.get(), 7);
}

// ---- Broadcasts and local state ----

#[tokio::test]
async fn other_clients_reconcile_local_vocabulary() {
    let harness = TestHarness::new().await.unwrap();
    harness.add_family("run", &["running", "ran"]).await.unwrap();
    let writer = harness.client();
    let reader = harness.client();

    reader.query_words_status(&["running", "ran"]).await.unwrap();
    let mut notifications = reader.notifications();

    writer.update_word_status("ran", Some(FamiliarityStatus::Known), None).await.unwrap();
    assert!(matches!(
        next_notification(&mut notifications).await,
        Notification::WordStatusUpdated { familiarity_level: 7, .. }
    ));

    // Every cached surface word of the family follows the update.
    let running = reader.status_of("running").unwrap();
    assert_eq!(running.status, FamiliarityStatus::Known);
    assert_eq!(running.familiarity_level, 7);
}

#[tokio::test]
async fn auto_increase_is_monotonic_and_clamped_for_clients() {
    let harness = TestHarness::builder()
        .with_encounter_threshold(1)
        .build()
        .await
        .unwrap();
    harness.add_family("cat", &["cats"]).await.unwrap();
    harness.put_entry(entry("cat")).await.unwrap();
    let reader = harness.client();
    let watcher = harness.client();
    watcher.query_words_status(&["cats"]).await.unwrap();
    let mut notifications = watcher.notifications();

    let mut last = 0;
    for _ in 0..9 {
        let response = reader.get_internal_definition("cat").await.unwrap();
        assert!(response.success);
    }
    for _ in 0..7 {
        match next_notification(&mut notifications).await {
            Notification::AutoIncreaseFamiliarity {
                familiarity_level, ..
            } => {
                assert!(familiarity_level > last);
                last = familiarity_level;
            }
            other => panic!("expected an auto increase, got {other:?}"),
        }
        assert!(matches!(
            next_notification(&mut notifications).await,
            Notification::WordStatusUpdated { familiarity_level, .. } if familiarity_level == last
        ));
    }
    assert_eq!(last, 7);
    assert_eq!(watcher.status_of("cats").unwrap().familiarity_level, 7);

    let quiet = tokio::time::timeout(Duration::from_millis(50), notifications.recv()).await;
    assert!(quiet.is_err(), "no increases past known: {quiet:?}");
}

// ---- Batches ----

#[tokio::test]
async fn batch_with_one_malformed_tuple_updates_the_rest() {
    let harness = TestHarness::new().await.unwrap();
    for root in ["cat", "dog", "fish"] {
        harness.add_family(root, &[]).await.unwrap();
    }
    let client = harness.client();

    let response = client
        .batch_update_word_status(vec![
            update("cat", None, Some(2)),
            update("dog", Some(FamiliarityStatus::Known), None),
            BatchUpdateEntry::Malformed(json!({"word": "bird"})),
            update("fish", Some(FamiliarityStatus::Learning), None),
        ])
        .await
        .unwrap();
    assert!(response.success, "{response:?}");
    assert_eq!(response.updated_count, Some(3));

    let statuses = client.query_words_status(&["cat", "dog", "fish"]).await.unwrap();
    assert_eq!(statuses["cat"].familiarity_level, 2);
    assert_eq!(statuses["dog"].familiarity_level, 7);
    assert_eq!(statuses["fish"].familiarity_level, 1);
}

#[tokio::test]
async fn batch_ignore_counts_new_families_only() {
    let harness = TestHarness::new().await.unwrap();
    harness.add_family("cat", &["cats"]).await.unwrap();
    harness.add_family("dog", &[]).await.unwrap();
    let client = harness.client();

    let first = client.batch_ignore_words(&["cat", "cats", "dog"]).await.unwrap();
    assert_eq!(first.added_count, Some(2));
    let again = client.batch_ignore_words(&["cat", "dog"]).await.unwrap();
    assert!(again.success);
    assert_eq!(again.added_count, Some(0));
}

// ---- Streaming ----

#[tokio::test]
async fn stream_events_arrive_in_order_and_end_at_complete() {
    let harness = TestHarness::builder()
        .with_scripts(vec![Script::chunks(["Hel", "lo"])])
        .build()
        .await
        .unwrap();
    let client = harness.client();

    let mut subscription = client.translate_stream(translate("Hola")).await.unwrap();
    let mut events = Vec::new();
    while let Some(event) = subscription.next_event().await {
        events.push(event);
    }
    assert_eq!(
        events,
        [
            StreamEvent::Data("Hel".into()),
            StreamEvent::Data("lo".into()),
            StreamEvent::Complete(Some("Hello".into())),
        ]
    );
    assert_eq!(client.active_subscriptions(), 0);
}

#[tokio::test]
async fn stream_failure_delivers_partial_content_then_one_error() {
    let harness = TestHarness::builder()
        .with_scripts(vec![Script::fail_after(["A sm"], "overloaded")])
        .build()
        .await
        .unwrap();
    let client = harness.client();

    let events: Vec<StreamEvent> = client
        .enrich_stream(enrich("cat"))
        .await
        .unwrap()
        .collect()
        .await;
    assert_eq!(events.len(), 2);
    assert_eq!(events[0], StreamEvent::Data("A sm".into()));
    let StreamEvent::Error(error) = &events[1] else {
        panic!("expected an error, got {:?}", events[1]);
    };
    assert!(error.contains("overloaded"), "{error}");
}

#[tokio::test]
async fn non_streaming_enrichment_returns_assembled_text() {
    let harness = TestHarness::builder()
        .with_scripts(vec![Script::chunks(["A small ", "feline."])])
        .build()
        .await
        .unwrap();
    let client = harness.client();

    let response = client.enrich_word(enrich("cat")).await.unwrap();
    assert_eq!(response.data.unwrap()["content"], "A small feline.");
}

#[tokio::test]
async fn closing_client_mid_stream_cancels_upstream() {
    let harness = TestHarness::builder()
        .with_scripts(vec![Script::hang(["partial"])])
        .build()
        .await
        .unwrap();
    let client = harness.client();

    let mut subscription = client.enrich_stream(enrich("cat")).await.unwrap();
    assert_eq!(
        subscription.next_event().await,
        Some(StreamEvent::Data("partial".into()))
    );

    client.close();
    // The torn-down listener sees the end of its stream and nothing else.
    assert_eq!(subscription.next_event().await, None);

    let upstream = harness.upstream.clone();
    eventually("upstream cancellation", || upstream.cancellations() == 1).await;
    let router = harness.router.clone();
    eventually("client deregistration", || router.connected_clients() == 0).await;
    assert_eq!(harness.router.active_streams(), 0);
}

#[tokio::test]
async fn same_word_streams_in_different_contexts_stay_separate() {
    let harness = TestHarness::builder()
        .with_scripts(vec![Script::hang(["money"]), Script::chunks(["shore"])])
        .build()
        .await
        .unwrap();
    let client = harness.client();

    let mut account = client
        .enrich_stream(enrich_in("bank", "I opened a bank account"))
        .await
        .unwrap();
    assert_eq!(account.next_event().await, Some(StreamEvent::Data("money".into())));

    let river = client
        .enrich_stream(enrich_in("Bank", "we sat on the river bank"))
        .await
        .unwrap();
    assert_eq!(river.collect_text().await, Ok("shore".into()));

    // The still-running session saw none of the other session's events.
    let next = tokio::time::timeout(Duration::from_millis(100), account.next_event()).await;
    assert!(next.is_err(), "unexpected event: {next:?}");
    assert_eq!(client.active_subscriptions(), 1);
    assert_eq!(harness.router.active_streams(), 1);
}

#[tokio::test]
async fn dropped_subscription_no_longer_receives_events() {
    let harness = TestHarness::builder()
        .with_scripts(vec![Script::held(["feline"])])
        .build()
        .await
        .unwrap();
    let client = harness.client();

    let subscription = client.enrich_stream(enrich("cat")).await.unwrap();
    assert_eq!(client.active_subscriptions(), 1);
    drop(subscription);
    assert_eq!(client.active_subscriptions(), 0);

    harness.upstream.release();
    // The client keeps working after its listener went away.
    let statuses = client.query_words_status(&["cat"]).await.unwrap();
    assert_eq!(statuses.len(), 1);
}

#[tokio::test]
async fn pending_requests_fail_when_the_background_goes_away() {
    let (outbound, mut frames) = mpsc::channel(8);
    let (background, inbound) = mpsc::channel(8);
    let client = Arc::new(ContentScriptClient::from_channels(outbound, inbound));

    let pending = tokio::spawn({
        let client = Arc::clone(&client);
        async move { client.get_word_details("cat").await }
    });
    // The request reaches the background but is never answered.
    let frame = frames.recv().await.unwrap();
    assert_eq!(frame.message["type"], "GET_WORD_DETAILS");

    drop(background);
    let result = tokio::time::timeout(Duration::from_secs(2), pending)
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(result, Err(LexisError::StreamCancelled)), "{result:?}");
    assert!(client.is_closed());
}
