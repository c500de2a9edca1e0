// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Status queries, explicit updates and ignores.

use std::collections::HashMap;

use chrono::Utc;
use lexis_core::{FamilyId, LexisError, WordFamily, WordFamilyInfo, normalize_word};
use lexis_familiarity::{apply_update, ignore};
use lexis_protocol::{BatchUpdateEntry, Notification, Response, WordStatusUpdate};
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::router::MessageRouter;

impl MessageRouter {
    /// One entry per input word, keyed by the word exactly as sent.
    ///
    /// Each distinct normalized word is resolved once and each distinct
    /// family is read once, however many surface forms point at it.
    pub(crate) async fn query_words_status(&self, words: &[String]) -> Result<Response, LexisError> {
        let mut families: HashMap<String, Option<WordFamily>> = HashMap::new();
        for word in words {
            let normalized = normalize_word(word);
            if normalized.is_empty() || families.contains_key(&normalized) {
                continue;
            }
            let family = self.persistence.family_by_word(&normalized).await?;
            families.insert(normalized, family);
        }

        let mut infos: HashMap<FamilyId, WordFamilyInfo> = HashMap::new();
        for family in families.values().flatten() {
            if infos.contains_key(&family.id) {
                continue;
            }
            let record = self.read_record(family).await?;
            infos.insert(family.id, WordFamilyInfo::from_record(&family.root, &record));
        }

        let mut data = Map::with_capacity(words.len());
        for word in words {
            let info = families
                .get(&normalize_word(word))
                .and_then(Option::as_ref)
                .and_then(|family| infos.get(&family.id).cloned())
                .unwrap_or_else(WordFamilyInfo::unknown);
            data.insert(word.clone(), serde_json::to_value(info).map_err(internal)?);
        }
        debug!(words = words.len(), families = infos.len(), "words status resolved");
        Ok(Response::with_data(Value::Object(data)))
    }

    pub(crate) async fn update_word_status(
        &self,
        update: &WordStatusUpdate,
    ) -> Result<Response, LexisError> {
        let info = self.apply_status_update(update).await?;
        Ok(Response::with_data(serde_json::to_value(info).map_err(internal)?))
    }

    pub(crate) async fn batch_update_word_status(
        &self,
        updates: &[BatchUpdateEntry],
    ) -> Result<Response, LexisError> {
        let mut updated = 0;
        let mut errors = Vec::new();
        for (index, entry) in updates.iter().enumerate() {
            match entry {
                BatchUpdateEntry::Valid(update) => match self.apply_status_update(update).await {
                    Ok(_) => updated += 1,
                    Err(err) => errors.push(json!({
                        "index": index,
                        "word": update.word,
                        "error": err.user_message(),
                    })),
                },
                BatchUpdateEntry::Malformed(raw) => errors.push(json!({
                    "index": index,
                    "word": raw.get("word"),
                    "error": "malformed update: expected {word, status?, familiarityLevel?}",
                })),
            }
        }
        debug!(updated, failed = errors.len(), "batch update applied");
        Ok(Response::with_data(json!({ "errors": errors })).updated_count(updated))
    }

    pub(crate) async fn ignore_word(&self, word: &str) -> Result<Response, LexisError> {
        let (info, _) = self.apply_ignore(word).await?;
        Ok(Response::with_data(serde_json::to_value(info).map_err(internal)?))
    }

    pub(crate) async fn batch_ignore_words(&self, words: &[String]) -> Result<Response, LexisError> {
        let mut added = 0;
        let mut errors = Vec::new();
        for word in words {
            match self.apply_ignore(word).await {
                Ok((_, true)) => added += 1,
                Ok((_, false)) => {}
                Err(err) => errors.push(json!({ "word": word, "error": err.user_message() })),
            }
        }
        debug!(added, failed = errors.len(), "batch ignore applied");
        Ok(Response::with_data(json!({ "errors": errors })).added_count(added))
    }

    /// Validates, applies, persists and broadcasts one explicit update.
    async fn apply_status_update(
        &self,
        update: &WordStatusUpdate,
    ) -> Result<WordFamilyInfo, LexisError> {
        if update.status.is_none() && update.familiarity_level.is_none() {
            return Err(LexisError::Validation(
                "either status or familiarityLevel is required".into(),
            ));
        }
        let family = self.family_for_write(&update.word).await?;

        let mut slot = self.cache.lock(family.id).await;
        let current = self.current_record(&family, &slot).await?;
        let next = apply_update(&current, update.status, update.familiarity_level, Utc::now())?;
        self.commit(&family, &mut slot, next).await?;
        drop(slot);

        self.forget_encounters(&family);
        self.clients.broadcast(&Notification::WordStatusUpdated {
            word: update.word.clone(),
            family_root: family.root.clone(),
            status: next.status(),
            familiarity_level: next.level.get(),
        });
        Ok(WordFamilyInfo::from_record(&family.root, &next))
    }

    /// Marks a family known. The flag reports whether anything changed.
    async fn apply_ignore(&self, word: &str) -> Result<(WordFamilyInfo, bool), LexisError> {
        let family = self.family_for_write(word).await?;

        let mut slot = self.cache.lock(family.id).await;
        let current = self.current_record(&family, &slot).await?;
        let Some(next) = ignore(&current, Utc::now()) else {
            *slot = Some(current);
            debug!(family_id = family.id, "already ignored");
            return Ok((WordFamilyInfo::from_record(&family.root, &current), false));
        };
        self.commit(&family, &mut slot, next).await?;
        drop(slot);

        self.forget_encounters(&family);
        self.clients.broadcast(&Notification::WordIgnored {
            word: word.to_string(),
            family_root: family.root.clone(),
        });
        Ok((WordFamilyInfo::from_record(&family.root, &next), true))
    }
}

pub(crate) fn internal(err: serde_json::Error) -> LexisError {
    LexisError::Internal(format!("response serialization: {err}"))
}
