// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Definition lookups and the passive-encounter path they feed.

use chrono::Utc;
use lexis_core::{
    DictionaryEntry, FamiliarityLevel, LexisError, WordFamily, WordFamilyInfo,
};
use lexis_familiarity::increment;
use lexis_protocol::{Notification, Response};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::handlers::vocabulary::internal;
use crate::router::MessageRouter;

impl MessageRouter {
    /// Stored entry with the family's tags merged in, or `data: null`.
    pub(crate) async fn get_internal_definition(&self, word: &str) -> Result<Response, LexisError> {
        let family = self.persistence.family_by_word(word).await?;
        let entry = self.entry_with_tags(word, family.as_ref()).await?;

        if let Some(family) = &family {
            self.note_encounter(word, family).await;
        }
        let data = match entry {
            Some(entry) => serde_json::to_value(entry).map_err(internal)?,
            None => Value::Null,
        };
        Ok(Response::with_data(data))
    }

    /// Legacy lookup: the entry (possibly null) plus the family's status.
    pub(crate) async fn get_word_details(&self, word: &str) -> Result<Response, LexisError> {
        let family = self.persistence.family_by_word(word).await?;
        let entry = self.entry_with_tags(word, family.as_ref()).await?;
        let info = match &family {
            Some(family) => {
                let record = self.read_record(family).await?;
                WordFamilyInfo::from_record(&family.root, &record)
            }
            None => WordFamilyInfo::unknown(),
        };

        if let Some(family) = &family {
            self.note_encounter(word, family).await;
        }
        Ok(Response::with_data(json!({
            "word": word,
            "entry": entry,
            "familiarity": info,
        })))
    }

    async fn entry_with_tags(
        &self,
        word: &str,
        family: Option<&WordFamily>,
    ) -> Result<Option<DictionaryEntry>, LexisError> {
        let Some(mut entry) = self.persistence.dictionary_entry(word).await? else {
            return Ok(None);
        };
        if let Some(family) = family {
            for tag in self.persistence.list_tags_for_family(family.id).await? {
                if !entry.tags.iter().any(|t| t.name == tag.name) {
                    entry.tags.push(tag);
                }
            }
        }
        Ok(Some(entry))
    }

    /// Counts a passive encounter; at the threshold, raises familiarity by one.
    ///
    /// Failures here are logged and swallowed: the lookup that triggered the
    /// encounter still succeeds.
    pub(crate) async fn note_encounter(&self, word: &str, family: &WordFamily) {
        if !self.record_encounter(family) {
            return;
        }
        if let Err(err) = self.auto_increase(word, family).await {
            warn!(family_id = family.id, error = %err, "auto-increase failed");
        }
    }

    async fn auto_increase(&self, word: &str, family: &WordFamily) -> Result<(), LexisError> {
        let mut slot = self.cache.lock(family.id).await;
        let current = self.current_record(family, &slot).await?;
        if current.level == FamiliarityLevel::MAX {
            *slot = Some(current);
            debug!(family_id = family.id, "already known, no auto-increase");
            return Ok(());
        }
        let next = increment(&current, Utc::now());
        self.commit(family, &mut slot, next).await?;
        drop(slot);

        info!(
            family_id = family.id,
            from = current.level.get(),
            to = next.level.get(),
            "familiarity auto-increased"
        );
        let status = next.status();
        let familiarity_level = next.level.get();
        self.clients.broadcast(&Notification::AutoIncreaseFamiliarity {
            word: word.to_string(),
            family_root: family.root.clone(),
            status,
            familiarity_level,
        });
        self.clients.broadcast(&Notification::WordStatusUpdated {
            word: word.to_string(),
            family_root: family.root.clone(),
            status,
            familiarity_level,
        });
        Ok(())
    }
}
