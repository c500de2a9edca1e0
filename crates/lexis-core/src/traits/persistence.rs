// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence collaborator trait for the vocabulary store.

use async_trait::async_trait;

use crate::error::LexisError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{DictionaryEntry, FamiliarityRecord, FamilyId, TagInfo, WordFamily};

/// The narrow storage contract the router depends on.
///
/// Word arguments are already normalized by the caller. Implementations
/// must not retry writes on their own; the router reports the failure and
/// lets the client decide.
#[async_trait]
pub trait PersistenceAdapter: PluginAdapter {
    /// Resolves a surface word to the family it belongs to.
    async fn family_by_word(&self, word: &str) -> Result<Option<WordFamily>, LexisError>;

    /// Loads the stored familiarity for a family, if one was ever written.
    async fn get_familiarity(
        &self,
        family_id: FamilyId,
    ) -> Result<Option<FamiliarityRecord>, LexisError>;

    /// Inserts or replaces the familiarity for a family.
    async fn upsert_familiarity(
        &self,
        family_id: FamilyId,
        record: &FamiliarityRecord,
    ) -> Result<(), LexisError>;

    /// Lists the labels attached to a family.
    async fn list_tags_for_family(&self, family_id: FamilyId) -> Result<Vec<TagInfo>, LexisError>;

    /// Loads the stored dictionary entry for a surface word.
    async fn dictionary_entry(&self, word: &str) -> Result<Option<DictionaryEntry>, LexisError>;
}
