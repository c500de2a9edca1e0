// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The page's local view of word familiarity.

use std::collections::HashMap;

use lexis_core::{FamiliarityLevel, FamiliarityStatus, WordFamilyInfo, normalize_word};
use lexis_protocol::Notification;

/// Lowercased surface word to its family's status, as last reported.
///
/// Notifications name a family root, so one update refreshes every cached
/// word of that family.
#[derive(Debug, Clone, Default)]
pub struct LocalVocabulary {
    words: HashMap<String, WordFamilyInfo>,
}

impl LocalVocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&mut self, word: &str, info: WordFamilyInfo) {
        self.words.insert(normalize_word(word), info);
    }

    pub fn get(&self, word: &str) -> Option<&WordFamilyInfo> {
        self.words.get(&normalize_word(word))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Folds a familiarity notification into the cache. Returns false for
    /// notifications that carry no familiarity change.
    pub fn apply(&mut self, notification: &Notification) -> bool {
        match notification {
            Notification::WordStatusUpdated {
                word,
                family_root,
                status,
                familiarity_level,
            }
            | Notification::AutoIncreaseFamiliarity {
                word,
                family_root,
                status,
                familiarity_level,
            } => {
                self.set_family(word, family_root, *status, *familiarity_level);
                true
            }
            Notification::WordIgnored { word, family_root } => {
                self.set_family(
                    word,
                    family_root,
                    FamiliarityStatus::Known,
                    FamiliarityLevel::MAX.get(),
                );
                true
            }
            _ => false,
        }
    }

    fn set_family(&mut self, word: &str, root: &str, status: FamiliarityStatus, level: u8) {
        let info = WordFamilyInfo {
            status,
            family_root: Some(root.to_string()),
            familiarity_level: level,
        };
        for cached in self.words.values_mut() {
            if cached.family_root.as_deref() == Some(root) {
                *cached = info.clone();
            }
        }
        self.words.insert(normalize_word(word), info);
    }
}
