// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Unsolicited envelopes pushed from the background coordinator.

use lexis_core::FamiliarityStatus;
use serde::{Deserialize, Serialize};

use crate::kind::MessageKind;

/// A broadcast or stream event.
///
/// Stream events are keyed by the word and reading context (enrichment) or
/// the sentence (translation) that opened the session, which is how a client
/// with several streams in flight tells them apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Notification {
    WordStatusUpdated {
        word: String,
        family_root: String,
        status: FamiliarityStatus,
        familiarity_level: u8,
    },
    WordIgnored {
        word: String,
        family_root: String,
    },
    EnrichStreamData {
        word: String,
        /// Reading context of the session, when the request carried one.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        context: Option<String>,
        content: String,
    },
    EnrichStreamComplete {
        word: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        context: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
    },
    EnrichStreamError {
        word: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        context: Option<String>,
        error: String,
    },
    TranslateStreamData {
        sentence: String,
        content: String,
    },
    TranslateStreamComplete {
        sentence: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        translation: Option<String>,
    },
    TranslateStreamError {
        sentence: String,
        error: String,
    },
    AutoIncreaseFamiliarity {
        word: String,
        family_root: String,
        status: FamiliarityStatus,
        familiarity_level: u8,
    },
}

impl Notification {
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::WordStatusUpdated { .. } => MessageKind::WordStatusUpdated,
            Self::WordIgnored { .. } => MessageKind::WordIgnored,
            Self::EnrichStreamData { .. } => MessageKind::EnrichStreamData,
            Self::EnrichStreamComplete { .. } => MessageKind::EnrichStreamComplete,
            Self::EnrichStreamError { .. } => MessageKind::EnrichStreamError,
            Self::TranslateStreamData { .. } => MessageKind::TranslateStreamData,
            Self::TranslateStreamComplete { .. } => MessageKind::TranslateStreamComplete,
            Self::TranslateStreamError { .. } => MessageKind::TranslateStreamError,
            Self::AutoIncreaseFamiliarity { .. } => MessageKind::AutoIncreaseFamiliarity,
        }
    }

    pub fn is_stream_terminal(&self) -> bool {
        self.kind().is_stream_terminal()
    }
}
