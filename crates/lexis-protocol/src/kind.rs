// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The closed registry of message kinds.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Every `type` value the protocol knows about.
///
/// The first eleven kinds are requests a client may send; the rest are
/// broadcasts only the background coordinator emits.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageKind {
    QueryWordsStatus,
    /// Legacy lookup kept for older content scripts.
    GetWordDetails,
    GetInternalDefinition,
    UpdateWordStatus,
    IgnoreWord,
    BatchIgnoreWords,
    BatchUpdateWordStatus,
    EnrichWord,
    EnrichWordStream,
    TranslateSentence,
    TranslateSentenceStream,

    WordStatusUpdated,
    WordIgnored,
    EnrichStreamData,
    EnrichStreamComplete,
    EnrichStreamError,
    TranslateStreamData,
    TranslateStreamComplete,
    TranslateStreamError,
    AutoIncreaseFamiliarity,
}

impl MessageKind {
    /// True for kinds only the background coordinator may emit.
    pub fn is_broadcast(self) -> bool {
        matches!(
            self,
            Self::WordStatusUpdated
                | Self::WordIgnored
                | Self::EnrichStreamData
                | Self::EnrichStreamComplete
                | Self::EnrichStreamError
                | Self::TranslateStreamData
                | Self::TranslateStreamComplete
                | Self::TranslateStreamError
                | Self::AutoIncreaseFamiliarity
        )
    }

    /// True for the `*_STREAM_COMPLETE` / `*_STREAM_ERROR` kinds.
    pub fn is_stream_terminal(self) -> bool {
        matches!(
            self,
            Self::EnrichStreamComplete
                | Self::EnrichStreamError
                | Self::TranslateStreamComplete
                | Self::TranslateStreamError
        )
    }
}
