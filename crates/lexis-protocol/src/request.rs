// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request envelopes sent by content-script clients.

use std::str::FromStr;

use lexis_core::{EnrichOptions, FamiliarityStatus, LexisError, SentenceAnalysisMode};
use serde::{Deserialize, Serialize};

use crate::kind::MessageKind;

/// One `(word, status?, familiarityLevel?)` tuple.
///
/// Both optional fields may be absent on the wire; the router rejects such
/// a tuple on its own without failing the rest of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordStatusUpdate {
    pub word: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<FamiliarityStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub familiarity_level: Option<u8>,
}

/// A batch item that either parsed as a tuple or did not.
///
/// Keeping malformed items as raw JSON lets one bad tuple fail on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchUpdateEntry {
    Valid(WordStatusUpdate),
    Malformed(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichPayload {
    pub word: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default)]
    pub enhanced_phrase_detection: bool,
    #[serde(default)]
    pub sentence_analysis_mode: SentenceAnalysisMode,
}

impl EnrichPayload {
    pub fn options(&self) -> EnrichOptions {
        EnrichOptions {
            enhanced_phrase_detection: self.enhanced_phrase_detection,
            sentence_analysis_mode: self.sentence_analysis_mode,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatePayload {
    pub sentence: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paragraph: Option<String>,
}

/// A request envelope, one variant per request kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Request {
    QueryWordsStatus { words: Vec<String> },
    GetWordDetails { word: String },
    GetInternalDefinition { word: String },
    UpdateWordStatus(WordStatusUpdate),
    IgnoreWord { word: String },
    BatchIgnoreWords { words: Vec<String> },
    BatchUpdateWordStatus { updates: Vec<BatchUpdateEntry> },
    EnrichWord(EnrichPayload),
    EnrichWordStream(EnrichPayload),
    TranslateSentence(TranslatePayload),
    TranslateSentenceStream(TranslatePayload),
}

impl Request {
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::QueryWordsStatus { .. } => MessageKind::QueryWordsStatus,
            Self::GetWordDetails { .. } => MessageKind::GetWordDetails,
            Self::GetInternalDefinition { .. } => MessageKind::GetInternalDefinition,
            Self::UpdateWordStatus(_) => MessageKind::UpdateWordStatus,
            Self::IgnoreWord { .. } => MessageKind::IgnoreWord,
            Self::BatchIgnoreWords { .. } => MessageKind::BatchIgnoreWords,
            Self::BatchUpdateWordStatus { .. } => MessageKind::BatchUpdateWordStatus,
            Self::EnrichWord(_) => MessageKind::EnrichWord,
            Self::EnrichWordStream(_) => MessageKind::EnrichWordStream,
            Self::TranslateSentence(_) => MessageKind::TranslateSentence,
            Self::TranslateSentenceStream(_) => MessageKind::TranslateSentenceStream,
        }
    }
}

/// Decodes a raw envelope into a typed [`Request`].
///
/// The `type` field is checked against the registry before the payload is
/// parsed, so an unknown kind is reported as such rather than as a shape
/// mismatch.
pub fn decode_request(envelope: serde_json::Value) -> Result<Request, LexisError> {
    let type_name = envelope
        .get("type")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| LexisError::Validation("message is missing a `type` field".into()))?;

    let kind = MessageKind::from_str(type_name).map_err(|_| {
        LexisError::UnrecognizedMessageType {
            kind: type_name.to_string(),
        }
    })?;

    if kind.is_broadcast() {
        return Err(LexisError::Validation(format!(
            "{kind} is a broadcast and cannot be sent as a request"
        )));
    }

    serde_json::from_value::<Request>(envelope)
        .map_err(|e| LexisError::Validation(format!("invalid {kind} message: {e}")))
}
