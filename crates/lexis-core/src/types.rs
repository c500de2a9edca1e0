// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Data model shared across the Lexis workspace.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::LexisError;

/// Primary key of a word family in the persistence layer.
pub type FamilyId = i64;

/// Identifies one connected content-script context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClientId(pub String);

impl ClientId {
    /// Allocates a fresh random client identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of collaborator behind a [`PluginAdapter`](crate::PluginAdapter).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Persistence,
    Upstream,
    Gateway,
}

/// Lowercases and trims a surface word.
///
/// Every lookup key in the system goes through this, so `" Running"` and
/// `"running"` always resolve to the same row.
pub fn normalize_word(word: &str) -> String {
    word.trim().to_lowercase()
}

/// Trims a reading context; blank contexts count as absent.
///
/// An enrichment stream is identified by the normalized word plus this.
pub fn normalize_context(context: Option<&str>) -> Option<String> {
    context
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

// --- Familiarity ---

/// Coarse three-value projection of a [`FamiliarityLevel`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FamiliarityStatus {
    Unknown,
    Learning,
    Known,
}

/// Granular knowledge score in `0..=7`.
///
/// The type cannot hold an out-of-range value, and [`status`](Self::status)
/// is the only way to obtain a status for a level.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct FamiliarityLevel(u8);

impl FamiliarityLevel {
    pub const MIN: Self = Self(0);
    pub const MAX: Self = Self(7);

    /// Validates a raw level.
    pub fn new(value: u8) -> Result<Self, LexisError> {
        if value > Self::MAX.0 {
            return Err(LexisError::Validation(format!(
                "familiarityLevel must be between 0 and 7, got {value}"
            )));
        }
        Ok(Self(value))
    }

    /// Builds a level from any integer, clamping into range.
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(0, i64::from(Self::MAX.0)) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Monotonic projection: 0 is unknown, 1..=6 learning, 7 known.
    pub fn status(self) -> FamiliarityStatus {
        match self.0 {
            0 => FamiliarityStatus::Unknown,
            7 => FamiliarityStatus::Known,
            _ => FamiliarityStatus::Learning,
        }
    }
}

impl TryFrom<u8> for FamiliarityLevel {
    type Error = LexisError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FamiliarityLevel> for u8 {
    fn from(level: FamiliarityLevel) -> Self {
        level.0
    }
}

impl fmt::Display for FamiliarityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Familiarity of the (single) profile with one word family.
///
/// Status is never stored on the record; it is always derived from the
/// level, so the two cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamiliarityRecord {
    pub level: FamiliarityLevel,
    pub updated_at: DateTime<Utc>,
}

impl FamiliarityRecord {
    pub fn new(level: FamiliarityLevel, updated_at: DateTime<Utc>) -> Self {
        Self { level, updated_at }
    }

    /// The lazily-created record for a family never seen before.
    pub fn unseen() -> Self {
        Self {
            level: FamiliarityLevel::MIN,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    pub fn status(&self) -> FamiliarityStatus {
        self.level.status()
    }
}

/// Canonical root form grouping several surface words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordFamily {
    pub id: FamilyId,
    pub root: String,
}

/// What a client learns about a surface word's family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordFamilyInfo {
    pub status: FamiliarityStatus,
    /// `None` when the word resolves to no known family.
    pub family_root: Option<String>,
    pub familiarity_level: u8,
}

impl WordFamilyInfo {
    /// Default entry for a word with no known family.
    pub fn unknown() -> Self {
        Self {
            status: FamiliarityStatus::Unknown,
            family_root: None,
            familiarity_level: 0,
        }
    }

    pub fn from_record(root: &str, record: &FamiliarityRecord) -> Self {
        Self {
            status: record.status(),
            family_root: Some(root.to_string()),
            familiarity_level: record.level.get(),
        }
    }
}

// --- Dictionary ---

/// Label attached to a word family, e.g. frequency-list membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One part of speech and its ordered senses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionEntry {
    pub pos: String,
    pub senses: Vec<String>,
}

/// Whether a dictionary entry is authoritative or generated.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntrySource {
    Db,
    Ai,
}

/// Dictionary data for one surface word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryEntry {
    pub word: String,
    #[serde(default)]
    pub phonetics: Vec<String>,
    #[serde(default)]
    pub audio: Vec<String>,
    #[serde(default)]
    pub forms: Vec<String>,
    #[serde(default)]
    pub definitions: Vec<DefinitionEntry>,
    /// Short glosses keyed by language code.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub short_glosses: BTreeMap<String, String>,
    pub source: EntrySource,
    #[serde(default)]
    pub tags: Vec<TagInfo>,
}

// --- Upstream requests ---

/// How aggressively the upstream should analyse the surrounding sentence.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SentenceAnalysisMode {
    Always,
    #[default]
    Smart,
    Off,
}

/// Tuning knobs forwarded to the enrichment prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichOptions {
    #[serde(default)]
    pub enhanced_phrase_detection: bool,
    #[serde(default)]
    pub sentence_analysis_mode: SentenceAnalysisMode,
}

/// Input for [`UpstreamAdapter::enrich`](crate::UpstreamAdapter::enrich).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichRequest {
    pub word: String,
    pub context: Option<String>,
    pub options: EnrichOptions,
}

/// Input for [`UpstreamAdapter::translate`](crate::UpstreamAdapter::translate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateRequest {
    pub sentence: String,
    pub paragraph: Option<String>,
}
