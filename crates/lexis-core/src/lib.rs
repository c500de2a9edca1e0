// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Lexis vocabulary coordinator.
//!
//! This crate provides the data model shared by every other crate in the
//! workspace (word families, familiarity records, dictionary entries), the
//! [`LexisError`] taxonomy, and the collaborator traits the message router
//! consumes: [`PersistenceAdapter`] and [`UpstreamAdapter`].

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::LexisError;
pub use types::{
    AdapterType, ClientId, DefinitionEntry, DictionaryEntry, EnrichOptions, EnrichRequest,
    EntrySource, FamiliarityLevel, FamiliarityRecord, FamiliarityStatus, FamilyId, HealthStatus,
    SentenceAnalysisMode, TagInfo, TranslateRequest, WordFamily, WordFamilyInfo,
    normalize_context, normalize_word,
};

pub use traits::{ChunkStream, PersistenceAdapter, PluginAdapter, UpstreamAdapter};
