// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits consumed by the message router.
//!
//! Both collaborators extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` so they can be held as trait objects.

pub mod adapter;
pub mod persistence;
pub mod upstream;

pub use adapter::PluginAdapter;
pub use persistence::PersistenceAdapter;
pub use upstream::{ChunkStream, UpstreamAdapter};
