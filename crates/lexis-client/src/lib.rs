// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content-script client for the Lexis background coordinator.
//!
//! Each page context owns one [`ContentScriptClient`]. It sends request
//! envelopes, correlates their responses, keeps a [`LocalVocabulary`] in
//! step with broadcasts, and exposes relayed streams as
//! [`StreamSubscription`]s. Nothing outlives the client once it is dropped.

pub mod client;
pub mod subscription;
pub mod vocabulary;
mod ws;

pub use client::ContentScriptClient;
pub use subscription::{StreamEvent, StreamSubscription};
pub use vocabulary::LocalVocabulary;
