// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session identity and the client a session delivers to.

use lexis_core::{ClientId, normalize_context, normalize_word};
use lexis_protocol::ServerFrame;
use strum::Display;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Which upstream operation a session relays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum StreamKind {
    Enrich,
    Translate,
}

/// At most one live session exists per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub client: ClientId,
    pub kind: StreamKind,
    subject: String,
    context: Option<String>,
}

impl SessionKey {
    /// Enrichment of `word` read in `context`.
    pub fn enrich(client: ClientId, word: &str, context: Option<&str>) -> Self {
        Self {
            client,
            kind: StreamKind::Enrich,
            subject: normalize_word(word),
            context: normalize_context(context),
        }
    }

    /// Translation of `sentence`.
    pub fn translate(client: ClientId, sentence: &str) -> Self {
        Self {
            client,
            kind: StreamKind::Translate,
            subject: sentence.trim().to_string(),
            context: None,
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Reading context of an enrichment session. Events echo it so a client
    /// can tell same-word sessions apart.
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }
}

/// Where a session's events go.
///
/// `cancel` is the client's teardown token: cancelling it aborts every
/// session the client owns.
#[derive(Debug, Clone)]
pub struct StreamTarget {
    pub client: ClientId,
    pub outbound: mpsc::Sender<ServerFrame>,
    pub cancel: CancellationToken,
}
