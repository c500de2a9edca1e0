// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Handshake authentication for the WebSocket endpoint.
//!
//! Browsers cannot set headers on a WebSocket handshake, so the token is
//! accepted either as `?token=<value>` or as `Authorization: Bearer <value>`.
//! With no token configured every handshake is accepted; the default bind
//! address is loopback only.

use axum::http::HeaderMap;

/// Authentication configuration for the gateway.
#[derive(Clone, Default)]
pub struct AuthConfig {
    /// Expected bearer token. If `Some`, handshakes must present it.
    pub bearer_token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

impl AuthConfig {
    pub fn new(bearer_token: Option<String>) -> Self {
        Self {
            bearer_token: bearer_token.filter(|t| !t.is_empty()),
        }
    }

    /// Checks a handshake. The query token takes priority over the header.
    pub fn authorize(&self, headers: &HeaderMap, query_token: Option<&str>) -> bool {
        let Some(expected) = self.bearer_token.as_deref() else {
            return true;
        };

        if query_token == Some(expected) {
            return true;
        }

        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|token| token == expected)
    }
}
