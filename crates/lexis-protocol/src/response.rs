// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The reply shape every request handler produces.

use lexis_core::LexisError;
use serde::{Deserialize, Serialize};

/// `{success, data?, error?, message?, addedCount?, updatedCount?}`.
///
/// Failed responses can only be built from a [`LexisError`], so
/// `success: false` always comes with a populated `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_count: Option<usize>,
}

impl Response {
    /// Successful response with no payload.
    pub fn ok() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            message: None,
            added_count: None,
            updated_count: None,
        }
    }

    /// Successful response carrying `data`.
    pub fn with_data(data: serde_json::Value) -> Self {
        Self {
            data: Some(data),
            ..Self::ok()
        }
    }

    /// Failed response with the error's plain-language message.
    pub fn failure(err: &LexisError) -> Self {
        Self {
            success: false,
            error: Some(err.user_message()),
            ..Self::ok()
        }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn added_count(mut self, count: usize) -> Self {
        self.added_count = Some(count);
        self
    }

    pub fn updated_count(mut self, count: usize) -> Self {
        self.updated_count = Some(count);
        self
    }
}

impl From<Result<Response, LexisError>> for Response {
    fn from(result: Result<Response, LexisError>) -> Self {
        result.unwrap_or_else(|e| Self::failure(&e))
    }
}
