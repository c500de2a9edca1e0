// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport frames that correlate responses with requests.
//!
//! Client -> background:
//! ```json
//! {"requestId": 7, "message": {"type": "IGNORE_WORD", "word": "cat"}}
//! ```
//!
//! Background -> client:
//! ```json
//! {"frame": "response", "requestId": 7, "response": {"success": true}}
//! {"frame": "notification", "notification": {"type": "WORD_IGNORED", "word": "cat", "familyRoot": "cat"}}
//! ```

use serde::{Deserialize, Serialize};

use crate::notification::Notification;
use crate::request::Request;
use crate::response::Response;

/// Client-chosen correlation id, unique per client context.
pub type RequestId = u64;

/// A request envelope plus its correlation id.
///
/// The envelope is kept as raw JSON so the router can answer even when the
/// envelope itself does not decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientFrame {
    pub request_id: RequestId,
    pub message: serde_json::Value,
}

impl ClientFrame {
    pub fn new(request_id: RequestId, request: &Request) -> Result<Self, serde_json::Error> {
        Ok(Self {
            request_id,
            message: serde_json::to_value(request)?,
        })
    }
}

/// Everything the background coordinator sends to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "frame", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerFrame {
    Response {
        request_id: RequestId,
        response: Response,
    },
    Notification {
        notification: Notification,
    },
}

impl From<Notification> for ServerFrame {
    fn from(notification: Notification) -> Self {
        Self::Notification { notification }
    }
}
