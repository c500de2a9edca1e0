// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message envelopes exchanged between the background coordinator and
//! content-script clients.
//!
//! - [`MessageKind`]: the closed registry of every `type` value on the wire
//! - [`Request`]: one variant per request kind, each with only its fields
//! - [`Notification`]: unsolicited broadcasts and stream events
//! - [`Response`]: the `{success, data?, error?, message?}` reply shape
//! - [`ClientFrame`] / [`ServerFrame`]: correlation wrappers for transport

pub mod frame;
pub mod kind;
pub mod notification;
pub mod request;
pub mod response;

pub use frame::{ClientFrame, RequestId, ServerFrame};
pub use kind::MessageKind;
pub use notification::Notification;
pub use request::{
    BatchUpdateEntry, EnrichPayload, Request, TranslatePayload, WordStatusUpdate, decode_request,
};
pub use response::Response;
