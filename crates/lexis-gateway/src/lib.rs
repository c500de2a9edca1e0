// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP/WebSocket gateway hosting client contexts.
//!
//! Every WebSocket is attached to the one shared [`MessageRouter`]; the
//! gateway only moves frames and never interprets them.
//!
//! [`MessageRouter`]: lexis_router::MessageRouter

pub mod auth;
pub mod handlers;
pub mod server;
pub mod ws;

pub use auth::AuthConfig;
pub use server::{Gateway, GatewayState, ServerConfig, app};
