// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background message router for the Lexis coordinator.
//!
//! The router decodes request envelopes, dispatches them through a fixed
//! handler table, owns the familiarity cache, and broadcasts unsolicited
//! notifications to every connected client context.

pub mod cache;
pub mod connection;
mod handlers;
pub mod registry;
pub mod router;
pub mod settings;

pub use connection::ClientConnection;
pub use registry::{ClientHandle, ClientRegistry};
pub use router::MessageRouter;
pub use settings::RouterSettings;
