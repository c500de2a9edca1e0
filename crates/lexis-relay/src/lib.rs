// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Streaming relay for AI enrichment and sentence translation.
//!
//! Each session forwards upstream chunks to one client as `*_STREAM_DATA`
//! events in order, then sends exactly one `*_STREAM_COMPLETE` or
//! `*_STREAM_ERROR`. A session stops, and drops its upstream stream, as soon
//! as the client's channel closes or its cancellation token fires.

pub mod emitter;
pub mod relay;
pub mod session;

pub use emitter::{ChannelClosed, SessionEmitter};
pub use relay::{StartOutcome, StreamRelay};
pub use session::{SessionKey, StreamKind, StreamTarget};
