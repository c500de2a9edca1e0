// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Familiarity state model for word families.
//!
//! This crate is pure: no I/O, no clocks. Callers pass the current time in.
//!
//! - [`transition`]: increment, explicit status/level updates, ignore, and
//!   the cache-vs-store merge rule
//! - [`encounter`]: passive-encounter counting that decides when a family
//!   earns an automatic familiarity increase

pub mod encounter;
pub mod transition;

pub use encounter::{EncounterPolicy, EncounterTracker};
pub use transition::{apply_status, apply_update, ignore, increment, merge};
