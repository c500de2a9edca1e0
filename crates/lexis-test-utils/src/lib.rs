// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Lexis integration tests.
//!
//! Provides mock collaborators and a harness for fast, deterministic tests
//! without a real database or AI service.
//!
//! # Components
//!
//! - [`MockPersistence`] - In-memory vocabulary store with failure injection
//! - [`MockUpstream`] - Scripted chunk streams that record cancellation
//! - [`TestHarness`] - Router plus mocks, handing out connected clients

pub mod harness;
pub mod mock_persistence;
pub mod mock_upstream;

pub use harness::TestHarness;
pub use mock_persistence::MockPersistence;
pub use mock_upstream::{MockUpstream, Script};
