// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request handlers, grouped by what they touch.

mod ai;
mod lookup;
pub(crate) mod vocabulary;
