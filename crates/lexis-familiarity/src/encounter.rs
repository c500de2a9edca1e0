// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Passive-encounter counting.
//!
//! A family earns an automatic familiarity increase after it has been
//! encountered `threshold` times. With a window, only encounters inside the
//! trailing window count; without one, counting is cumulative until the
//! threshold fires.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use chrono::{DateTime, Utc};
use lexis_core::FamilyId;
use tracing::debug;

/// When an encountered family becomes eligible for an automatic increase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncounterPolicy {
    /// Encounters needed before the increase fires. Must be at least 1.
    pub threshold: u32,
    /// Sliding window; `None` counts every encounter since the last increase.
    pub window: Option<Duration>,
}

impl Default for EncounterPolicy {
    fn default() -> Self {
        Self {
            threshold: 3,
            window: None,
        }
    }
}

/// Per-family encounter history under an [`EncounterPolicy`].
#[derive(Debug, Default)]
pub struct EncounterTracker {
    policy: EncounterPolicy,
    seen: HashMap<FamilyId, VecDeque<DateTime<Utc>>>,
}

impl EncounterTracker {
    pub fn new(policy: EncounterPolicy) -> Self {
        Self {
            policy,
            seen: HashMap::new(),
        }
    }

    pub fn policy(&self) -> EncounterPolicy {
        self.policy
    }

    /// Records one encounter and reports whether the family is now eligible.
    ///
    /// Reaching the threshold resets that family's history, so the next
    /// increase needs a fresh run of encounters.
    pub fn record(&mut self, family_id: FamilyId, now: DateTime<Utc>) -> bool {
        let threshold = self.policy.threshold.max(1) as usize;
        let window = self
            .policy
            .window
            .and_then(|w| chrono::Duration::from_std(w).ok());

        let history = self.seen.entry(family_id).or_default();
        if let Some(window) = window {
            while history.front().is_some_and(|t| now - *t > window) {
                history.pop_front();
            }
        }
        history.push_back(now);

        if history.len() >= threshold {
            debug!(family_id, encounters = history.len(), "encounter threshold reached");
            self.seen.remove(&family_id);
            return true;
        }
        false
    }

    /// Current counted encounters for a family.
    pub fn count(&self, family_id: FamilyId) -> usize {
        self.seen.get(&family_id).map_or(0, VecDeque::len)
    }

    /// Drops a family's history, e.g. after an explicit status change.
    pub fn forget(&mut self, family_id: FamilyId) {
        self.seen.remove(&family_id);
    }
}
