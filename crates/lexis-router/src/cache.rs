// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory familiarity cache with per-family serialization.
//!
//! Each family gets its own async mutex. A handler holds the guard for the
//! whole read-modify-write, including the persistence calls, so two updates
//! to the same family never interleave while updates to different families
//! run concurrently.

use std::sync::Arc;

use dashmap::DashMap;
use lexis_core::{FamiliarityRecord, FamilyId};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Locked slot for one family. `None` means nothing has been loaded yet.
pub type FamilySlot = OwnedMutexGuard<Option<FamiliarityRecord>>;

#[derive(Debug, Default)]
pub struct FamiliarityCache {
    slots: DashMap<FamilyId, Arc<Mutex<Option<FamiliarityRecord>>>>,
}

impl FamiliarityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to a family's slot.
    pub async fn lock(&self, family_id: FamilyId) -> FamilySlot {
        let slot = Arc::clone(self.slots.entry(family_id).or_default().value());
        slot.lock_owned().await
    }

    /// Number of families with a slot.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
