// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Familiarity transitions.
//!
//! Every function returns a new [`FamiliarityRecord`] stamped with `now`.
//! Status is derived from level on the record itself, so none of these can
//! produce a record whose status disagrees with its level.

use chrono::{DateTime, Utc};
use lexis_core::{FamiliarityLevel, FamiliarityRecord, FamiliarityStatus, LexisError};

/// Highest level that still projects to `learning`.
const TOP_LEARNING_LEVEL: u8 = 6;

/// Raises the level by one, saturating at 7.
pub fn increment(current: &FamiliarityRecord, now: DateTime<Utc>) -> FamiliarityRecord {
    let next = FamiliarityLevel::clamped(i64::from(current.level.get()) + 1);
    FamiliarityRecord::new(next, now)
}

/// Maps a coarse status onto a representative level.
///
/// `learning` keeps existing progress: a family already in `1..=6` stays
/// where it is, an unknown family starts at 1, and a known family drops to 6
/// (the highest level that is still `learning`).
pub fn apply_status(
    current: &FamiliarityRecord,
    status: FamiliarityStatus,
    now: DateTime<Utc>,
) -> FamiliarityRecord {
    let level = match status {
        FamiliarityStatus::Unknown => FamiliarityLevel::MIN,
        FamiliarityStatus::Known => FamiliarityLevel::MAX,
        FamiliarityStatus::Learning => {
            let previous = current.level.get();
            FamiliarityLevel::clamped(i64::from(previous.clamp(1, TOP_LEARNING_LEVEL)))
        }
    };
    FamiliarityRecord::new(level, now)
}

/// Applies an explicit `(status?, familiarityLevel?)` update.
///
/// At least one field is required. When both are present they must agree,
/// i.e. `status` must be the projection of `familiarityLevel`.
pub fn apply_update(
    current: &FamiliarityRecord,
    status: Option<FamiliarityStatus>,
    level: Option<u8>,
    now: DateTime<Utc>,
) -> Result<FamiliarityRecord, LexisError> {
    match (status, level) {
        (None, None) => Err(LexisError::Validation(
            "either status or familiarityLevel is required".into(),
        )),
        (None, Some(raw)) => Ok(FamiliarityRecord::new(FamiliarityLevel::new(raw)?, now)),
        (Some(status), None) => Ok(apply_status(current, status, now)),
        (Some(status), Some(raw)) => {
            let level = FamiliarityLevel::new(raw)?;
            if level.status() != status {
                return Err(LexisError::Validation(format!(
                    "status `{status}` does not match familiarityLevel {raw} (which is `{}`)",
                    level.status()
                )));
            }
            Ok(FamiliarityRecord::new(level, now))
        }
    }
}

/// Jumps straight to `known`.
///
/// Returns `None` when the family is already known, so re-ignoring keeps the
/// original record and timestamp untouched.
pub fn ignore(current: &FamiliarityRecord, now: DateTime<Utc>) -> Option<FamiliarityRecord> {
    if current.level == FamiliarityLevel::MAX {
        return None;
    }
    Some(FamiliarityRecord::new(FamiliarityLevel::MAX, now))
}

/// Reconciles the cached record with the stored one.
///
/// The most recent write wins; on a timestamp tie the higher level wins so
/// visible progress never regresses.
pub fn merge(cached: &FamiliarityRecord, stored: &FamiliarityRecord) -> FamiliarityRecord {
    match cached.updated_at.cmp(&stored.updated_at) {
        std::cmp::Ordering::Greater => *cached,
        std::cmp::Ordering::Less => *stored,
        std::cmp::Ordering::Equal => {
            if cached.level >= stored.level {
                *cached
            } else {
                *stored
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use proptest::prelude::*;

    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn record(level: u8, secs: i64) -> FamiliarityRecord {
        FamiliarityRecord::new(FamiliarityLevel::new(level).unwrap(), at(secs))
    }

    #[test]
    fn increment_clamps_at_seven() {
        let r = increment(&record(7, 0), at(1));
        assert_eq!(r.level.get(), 7);
        assert_eq!(r.status(), FamiliarityStatus::Known);
    }

    #[test]
    fn increment_from_unknown_enters_learning() {
        let r = increment(&FamiliarityRecord::unseen(), at(1));
        assert_eq!(r.level.get(), 1);
        assert_eq!(r.status(), FamiliarityStatus::Learning);
    }

    #[test]
    fn learning_keeps_partial_progress() {
        assert_eq!(apply_status(&record(4, 0), FamiliarityStatus::Learning, at(1)).level.get(), 4);
        assert_eq!(apply_status(&record(0, 0), FamiliarityStatus::Learning, at(1)).level.get(), 1);
        assert_eq!(apply_status(&record(7, 0), FamiliarityStatus::Learning, at(1)).level.get(), 6);
    }

    #[test]
    fn unknown_and_known_map_to_extremes() {
        assert_eq!(apply_status(&record(5, 0), FamiliarityStatus::Unknown, at(1)).level.get(), 0);
        assert_eq!(apply_status(&record(2, 0), FamiliarityStatus::Known, at(1)).level.get(), 7);
    }

    #[test]
    fn update_requires_a_field() {
        let err = apply_update(&record(2, 0), None, None, at(1)).unwrap_err();
        assert!(matches!(err, LexisError::Validation(_)));
    }

    #[test]
    fn update_with_level_projects_status() {
        let r = apply_update(&record(0, 0), None, Some(3), at(1)).unwrap();
        assert_eq!(r.level.get(), 3);
        assert_eq!(r.status(), FamiliarityStatus::Learning);
    }

    #[test]
    fn update_rejects_out_of_range_level() {
        assert!(apply_update(&record(0, 0), None, Some(8), at(1)).is_err());
    }

    #[test]
    fn update_rejects_disagreeing_fields() {
        let err = apply_update(&record(0, 0), Some(FamiliarityStatus::Known), Some(3), at(1))
            .unwrap_err();
        assert!(matches!(err, LexisError::Validation(ref m) if m.contains("does not match")));
    }

    #[test]
    fn update_accepts_agreeing_fields() {
        let r = apply_update(&record(0, 0), Some(FamiliarityStatus::Known), Some(7), at(1)).unwrap();
        assert_eq!(r.level, FamiliarityLevel::MAX);
    }

    #[test]
    fn ignore_is_idempotent() {
        let first = ignore(&record(2, 0), at(1)).unwrap();
        assert_eq!(first.status(), FamiliarityStatus::Known);
        assert!(ignore(&first, at(2)).is_none());
    }

    #[test]
    fn merge_prefers_newer_write() {
        assert_eq!(merge(&record(2, 10), &record(5, 5)).level.get(), 2);
        assert_eq!(merge(&record(5, 5), &record(2, 10)).level.get(), 2);
    }

    #[test]
    fn merge_tie_prefers_higher_level() {
        assert_eq!(merge(&record(2, 10), &record(5, 10)).level.get(), 5);
        assert_eq!(merge(&record(6, 10), &record(5, 10)).level.get(), 6);
    }

    proptest! {
        #[test]
        fn increment_never_decreases(level in 0u8..=7, times in 1usize..20) {
            let mut r = record(level, 0);
            for i in 0..times {
                let next = increment(&r, at(i as i64 + 1));
                prop_assert!(next.level >= r.level);
                prop_assert!(next.level <= FamiliarityLevel::MAX);
                r = next;
            }
        }

        #[test]
        fn merge_is_one_of_its_inputs(a in 0u8..=7, b in 0u8..=7, ta in 0i64..5, tb in 0i64..5) {
            let (x, y) = (record(a, ta), record(b, tb));
            let m = merge(&x, &y);
            prop_assert!(m == x || m == y);
            if ta == tb {
                prop_assert_eq!(m.level.get(), a.max(b));
            }
        }

        #[test]
        fn status_update_always_matches_requested_status(level in 0u8..=7, s in 0usize..3) {
            let status = [
                FamiliarityStatus::Unknown,
                FamiliarityStatus::Learning,
                FamiliarityStatus::Known,
            ][s];
            let r = apply_status(&record(level, 0), status, at(1));
            prop_assert_eq!(r.status(), status);
        }
    }
}
