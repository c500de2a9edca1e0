// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Familiarity record persistence.
//!
//! The `status` column is written from the level on every upsert and never
//! read back; the level is the source of truth.

use chrono::{DateTime, SecondsFormat, Utc};
use lexis_core::{FamiliarityLevel, FamiliarityRecord, FamilyId, LexisError};
use rusqlite::types::Type;
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};

/// Load the stored record for a family.
pub async fn get_familiarity(
    db: &Database,
    family_id: FamilyId,
) -> Result<Option<FamiliarityRecord>, LexisError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT level, updated_at FROM familiarity WHERE family_id = ?1",
                params![family_id],
                |row| {
                    let raw: u8 = row.get(0)?;
                    let level = FamiliarityLevel::new(raw).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(0, Type::Integer, Box::new(e))
                    })?;
                    let stamp: String = row.get(1)?;
                    let updated_at = DateTime::parse_from_rfc3339(&stamp)
                        .map_err(|e| {
                            rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e))
                        })?
                        .with_timezone(&Utc);
                    Ok(FamiliarityRecord::new(level, updated_at))
                },
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Insert or replace the record for a family.
pub async fn upsert_familiarity(
    db: &Database,
    family_id: FamilyId,
    record: &FamiliarityRecord,
) -> Result<(), LexisError> {
    let level = record.level.get();
    let status = record.status().to_string();
    let updated_at = record
        .updated_at
        .to_rfc3339_opts(SecondsFormat::Micros, true);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO familiarity (family_id, level, status, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(family_id) DO UPDATE SET
                    level = excluded.level,
                    status = excluded.status,
                    updated_at = excluded.updated_at",
                params![family_id, level, status, updated_at],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
