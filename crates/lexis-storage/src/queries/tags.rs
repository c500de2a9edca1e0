// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tag definitions and family-tag links.

use lexis_core::{FamilyId, LexisError, TagInfo};
use rusqlite::params;

use crate::database::{Database, map_tr_err};

/// Insert a tag (or refresh its description), returning its id.
pub async fn insert_tag(
    db: &Database,
    name: &str,
    description: Option<&str>,
) -> Result<i64, LexisError> {
    let name = name.to_string();
    let description = description.map(str::to_string);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO tags (name, description) VALUES (?1, ?2)
                 ON CONFLICT(name) DO UPDATE SET description = excluded.description",
                params![name, description],
            )?;
            conn.query_row("SELECT id FROM tags WHERE name = ?1", params![name], |row| {
                row.get(0)
            })
        })
        .await
        .map_err(map_tr_err)
}

/// Link a tag to a family. Linking twice is a no-op.
pub async fn tag_family(db: &Database, family_id: FamilyId, tag_id: i64) -> Result<(), LexisError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO family_tags (family_id, tag_id) VALUES (?1, ?2)",
                params![family_id, tag_id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Tags attached to a family, ordered by name.
pub async fn list_tags_for_family(
    db: &Database,
    family_id: FamilyId,
) -> Result<Vec<TagInfo>, LexisError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT t.name, t.description FROM family_tags ft
                 JOIN tags t ON t.id = ft.tag_id
                 WHERE ft.family_id = ?1
                 ORDER BY t.name",
            )?;
            let rows = stmt.query_map(params![family_id], |row| {
                Ok(TagInfo {
                    name: row.get(0)?,
                    description: row.get(1)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
