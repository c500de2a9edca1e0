// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Word family and surface word operations.

use lexis_core::{FamilyId, LexisError, WordFamily, normalize_word};
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};

/// Insert a family root, returning its id. Re-inserting a root returns the existing id.
pub async fn insert_family(db: &Database, root: &str) -> Result<FamilyId, LexisError> {
    let root = normalize_word(root);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO word_families (root) VALUES (?1) ON CONFLICT(root) DO NOTHING",
                params![root],
            )?;
            conn.query_row(
                "SELECT id FROM word_families WHERE root = ?1",
                params![root],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Attach a surface word to a family. A word already attached elsewhere is moved.
pub async fn insert_word(db: &Database, word: &str, family_id: FamilyId) -> Result<(), LexisError> {
    let word = normalize_word(word);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO words (text, family_id) VALUES (?1, ?2)
                 ON CONFLICT(text) DO UPDATE SET family_id = excluded.family_id",
                params![word, family_id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Resolve a surface word to its family.
pub async fn family_by_word(db: &Database, word: &str) -> Result<Option<WordFamily>, LexisError> {
    let word = normalize_word(word);
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT f.id, f.root FROM words w
                 JOIN word_families f ON f.id = w.family_id
                 WHERE w.text = ?1",
                params![word],
                |row| {
                    Ok(WordFamily {
                        id: row.get(0)?,
                        root: row.get(1)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Count surface words attached to a family.
pub async fn count_words(db: &Database, family_id: FamilyId) -> Result<u64, LexisError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM words WHERE family_id = ?1",
                params![family_id],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}
