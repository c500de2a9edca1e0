// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dictionary entries, stored as one JSON document per surface word.

use lexis_core::{DictionaryEntry, LexisError, normalize_word};
use rusqlite::types::Type;
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};

/// Insert or replace the entry for `entry.word`.
pub async fn upsert_dictionary_entry(
    db: &Database,
    entry: &DictionaryEntry,
) -> Result<(), LexisError> {
    let word = normalize_word(&entry.word);
    let document = serde_json::to_string(entry)
        .map_err(|e| LexisError::Internal(format!("dictionary entry serialization: {e}")))?;
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO dictionary_entries (word, document) VALUES (?1, ?2)
                 ON CONFLICT(word) DO UPDATE SET
                    document = excluded.document,
                    updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![word, document],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Load the entry for a surface word.
pub async fn dictionary_entry(
    db: &Database,
    word: &str,
) -> Result<Option<DictionaryEntry>, LexisError> {
    let word = normalize_word(word);
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT document FROM dictionary_entries WHERE word = ?1",
                params![word],
                |row| {
                    let document: String = row.get(0)?;
                    serde_json::from_str(&document).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e))
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}
