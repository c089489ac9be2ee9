use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::Row;
use uuid::Uuid;

use herspace_types::models::{JournalEntry, UserInsight};

use super::journal::entry_from_row;
use super::{enum_col, json_col, uuid_col};
use crate::Database;

impl Database {
    /// The caller's journal entries written at or after `since`, oldest first.
    pub fn journal_entries_since(&self, user_id: Uuid, since: DateTime<Utc>) -> Result<Vec<JournalEntry>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, content, created_at FROM journal_entries
                 WHERE user_id = ?1 AND created_at >= ?2
                 ORDER BY created_at, rowid",
            )?;
            let rows = stmt
                .query_map(rusqlite::params![user_id.to_string(), since], entry_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// One insight per (user, type); a newer computation replaces the old one.
    pub fn upsert_insight(&self, user_id: Uuid, insight: &UserInsight) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO user_insights (id, user_id, insight_type, data, computed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(user_id, insight_type) DO UPDATE SET
                    data = excluded.data,
                    computed_at = excluded.computed_at",
                rusqlite::params![
                    insight.id.to_string(),
                    user_id.to_string(),
                    insight.insight_type.as_ref(),
                    insight.data.to_string(),
                    insight.computed_at,
                ],
            )?;
            Ok(())
        })
    }

    pub fn list_insights(&self, user_id: Uuid) -> Result<Vec<UserInsight>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, insight_type, data, computed_at FROM user_insights
                 WHERE user_id = ?1 ORDER BY computed_at DESC, rowid DESC",
            )?;
            let rows = stmt
                .query_map([user_id.to_string()], insight_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn insight_from_row(row: &Row) -> rusqlite::Result<UserInsight> {
    Ok(UserInsight {
        id: uuid_col(row, 0)?,
        insight_type: enum_col(row, 1)?,
        data: json_col(row, 2)?,
        computed_at: row.get(3)?,
    })
}
