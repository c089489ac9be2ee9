use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use herspace_types::api::UserStats;

use super::uuid_col;
use crate::Database;
use crate::models::UserRow;

impl Database {
    pub fn create_user(
        &self,
        id: Uuid,
        username: &str,
        email: &str,
        password_hash: &str,
        created_at: DateTime<Utc>,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, email, password, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id.to_string(), username, email, password_hash, created_at],
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username", username))
    }

    pub fn get_user_by_id(&self, id: Uuid) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", &id.to_string()))
    }

    /// Case-insensitive check; empty emails are never considered taken.
    pub fn email_taken(&self, email: &str) -> Result<bool> {
        if email.is_empty() {
            return Ok(false);
        }
        self.with_conn(|conn| {
            let taken = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE lower(email) = lower(?1))",
                [email],
                |row| row.get(0),
            )?;
            Ok(taken)
        })
    }

    pub fn user_stats(&self, user_id: Uuid) -> Result<UserStats> {
        self.with_conn(|conn| {
            let uid = user_id.to_string();
            let count = |sql: &str| -> Result<u32> {
                Ok(conn.query_row(sql, [&uid], |row| row.get(0))?)
            };

            Ok(UserStats {
                journal_entries: count("SELECT COUNT(*) FROM journal_entries WHERE user_id = ?1")?,
                mood_checkins: count("SELECT COUNT(*) FROM mood_checkins WHERE user_id = ?1")?,
                daily_tasks: count("SELECT COUNT(*) FROM daily_tasks WHERE user_id = ?1")?,
                completed_tasks: count(
                    "SELECT COUNT(*) FROM daily_tasks WHERE user_id = ?1 AND completed = 1",
                )?,
                tarot_readings: count("SELECT COUNT(*) FROM tarot_readings WHERE user_id = ?1")?,
                ai_conversations: count("SELECT COUNT(*) FROM ai_conversations WHERE user_id = ?1")?,
                motherhood_journal_entries: count(
                    "SELECT COUNT(*) FROM motherhood_journal WHERE user_id = ?1",
                )?,
                rituals_tracked: count("SELECT COUNT(*) FROM ritual_usages WHERE user_id = ?1")?,
            })
        })
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    // `column` is always one of our literals, never user input
    let sql = format!(
        "SELECT id, username, email, password, created_at FROM users WHERE {} = ?1",
        column
    );
    let row = conn.query_row(&sql, [value], user_from_row).optional()?;
    Ok(row)
}

fn user_from_row(row: &Row) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: uuid_col(row, 0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        created_at: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::super::testutil::db_with_user;

    #[test]
    fn lookup_by_username_and_id() {
        let (db, id) = db_with_user("luna");
        let by_name = db.get_user_by_username("luna").unwrap().unwrap();
        assert_eq!(by_name.id, id);
        assert!(db.get_user_by_id(id).unwrap().is_some());
        assert!(db.get_user_by_username("sol").unwrap().is_none());
    }

    #[test]
    fn duplicate_username_is_rejected_by_schema() {
        let (db, _) = db_with_user("luna");
        let again = db.create_user(uuid::Uuid::new_v4(), "luna", "", "x", chrono::Utc::now());
        assert!(again.is_err());
    }

    #[test]
    fn fresh_user_has_zero_stats() {
        let (db, id) = db_with_user("luna");
        let stats = db.user_stats(id).unwrap();
        assert_eq!(stats.journal_entries, 0);
        assert_eq!(stats.rituals_tracked, 0);
    }
}
