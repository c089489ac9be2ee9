use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{OptionalExtension, Row};
use uuid::Uuid;

use herspace_types::enums::{Language, RitualType};
use herspace_types::models::{DailyTask, JournalEntry, MoodCheckIn, Ritual};

use super::{enum_col, json_col, uuid_col};
use crate::Database;

const ENTRY_COLUMNS: &str = "id, title, content, created_at";
const MOOD_COLUMNS: &str = "id, date, mood, notes";
const TASK_COLUMNS: &str = "id, date, body_task, work_task, soul_task, completed";
const RITUAL_COLUMNS: &str = "id, title, description, ritual_type, content, for_life_phase, \
     emotional_tone, duration_minutes, is_for_beginners, tags, is_active, language, created_at";

impl Database {
    // -- Journal entries --

    pub fn insert_journal_entry(&self, user_id: Uuid, entry: &JournalEntry) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO journal_entries (id, user_id, title, content, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    entry.id.to_string(),
                    user_id.to_string(),
                    entry.title,
                    entry.content,
                    entry.created_at,
                ],
            )?;
            Ok(())
        })
    }

    pub fn list_journal_entries(&self, user_id: Uuid) -> Result<Vec<JournalEntry>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {ENTRY_COLUMNS} FROM journal_entries WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id.to_string()], entry_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_journal_entry(&self, user_id: Uuid, id: Uuid) -> Result<Option<JournalEntry>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {ENTRY_COLUMNS} FROM journal_entries WHERE id = ?1 AND user_id = ?2");
            let row = conn
                .query_row(&sql, [id.to_string(), user_id.to_string()], entry_from_row)
                .optional()?;
            Ok(row)
        })
    }

    pub fn update_journal_entry(&self, user_id: Uuid, entry: &JournalEntry) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE journal_entries SET title = ?1, content = ?2 WHERE id = ?3 AND user_id = ?4",
                rusqlite::params![entry.title, entry.content, entry.id.to_string(), user_id.to_string()],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn delete_journal_entry(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        self.delete_owned("journal_entries", user_id, id)
    }

    // -- Mood check-ins --

    /// Inserts the check-in unless the user already has one for that date.
    /// Returns `false` (and writes nothing) when the day is taken.
    pub fn insert_mood_checkin(&self, user_id: Uuid, checkin: &MoodCheckIn) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO mood_checkins (id, user_id, date, mood, notes) VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(user_id, date) DO NOTHING",
                rusqlite::params![
                    checkin.id.to_string(),
                    user_id.to_string(),
                    checkin.date,
                    checkin.mood.as_ref(),
                    checkin.notes,
                ],
            )?;
            Ok(inserted > 0)
        })
    }

    pub fn list_mood_checkins(&self, user_id: Uuid) -> Result<Vec<MoodCheckIn>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {MOOD_COLUMNS} FROM mood_checkins WHERE user_id = ?1 ORDER BY date DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id.to_string()], mood_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_mood_checkin(&self, user_id: Uuid, id: Uuid) -> Result<Option<MoodCheckIn>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {MOOD_COLUMNS} FROM mood_checkins WHERE id = ?1 AND user_id = ?2");
            let row = conn
                .query_row(&sql, [id.to_string(), user_id.to_string()], mood_from_row)
                .optional()?;
            Ok(row)
        })
    }

    pub fn update_mood_checkin(&self, user_id: Uuid, checkin: &MoodCheckIn) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE mood_checkins SET mood = ?1, notes = ?2 WHERE id = ?3 AND user_id = ?4",
                rusqlite::params![
                    checkin.mood.as_ref(),
                    checkin.notes,
                    checkin.id.to_string(),
                    user_id.to_string(),
                ],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn delete_mood_checkin(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        self.delete_owned("mood_checkins", user_id, id)
    }

    // -- Daily tasks --

    /// Same contract as [`Database::insert_mood_checkin`], but the one-per-day
    /// rule is checked here rather than by a table constraint. Holding the
    /// connection lock across check and insert keeps the two atomic.
    pub fn insert_daily_task(&self, user_id: Uuid, task: &DailyTask) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM daily_tasks WHERE user_id = ?1 AND date = ?2)",
                rusqlite::params![user_id.to_string(), task.date],
                |row| row.get(0),
            )?;
            if exists {
                return Ok(false);
            }

            tx.execute(
                "INSERT INTO daily_tasks (id, user_id, date, body_task, work_task, soul_task, completed)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    task.id.to_string(),
                    user_id.to_string(),
                    task.date,
                    task.body_task,
                    task.work_task,
                    task.soul_task,
                    task.completed,
                ],
            )?;
            tx.commit()?;
            Ok(true)
        })
    }

    pub fn list_daily_tasks(&self, user_id: Uuid) -> Result<Vec<DailyTask>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {TASK_COLUMNS} FROM daily_tasks WHERE user_id = ?1 ORDER BY date DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id.to_string()], task_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_daily_task(&self, user_id: Uuid, id: Uuid) -> Result<Option<DailyTask>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {TASK_COLUMNS} FROM daily_tasks WHERE id = ?1 AND user_id = ?2");
            let row = conn
                .query_row(&sql, [id.to_string(), user_id.to_string()], task_from_row)
                .optional()?;
            Ok(row)
        })
    }

    pub fn update_daily_task(&self, user_id: Uuid, task: &DailyTask) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE daily_tasks SET body_task = ?1, work_task = ?2, soul_task = ?3, completed = ?4
                 WHERE id = ?5 AND user_id = ?6",
                rusqlite::params![
                    task.body_task,
                    task.work_task,
                    task.soul_task,
                    task.completed,
                    task.id.to_string(),
                    user_id.to_string(),
                ],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn delete_daily_task(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        self.delete_owned("daily_tasks", user_id, id)
    }

    /// Tasks dated on or after `since`, oldest first.
    pub fn daily_tasks_since(&self, user_id: Uuid, since: NaiveDate) -> Result<Vec<DailyTask>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {TASK_COLUMNS} FROM daily_tasks WHERE user_id = ?1 AND date >= ?2 ORDER BY date"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params![user_id.to_string(), since], task_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Check-ins dated on or after `since`, oldest first.
    pub fn mood_checkins_since(&self, user_id: Uuid, since: NaiveDate) -> Result<Vec<MoodCheckIn>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {MOOD_COLUMNS} FROM mood_checkins WHERE user_id = ?1 AND date >= ?2 ORDER BY date"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params![user_id.to_string(), since], mood_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Rituals --

    pub fn insert_ritual(&self, ritual: &Ritual) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO rituals (id, title, description, ritual_type, content, for_life_phase,
                    emotional_tone, duration_minutes, is_for_beginners, tags, is_active, language, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                rusqlite::params![
                    ritual.id.to_string(),
                    ritual.title,
                    ritual.description,
                    ritual.ritual_type.as_ref(),
                    ritual.content,
                    ritual.for_life_phase.as_ref(),
                    ritual.emotional_tone.as_ref(),
                    ritual.duration_minutes,
                    ritual.is_for_beginners,
                    serde_json::to_string(&ritual.tags)?,
                    ritual.is_active,
                    ritual.language.as_ref(),
                    ritual.created_at,
                ],
            )?;
            Ok(())
        })
    }

    /// Active rituals, optionally narrowed by language and type.
    pub fn list_rituals(
        &self,
        language: Option<Language>,
        ritual_type: Option<RitualType>,
    ) -> Result<Vec<Ritual>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {RITUAL_COLUMNS} FROM rituals
                 WHERE is_active = 1
                   AND (?1 IS NULL OR language = ?1)
                   AND (?2 IS NULL OR ritual_type = ?2)
                 ORDER BY created_at, rowid"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(
                    rusqlite::params![
                        language.as_ref().map(AsRef::<str>::as_ref),
                        ritual_type.as_ref().map(AsRef::<str>::as_ref),
                    ],
                    ritual_from_row,
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_ritual(&self, id: Uuid) -> Result<Option<Ritual>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {RITUAL_COLUMNS} FROM rituals WHERE id = ?1");
            let row = conn.query_row(&sql, [id.to_string()], ritual_from_row).optional()?;
            Ok(row)
        })
    }

    pub fn update_ritual(&self, ritual: &Ritual) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE rituals SET title = ?1, description = ?2, ritual_type = ?3, content = ?4,
                    for_life_phase = ?5, emotional_tone = ?6, duration_minutes = ?7,
                    is_for_beginners = ?8, tags = ?9, is_active = ?10, language = ?11
                 WHERE id = ?12",
                rusqlite::params![
                    ritual.title,
                    ritual.description,
                    ritual.ritual_type.as_ref(),
                    ritual.content,
                    ritual.for_life_phase.as_ref(),
                    ritual.emotional_tone.as_ref(),
                    ritual.duration_minutes,
                    ritual.is_for_beginners,
                    serde_json::to_string(&ritual.tags)?,
                    ritual.is_active,
                    ritual.language.as_ref(),
                    ritual.id.to_string(),
                ],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn delete_ritual(&self, id: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM rituals WHERE id = ?1", [id.to_string()])?;
            Ok(changed > 0)
        })
    }

    /// Deletes `id` from `table` if it belongs to `user_id`.
    pub(crate) fn delete_owned(&self, table: &str, user_id: Uuid, id: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            // `table` is always one of our literals, never user input
            let sql = format!("DELETE FROM {} WHERE id = ?1 AND user_id = ?2", table);
            let changed = conn.execute(&sql, [id.to_string(), user_id.to_string()])?;
            Ok(changed > 0)
        })
    }
}

pub(crate) fn entry_from_row(row: &Row) -> rusqlite::Result<JournalEntry> {
    Ok(JournalEntry {
        id: uuid_col(row, 0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn mood_from_row(row: &Row) -> rusqlite::Result<MoodCheckIn> {
    Ok(MoodCheckIn {
        id: uuid_col(row, 0)?,
        date: row.get(1)?,
        mood: enum_col(row, 2)?,
        notes: row.get(3)?,
    })
}

fn task_from_row(row: &Row) -> rusqlite::Result<DailyTask> {
    Ok(DailyTask {
        id: uuid_col(row, 0)?,
        date: row.get(1)?,
        body_task: row.get(2)?,
        work_task: row.get(3)?,
        soul_task: row.get(4)?,
        completed: row.get(5)?,
    })
}

pub(crate) fn ritual_from_row(row: &Row) -> rusqlite::Result<Ritual> {
    Ok(Ritual {
        id: uuid_col(row, 0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        ritual_type: enum_col(row, 3)?,
        content: row.get(4)?,
        for_life_phase: enum_col(row, 5)?,
        emotional_tone: enum_col(row, 6)?,
        duration_minutes: row.get(7)?,
        is_for_beginners: row.get(8)?,
        tags: json_col(row, 9)?,
        is_active: row.get(10)?,
        language: enum_col(row, 11)?,
        created_at: row.get(12)?,
    })
}
