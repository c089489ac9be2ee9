use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use herspace_types::api::{NotificationQuery, NotificationStats};
use herspace_types::models::{Notification, NotificationPreference, NotificationTemplate};

use super::{enum_col, json_col, uuid_col};
use crate::Database;

const NOTIFICATION_COLUMNS: &str = "id, notification_type, title, message, priority, is_read, \
     is_sent, created_at, scheduled_for";
const PREFERENCE_COLUMNS: &str = "id, mood_reminder_enabled, mood_reminder_time, mood_reminder_days, \
     task_reminder_enabled, task_reminder_time, journal_reminder_enabled, journal_reminder_time, \
     community_notifications_enabled, comment_notifications_enabled, reaction_notifications_enabled, \
     insight_notifications_enabled, weekly_insight_enabled, email_notifications_enabled, \
     push_notifications_enabled, quiet_hours_start, quiet_hours_end, created_at, updated_at";
const TEMPLATE_COLUMNS: &str = "id, template_type, title_template, message_template, is_active, created_at";

impl Database {
    // -- Notifications --

    pub fn insert_notification(&self, user_id: Uuid, notification: &Notification) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO notifications
                    (id, user_id, notification_type, title, message, priority, is_read, is_sent,
                     created_at, scheduled_for)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                rusqlite::params![
                    notification.id.to_string(),
                    user_id.to_string(),
                    notification.notification_type.as_ref(),
                    notification.title,
                    notification.message,
                    notification.priority.as_ref(),
                    notification.is_read,
                    notification.is_sent,
                    notification.created_at,
                    notification.scheduled_for,
                ],
            )?;
            Ok(())
        })
    }

    pub fn list_notifications(&self, user_id: Uuid, query: &NotificationQuery) -> Result<Vec<Notification>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {NOTIFICATION_COLUMNS} FROM notifications
                 WHERE user_id = ?1
                   AND (?2 IS NULL OR notification_type = ?2)
                   AND (?3 IS NULL OR is_read = ?3)
                   AND (?4 IS NULL OR priority = ?4)
                 ORDER BY created_at DESC, rowid DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(
                    rusqlite::params![
                        user_id.to_string(),
                        query.notification_type.as_ref().map(AsRef::<str>::as_ref),
                        query.is_read,
                        query.priority.as_ref().map(AsRef::<str>::as_ref),
                    ],
                    notification_from_row,
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_notification(&self, user_id: Uuid, id: Uuid) -> Result<Option<Notification>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = ?1 AND user_id = ?2");
            let row = conn
                .query_row(&sql, [id.to_string(), user_id.to_string()], notification_from_row)
                .optional()?;
            Ok(row)
        })
    }

    /// Marks the caller's notifications among `ids` as read. Ids that are
    /// unknown or owned by someone else are skipped. Returns how many rows
    /// changed.
    pub fn mark_notifications_read(&self, user_id: Uuid, ids: &[Uuid]) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let mut updated = 0;
            {
                let mut stmt = tx.prepare(
                    "UPDATE notifications SET is_read = 1 WHERE id = ?1 AND user_id = ?2 AND is_read = 0",
                )?;
                for id in ids {
                    updated += stmt.execute([id.to_string(), user_id.to_string()])?;
                }
            }
            tx.commit()?;
            Ok(updated)
        })
    }

    /// Counts for the caller. "Today" starts at `day_start`.
    pub fn notification_stats(&self, user_id: Uuid, day_start: DateTime<Utc>) -> Result<NotificationStats> {
        self.with_conn(|conn| {
            let uid = user_id.to_string();
            let count = |filter: &str| -> Result<u32> {
                let sql = format!("SELECT COUNT(*) FROM notifications WHERE user_id = ?1 {filter}");
                Ok(conn.query_row(&sql, [&uid], |row| row.get(0))?)
            };
            let total = count("")?;
            let unread = count("AND is_read = 0")?;
            let today: u32 = conn.query_row(
                "SELECT COUNT(*) FROM notifications WHERE user_id = ?1 AND created_at >= ?2",
                rusqlite::params![uid, day_start],
                |row| row.get(0),
            )?;

            Ok(NotificationStats {
                total_notifications: total,
                unread_count: unread,
                read_count: total - unread,
                high_priority_count: count("AND priority = 'high'")?,
                today_notifications: today,
            })
        })
    }

    // -- Preferences --

    /// The caller's preferences, created with defaults on first access.
    pub fn get_or_create_preferences(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<NotificationPreference> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let prefs = match query_preferences(&tx, user_id)? {
                Some(prefs) => prefs,
                None => {
                    let prefs = NotificationPreference::defaults(Uuid::new_v4(), now);
                    write_preferences(&tx, user_id, &prefs)?;
                    prefs
                }
            };
            tx.commit()?;
            Ok(prefs)
        })
    }

    pub fn update_preferences(&self, user_id: Uuid, prefs: &NotificationPreference) -> Result<()> {
        self.with_conn(|conn| write_preferences(conn, user_id, prefs))
    }

    // -- Templates --

    pub fn insert_template(&self, template: &NotificationTemplate) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO notification_templates
                    (id, template_type, title_template, message_template, is_active, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    template.id.to_string(),
                    template.template_type.as_ref(),
                    template.title_template,
                    template.message_template,
                    template.is_active,
                    template.created_at,
                ],
            )?;
            Ok(inserted > 0)
        })
    }

    pub fn list_templates(&self) -> Result<Vec<NotificationTemplate>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {TEMPLATE_COLUMNS} FROM notification_templates WHERE is_active = 1 ORDER BY template_type"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], template_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn query_preferences(conn: &Connection, user_id: Uuid) -> Result<Option<NotificationPreference>> {
    let sql = format!("SELECT {PREFERENCE_COLUMNS} FROM notification_preferences WHERE user_id = ?1");
    let row = conn
        .query_row(&sql, [user_id.to_string()], preference_from_row)
        .optional()?;
    Ok(row)
}

/// Insert-or-replace keyed on `user_id`.
fn write_preferences(conn: &Connection, user_id: Uuid, p: &NotificationPreference) -> Result<()> {
    conn.execute(
        "INSERT INTO notification_preferences
            (id, user_id, mood_reminder_enabled, mood_reminder_time, mood_reminder_days,
             task_reminder_enabled, task_reminder_time, journal_reminder_enabled, journal_reminder_time,
             community_notifications_enabled, comment_notifications_enabled,
             reaction_notifications_enabled, insight_notifications_enabled, weekly_insight_enabled,
             email_notifications_enabled, push_notifications_enabled, quiet_hours_start,
             quiet_hours_end, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)
         ON CONFLICT(user_id) DO UPDATE SET
            mood_reminder_enabled = excluded.mood_reminder_enabled,
            mood_reminder_time = excluded.mood_reminder_time,
            mood_reminder_days = excluded.mood_reminder_days,
            task_reminder_enabled = excluded.task_reminder_enabled,
            task_reminder_time = excluded.task_reminder_time,
            journal_reminder_enabled = excluded.journal_reminder_enabled,
            journal_reminder_time = excluded.journal_reminder_time,
            community_notifications_enabled = excluded.community_notifications_enabled,
            comment_notifications_enabled = excluded.comment_notifications_enabled,
            reaction_notifications_enabled = excluded.reaction_notifications_enabled,
            insight_notifications_enabled = excluded.insight_notifications_enabled,
            weekly_insight_enabled = excluded.weekly_insight_enabled,
            email_notifications_enabled = excluded.email_notifications_enabled,
            push_notifications_enabled = excluded.push_notifications_enabled,
            quiet_hours_start = excluded.quiet_hours_start,
            quiet_hours_end = excluded.quiet_hours_end,
            updated_at = excluded.updated_at",
        rusqlite::params![
            p.id.to_string(),
            user_id.to_string(),
            p.mood_reminder_enabled,
            p.mood_reminder_time,
            serde_json::to_string(&p.mood_reminder_days)?,
            p.task_reminder_enabled,
            p.task_reminder_time,
            p.journal_reminder_enabled,
            p.journal_reminder_time,
            p.community_notifications_enabled,
            p.comment_notifications_enabled,
            p.reaction_notifications_enabled,
            p.insight_notifications_enabled,
            p.weekly_insight_enabled,
            p.email_notifications_enabled,
            p.push_notifications_enabled,
            p.quiet_hours_start,
            p.quiet_hours_end,
            p.created_at,
            p.updated_at,
        ],
    )?;
    Ok(())
}

fn notification_from_row(row: &Row) -> rusqlite::Result<Notification> {
    Ok(Notification {
        id: uuid_col(row, 0)?,
        notification_type: enum_col(row, 1)?,
        title: row.get(2)?,
        message: row.get(3)?,
        priority: enum_col(row, 4)?,
        is_read: row.get(5)?,
        is_sent: row.get(6)?,
        created_at: row.get(7)?,
        scheduled_for: row.get(8)?,
    })
}

fn preference_from_row(row: &Row) -> rusqlite::Result<NotificationPreference> {
    Ok(NotificationPreference {
        id: uuid_col(row, 0)?,
        mood_reminder_enabled: row.get(1)?,
        mood_reminder_time: row.get(2)?,
        mood_reminder_days: json_col(row, 3)?,
        task_reminder_enabled: row.get(4)?,
        task_reminder_time: row.get(5)?,
        journal_reminder_enabled: row.get(6)?,
        journal_reminder_time: row.get(7)?,
        community_notifications_enabled: row.get(8)?,
        comment_notifications_enabled: row.get(9)?,
        reaction_notifications_enabled: row.get(10)?,
        insight_notifications_enabled: row.get(11)?,
        weekly_insight_enabled: row.get(12)?,
        email_notifications_enabled: row.get(13)?,
        push_notifications_enabled: row.get(14)?,
        quiet_hours_start: row.get(15)?,
        quiet_hours_end: row.get(16)?,
        created_at: row.get(17)?,
        updated_at: row.get(18)?,
    })
}

fn template_from_row(row: &Row) -> rusqlite::Result<NotificationTemplate> {
    Ok(NotificationTemplate {
        id: uuid_col(row, 0)?,
        template_type: enum_col(row, 1)?,
        title_template: row.get(2)?,
        message_template: row.get(3)?,
        is_active: row.get(4)?,
        created_at: row.get(5)?,
    })
}
