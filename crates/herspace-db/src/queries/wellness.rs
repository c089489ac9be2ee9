use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, Row};
use uuid::Uuid;

use herspace_types::enums::{EnergyLevel, LifePhase, SupportStyle};
use herspace_types::models::{
    MindfulnessActivity, MindfulnessSession, RitualUsage, UserProfile, WisdomMessage,
};

use super::{enum_col, json_col, opt_enum_col, uuid_col};
use crate::Database;

const PROFILE_COLUMNS: &str =
    "current_mood_context, preferred_support_style, life_roles, created_at, updated_at";
const WISDOM_COLUMNS: &str = "id, title, message, affirmation, for_mood_context, for_support_style, \
     for_energy_level, tags, is_active, created_at";
const USAGE_COLUMNS: &str = "u.id, u.ritual_id, r.title, u.used_at, u.was_helpful, \
     u.effectiveness_rating, u.mood_before, u.mood_after, u.notes";
const ACTIVITY_COLUMNS: &str = "id, title, title_ka, description, description_ka, short_description, \
     short_description_ka, icon, duration_minutes, audio_url, category, difficulty, is_active, \
     created_at, updated_at";
const SESSION_COLUMNS: &str = "s.id, s.activity_id, a.title, s.started_at, s.duration_minutes, \
     s.mood_before, s.mood_after, s.notes, s.created_at";

impl Database {
    // -- Profiles --

    pub fn get_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE user_id = ?1");
            let row = conn.query_row(&sql, [user_id.to_string()], profile_from_row).optional()?;
            Ok(row)
        })
    }

    /// Insert or overwrite the caller's profile. `created_at` is kept from
    /// the first write.
    pub fn upsert_profile(&self, user_id: Uuid, profile: &UserProfile) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO user_profiles
                    (user_id, current_mood_context, preferred_support_style, life_roles, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(user_id) DO UPDATE SET
                    current_mood_context = excluded.current_mood_context,
                    preferred_support_style = excluded.preferred_support_style,
                    life_roles = excluded.life_roles,
                    updated_at = excluded.updated_at",
                rusqlite::params![
                    user_id.to_string(),
                    profile.current_mood_context.as_ref().map(AsRef::<str>::as_ref),
                    profile.preferred_support_style.as_ref().map(AsRef::<str>::as_ref),
                    serde_json::to_string(&profile.life_roles)?,
                    profile.created_at,
                    profile.updated_at,
                ],
            )?;
            Ok(())
        })
    }

    // -- Wisdom --

    pub fn insert_wisdom(&self, wisdom: &WisdomMessage) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO wisdom_messages
                    (id, title, message, affirmation, for_mood_context, for_support_style,
                     for_energy_level, tags, is_active, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                rusqlite::params![
                    wisdom.id.to_string(),
                    wisdom.title,
                    wisdom.message,
                    wisdom.affirmation,
                    wisdom.for_mood_context.as_ref(),
                    wisdom.for_support_style.as_ref(),
                    wisdom.for_energy_level.as_ref(),
                    serde_json::to_string(&wisdom.tags)?,
                    wisdom.is_active,
                    wisdom.created_at,
                ],
            )?;
            Ok(inserted > 0)
        })
    }

    /// A random active message whose targets each match the request or `any`.
    pub fn random_wisdom(
        &self,
        mood_context: LifePhase,
        support_style: SupportStyle,
        energy_level: EnergyLevel,
    ) -> Result<Option<WisdomMessage>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {WISDOM_COLUMNS} FROM wisdom_messages
                 WHERE is_active = 1
                   AND for_mood_context IN (?1, 'any')
                   AND for_support_style IN (?2, 'any')
                   AND for_energy_level IN (?3, 'any')
                 ORDER BY RANDOM() LIMIT 1"
            );
            let row = conn
                .query_row(
                    &sql,
                    [mood_context.as_ref(), support_style.as_ref(), energy_level.as_ref()],
                    wisdom_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn record_wisdom_delivery(&self, user_id: Uuid, wisdom_id: Uuid, at: DateTime<Utc>) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO wisdom_deliveries (id, user_id, wisdom_id, delivered_at) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![Uuid::new_v4().to_string(), user_id.to_string(), wisdom_id.to_string(), at],
            )?;
            Ok(())
        })
    }

    // -- Ritual usage --

    pub fn insert_ritual_usage(&self, user_id: Uuid, usage: &RitualUsage) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO ritual_usages
                    (id, user_id, ritual_id, used_at, was_helpful, effectiveness_rating,
                     mood_before, mood_after, notes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                rusqlite::params![
                    usage.id.to_string(),
                    user_id.to_string(),
                    usage.ritual.to_string(),
                    usage.used_at,
                    usage.was_helpful,
                    usage.effectiveness_rating,
                    usage.mood_before,
                    usage.mood_after,
                    usage.notes,
                ],
            )?;
            Ok(())
        })
    }

    /// The caller's ritual usage, most recent first.
    pub fn list_ritual_usages(&self, user_id: Uuid) -> Result<Vec<RitualUsage>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {USAGE_COLUMNS} FROM ritual_usages u JOIN rituals r ON r.id = u.ritual_id
                 WHERE u.user_id = ?1
                 ORDER BY u.used_at DESC, u.rowid DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id.to_string()], usage_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Mindfulness --

    pub fn insert_activity(&self, activity: &MindfulnessActivity) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO mindfulness_activities
                    (id, title, title_ka, description, description_ka, short_description,
                     short_description_ka, icon, duration_minutes, audio_url, category, difficulty,
                     is_active, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                rusqlite::params![
                    activity.id.to_string(),
                    activity.title,
                    activity.title_ka,
                    activity.description,
                    activity.description_ka,
                    activity.short_description,
                    activity.short_description_ka,
                    activity.icon,
                    activity.duration_minutes,
                    activity.audio_url,
                    activity.category.as_ref(),
                    activity.difficulty.as_ref(),
                    activity.is_active,
                    activity.created_at,
                    activity.updated_at,
                ],
            )?;
            Ok(inserted > 0)
        })
    }

    pub fn list_activities(&self) -> Result<Vec<MindfulnessActivity>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {ACTIVITY_COLUMNS} FROM mindfulness_activities WHERE is_active = 1
                 ORDER BY created_at, rowid"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], activity_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_activity(&self, id: Uuid) -> Result<Option<MindfulnessActivity>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {ACTIVITY_COLUMNS} FROM mindfulness_activities WHERE id = ?1 AND is_active = 1");
            let row = conn.query_row(&sql, [id.to_string()], activity_from_row).optional()?;
            Ok(row)
        })
    }

    pub fn insert_session(&self, user_id: Uuid, session: &MindfulnessSession) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO mindfulness_sessions
                    (id, user_id, activity_id, started_at, duration_minutes, mood_before,
                     mood_after, notes, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                rusqlite::params![
                    session.id.to_string(),
                    user_id.to_string(),
                    session.activity.to_string(),
                    session.started_at,
                    session.duration_minutes,
                    session.mood_before,
                    session.mood_after,
                    session.notes,
                    session.created_at,
                ],
            )?;
            Ok(())
        })
    }

    pub fn list_sessions(&self, user_id: Uuid) -> Result<Vec<MindfulnessSession>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {SESSION_COLUMNS} FROM mindfulness_sessions s
                 JOIN mindfulness_activities a ON a.id = s.activity_id
                 WHERE s.user_id = ?1
                 ORDER BY s.started_at DESC, s.rowid DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id.to_string()], session_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn profile_from_row(row: &Row) -> rusqlite::Result<UserProfile> {
    Ok(UserProfile {
        current_mood_context: opt_enum_col(row, 0)?,
        preferred_support_style: opt_enum_col(row, 1)?,
        life_roles: json_col(row, 2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn wisdom_from_row(row: &Row) -> rusqlite::Result<WisdomMessage> {
    Ok(WisdomMessage {
        id: uuid_col(row, 0)?,
        title: row.get(1)?,
        message: row.get(2)?,
        affirmation: row.get(3)?,
        for_mood_context: enum_col(row, 4)?,
        for_support_style: enum_col(row, 5)?,
        for_energy_level: enum_col(row, 6)?,
        tags: json_col(row, 7)?,
        is_active: row.get(8)?,
        created_at: row.get(9)?,
    })
}

fn usage_from_row(row: &Row) -> rusqlite::Result<RitualUsage> {
    Ok(RitualUsage {
        id: uuid_col(row, 0)?,
        ritual: uuid_col(row, 1)?,
        ritual_title: row.get(2)?,
        used_at: row.get(3)?,
        was_helpful: row.get(4)?,
        effectiveness_rating: row.get(5)?,
        mood_before: row.get(6)?,
        mood_after: row.get(7)?,
        notes: row.get(8)?,
    })
}

fn activity_from_row(row: &Row) -> rusqlite::Result<MindfulnessActivity> {
    Ok(MindfulnessActivity {
        id: uuid_col(row, 0)?,
        title: row.get(1)?,
        title_ka: row.get(2)?,
        description: row.get(3)?,
        description_ka: row.get(4)?,
        short_description: row.get(5)?,
        short_description_ka: row.get(6)?,
        icon: row.get(7)?,
        duration_minutes: row.get(8)?,
        audio_url: row.get(9)?,
        category: enum_col(row, 10)?,
        difficulty: enum_col(row, 11)?,
        is_active: row.get(12)?,
        created_at: row.get(13)?,
        updated_at: row.get(14)?,
    })
}

fn session_from_row(row: &Row) -> rusqlite::Result<MindfulnessSession> {
    Ok(MindfulnessSession {
        id: uuid_col(row, 0)?,
        activity: uuid_col(row, 1)?,
        activity_title: row.get(2)?,
        started_at: row.get(3)?,
        duration_minutes: row.get(4)?,
        mood_before: row.get(5)?,
        mood_after: row.get(6)?,
        notes: row.get(7)?,
        created_at: row.get(8)?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use herspace_types::enums::{
        Difficulty, EmotionalTone, EnergyLevel, Language, LifePhase, MindfulnessCategory,
        RitualType, SupportStyle,
    };
    use herspace_types::models::{
        MindfulnessActivity, MindfulnessSession, Ritual, RitualUsage, UserProfile, WisdomMessage,
    };

    use super::super::testutil::db_with_user;
    use crate::Database;

    fn wisdom(title: &str, mood: LifePhase, energy: EnergyLevel) -> WisdomMessage {
        WisdomMessage {
            id: Uuid::new_v4(),
            title: title.into(),
            message: "You are enough.".into(),
            affirmation: String::new(),
            for_mood_context: mood,
            for_support_style: SupportStyle::Any,
            for_energy_level: energy,
            tags: Vec::new(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn ritual(db: &Database) -> Uuid {
        let ritual = Ritual {
            id: Uuid::new_v4(),
            title: "Morning breath".into(),
            description: String::new(),
            ritual_type: RitualType::Breathing,
            content: "Breathe in for four".into(),
            for_life_phase: LifePhase::Any,
            emotional_tone: EmotionalTone::Gentle,
            duration_minutes: 5,
            is_for_beginners: true,
            tags: Vec::new(),
            is_active: true,
            language: Language::En,
            created_at: Utc::now(),
        };
        db.insert_ritual(&ritual).unwrap();
        ritual.id
    }

    #[test]
    fn profile_upsert_keeps_created_at() {
        let (db, user) = db_with_user("keti");
        let created = Utc::now();
        let mut profile = UserProfile {
            current_mood_context: Some(LifePhase::Healing),
            preferred_support_style: None,
            life_roles: vec!["mother".into()],
            created_at: created,
            updated_at: created,
        };
        db.upsert_profile(user, &profile).unwrap();

        profile.preferred_support_style = Some(SupportStyle::Practical);
        profile.created_at = Utc::now();
        profile.updated_at = profile.created_at;
        db.upsert_profile(user, &profile).unwrap();

        let stored = db.get_profile(user).unwrap().unwrap();
        assert_eq!(stored.created_at, created);
        assert_eq!(stored.preferred_support_style, Some(SupportStyle::Practical));
        assert_eq!(stored.life_roles, vec!["mother".to_string()]);
    }

    #[test]
    fn wisdom_matches_exact_or_any() {
        let db = Database::open_in_memory().unwrap();
        db.insert_wisdom(&wisdom("For healing", LifePhase::Healing, EnergyLevel::Low)).unwrap();

        let hit = db
            .random_wisdom(LifePhase::Healing, SupportStyle::Gentle, EnergyLevel::Low)
            .unwrap();
        assert_eq!(hit.unwrap().title, "For healing");

        let miss = db
            .random_wisdom(LifePhase::Growth, SupportStyle::Gentle, EnergyLevel::Low)
            .unwrap();
        assert!(miss.is_none());

        db.insert_wisdom(&wisdom("For everyone", LifePhase::Any, EnergyLevel::Any)).unwrap();
        let fallback = db
            .random_wisdom(LifePhase::Growth, SupportStyle::Any, EnergyLevel::High)
            .unwrap();
        assert_eq!(fallback.unwrap().title, "For everyone");
    }

    #[test]
    fn usage_history_carries_ritual_title() {
        let (db, user) = db_with_user("keti");
        let ritual_id = ritual(&db);
        db.insert_ritual_usage(
            user,
            &RitualUsage {
                id: Uuid::new_v4(),
                ritual: ritual_id,
                ritual_title: String::new(),
                used_at: Utc::now(),
                was_helpful: Some(true),
                effectiveness_rating: Some(5),
                mood_before: Some("tense".into()),
                mood_after: Some("calm".into()),
                notes: None,
            },
        )
        .unwrap();

        let history = db.list_ritual_usages(user).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].ritual_title, "Morning breath");
        assert_eq!(history[0].effectiveness_rating, Some(5));
    }

    #[test]
    fn rating_outside_range_is_rejected() {
        let (db, user) = db_with_user("keti");
        let ritual_id = ritual(&db);
        let usage = RitualUsage {
            id: Uuid::new_v4(),
            ritual: ritual_id,
            ritual_title: String::new(),
            used_at: Utc::now(),
            was_helpful: None,
            effectiveness_rating: Some(9),
            mood_before: None,
            mood_after: None,
            notes: None,
        };
        assert!(db.insert_ritual_usage(user, &usage).is_err());
    }

    #[test]
    fn sessions_join_activity_title() {
        let (db, user) = db_with_user("keti");
        let now = Utc::now();
        let activity = MindfulnessActivity {
            id: Uuid::new_v4(),
            title: "Box breathing".into(),
            title_ka: String::new(),
            description: "Four counts each side".into(),
            description_ka: String::new(),
            short_description: String::new(),
            short_description_ka: String::new(),
            icon: String::new(),
            duration_minutes: 4,
            audio_url: None,
            category: MindfulnessCategory::Breathing,
            difficulty: Difficulty::Beginner,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        assert!(db.insert_activity(&activity).unwrap());
        assert!(!db.insert_activity(&activity).unwrap());

        db.insert_session(
            user,
            &MindfulnessSession {
                id: Uuid::new_v4(),
                activity: activity.id,
                activity_title: String::new(),
                started_at: now,
                duration_minutes: Some(4),
                mood_before: None,
                mood_after: None,
                notes: None,
                created_at: now,
            },
        )
        .unwrap();

        let sessions = db.list_sessions(user).unwrap();
        assert_eq!(sessions[0].activity_title, "Box breathing");
    }
}
