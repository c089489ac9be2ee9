use anyhow::Result;
use rusqlite::{OptionalExtension, Row};
use uuid::Uuid;

use herspace_types::api::{ResourceQuery, RoutineQuery};
use herspace_types::enums::GroupType;
use herspace_types::models::{
    ChildcareRoutine, MotherhoodJournal, MotherhoodResource, RitualCompletion, SupportGroup,
};

use super::{enum_col, like_pattern, opt_enum_col, opt_uuid_col, uuid_col};
use crate::Database;

const ROUTINE_COLUMNS: &str = "id, title, routine_type, description, time_of_day, \
     duration_minutes, is_active, created_at, updated_at";
const COMPLETION_COLUMNS: &str = "id, routine_id, completed, completed_at, notes";
const RESOURCE_COLUMNS: &str = "id, title, resource_type, category, description, url, author, \
     is_featured, is_active, created_at";
const JOURNAL_COLUMNS: &str = "id, title, content, mood, is_private, created_at, updated_at";
const GROUP_COLUMNS: &str = "id, name, group_type, description, is_private, max_members, \
     current_members, is_active, created_at";

impl Database {
    // -- Routines --

    pub fn insert_routine(&self, user_id: Uuid, routine: &ChildcareRoutine) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO childcare_routines
                    (id, user_id, title, routine_type, description, time_of_day,
                     duration_minutes, is_active, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                rusqlite::params![
                    routine.id.to_string(),
                    user_id.to_string(),
                    routine.title,
                    routine.routine_type.as_ref(),
                    routine.description,
                    routine.time_of_day,
                    routine.duration_minutes,
                    routine.is_active,
                    routine.created_at,
                    routine.updated_at,
                ],
            )?;
            Ok(())
        })
    }

    pub fn list_routines(&self, user_id: Uuid, query: &RoutineQuery) -> Result<Vec<ChildcareRoutine>> {
        let search = query.search.as_deref().map(like_pattern);
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {ROUTINE_COLUMNS} FROM childcare_routines
                 WHERE user_id = ?1
                   AND (?2 IS NULL OR routine_type = ?2)
                   AND (?3 IS NULL OR is_active = ?3)
                   AND (?4 IS NULL OR title LIKE ?4 ESCAPE '\\' OR description LIKE ?4 ESCAPE '\\')
                 ORDER BY created_at DESC, rowid DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(
                    rusqlite::params![
                        user_id.to_string(),
                        query.routine_type.as_ref().map(AsRef::<str>::as_ref),
                        query.is_active,
                        search,
                    ],
                    routine_from_row,
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_routine(&self, user_id: Uuid, id: Uuid) -> Result<Option<ChildcareRoutine>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {ROUTINE_COLUMNS} FROM childcare_routines WHERE id = ?1 AND user_id = ?2");
            let row = conn
                .query_row(&sql, [id.to_string(), user_id.to_string()], routine_from_row)
                .optional()?;
            Ok(row)
        })
    }

    pub fn update_routine(&self, user_id: Uuid, routine: &ChildcareRoutine) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE childcare_routines SET title = ?1, routine_type = ?2, description = ?3,
                    time_of_day = ?4, duration_minutes = ?5, is_active = ?6, updated_at = ?7
                 WHERE id = ?8 AND user_id = ?9",
                rusqlite::params![
                    routine.title,
                    routine.routine_type.as_ref(),
                    routine.description,
                    routine.time_of_day,
                    routine.duration_minutes,
                    routine.is_active,
                    routine.updated_at,
                    routine.id.to_string(),
                    user_id.to_string(),
                ],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn delete_routine(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        self.delete_owned("childcare_routines", user_id, id)
    }

    // -- Completions --

    pub fn insert_completion(&self, user_id: Uuid, completion: &RitualCompletion) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO ritual_completions (id, user_id, routine_id, completed, completed_at, notes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    completion.id.to_string(),
                    user_id.to_string(),
                    completion.routine.map(|id| id.to_string()),
                    completion.completed,
                    completion.completed_at,
                    completion.notes,
                ],
            )?;
            Ok(())
        })
    }

    pub fn list_completions(&self, user_id: Uuid) -> Result<Vec<RitualCompletion>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {COMPLETION_COLUMNS} FROM ritual_completions WHERE user_id = ?1 ORDER BY completed_at DESC, rowid DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id.to_string()], completion_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Resources --

    pub fn insert_resource(&self, resource: &MotherhoodResource) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO motherhood_resources
                    (id, title, resource_type, category, description, url, author,
                     is_featured, is_active, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                rusqlite::params![
                    resource.id.to_string(),
                    resource.title,
                    resource.resource_type.as_ref(),
                    resource.category.as_ref(),
                    resource.description,
                    resource.url,
                    resource.author,
                    resource.is_featured,
                    resource.is_active,
                    resource.created_at,
                ],
            )?;
            Ok(inserted > 0)
        })
    }

    /// Active resources, featured first.
    pub fn list_resources(&self, query: &ResourceQuery) -> Result<Vec<MotherhoodResource>> {
        let search = query.search.as_deref().map(like_pattern);
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {RESOURCE_COLUMNS} FROM motherhood_resources
                 WHERE is_active = 1
                   AND (?1 IS NULL OR resource_type = ?1)
                   AND (?2 IS NULL OR category = ?2)
                   AND (?3 IS NULL OR is_featured = ?3)
                   AND (?4 IS NULL OR title LIKE ?4 ESCAPE '\\' OR description LIKE ?4 ESCAPE '\\'
                        OR author LIKE ?4 ESCAPE '\\')
                 ORDER BY is_featured DESC, created_at DESC, rowid DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(
                    rusqlite::params![
                        query.resource_type.as_ref().map(AsRef::<str>::as_ref),
                        query.category.as_ref().map(AsRef::<str>::as_ref),
                        query.is_featured,
                        search,
                    ],
                    resource_from_row,
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_resource(&self, id: Uuid) -> Result<Option<MotherhoodResource>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {RESOURCE_COLUMNS} FROM motherhood_resources WHERE id = ?1 AND is_active = 1");
            let row = conn.query_row(&sql, [id.to_string()], resource_from_row).optional()?;
            Ok(row)
        })
    }

    // -- Journal --

    pub fn insert_motherhood_journal(&self, user_id: Uuid, entry: &MotherhoodJournal) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO motherhood_journal
                    (id, user_id, title, content, mood, is_private, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    entry.id.to_string(),
                    user_id.to_string(),
                    entry.title,
                    entry.content,
                    entry.mood.as_ref().map(AsRef::<str>::as_ref),
                    entry.is_private,
                    entry.created_at,
                    entry.updated_at,
                ],
            )?;
            Ok(())
        })
    }

    pub fn list_motherhood_journal(&self, user_id: Uuid) -> Result<Vec<MotherhoodJournal>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {JOURNAL_COLUMNS} FROM motherhood_journal WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id.to_string()], journal_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_motherhood_journal(&self, user_id: Uuid, id: Uuid) -> Result<Option<MotherhoodJournal>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {JOURNAL_COLUMNS} FROM motherhood_journal WHERE id = ?1 AND user_id = ?2");
            let row = conn
                .query_row(&sql, [id.to_string(), user_id.to_string()], journal_from_row)
                .optional()?;
            Ok(row)
        })
    }

    pub fn update_motherhood_journal(&self, user_id: Uuid, entry: &MotherhoodJournal) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE motherhood_journal SET title = ?1, content = ?2, mood = ?3, is_private = ?4,
                    updated_at = ?5
                 WHERE id = ?6 AND user_id = ?7",
                rusqlite::params![
                    entry.title,
                    entry.content,
                    entry.mood.as_ref().map(AsRef::<str>::as_ref),
                    entry.is_private,
                    entry.updated_at,
                    entry.id.to_string(),
                    user_id.to_string(),
                ],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn delete_motherhood_journal(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        self.delete_owned("motherhood_journal", user_id, id)
    }

    // -- Support groups --

    pub fn insert_support_group(&self, group: &SupportGroup) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO support_groups
                    (id, name, group_type, description, is_private, max_members,
                     current_members, is_active, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                rusqlite::params![
                    group.id.to_string(),
                    group.name,
                    group.group_type.as_ref(),
                    group.description,
                    group.is_private,
                    group.max_members,
                    group.current_members,
                    group.is_active,
                    group.created_at,
                ],
            )?;
            Ok(inserted > 0)
        })
    }

    pub fn list_support_groups(&self, group_type: Option<GroupType>) -> Result<Vec<SupportGroup>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {GROUP_COLUMNS} FROM support_groups
                 WHERE is_active = 1 AND (?1 IS NULL OR group_type = ?1)
                 ORDER BY name"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([group_type.as_ref().map(AsRef::<str>::as_ref)], group_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_support_group(&self, id: Uuid) -> Result<Option<SupportGroup>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {GROUP_COLUMNS} FROM support_groups WHERE id = ?1 AND is_active = 1");
            let row = conn.query_row(&sql, [id.to_string()], group_from_row).optional()?;
            Ok(row)
        })
    }
}

fn routine_from_row(row: &Row) -> rusqlite::Result<ChildcareRoutine> {
    Ok(ChildcareRoutine {
        id: uuid_col(row, 0)?,
        title: row.get(1)?,
        routine_type: enum_col(row, 2)?,
        description: row.get(3)?,
        time_of_day: row.get(4)?,
        duration_minutes: row.get(5)?,
        is_active: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn completion_from_row(row: &Row) -> rusqlite::Result<RitualCompletion> {
    Ok(RitualCompletion {
        id: uuid_col(row, 0)?,
        routine: opt_uuid_col(row, 1)?,
        completed: row.get(2)?,
        completed_at: row.get(3)?,
        notes: row.get(4)?,
    })
}

fn resource_from_row(row: &Row) -> rusqlite::Result<MotherhoodResource> {
    Ok(MotherhoodResource {
        id: uuid_col(row, 0)?,
        title: row.get(1)?,
        resource_type: enum_col(row, 2)?,
        category: enum_col(row, 3)?,
        description: row.get(4)?,
        url: row.get(5)?,
        author: row.get(6)?,
        is_featured: row.get(7)?,
        is_active: row.get(8)?,
        created_at: row.get(9)?,
    })
}

fn journal_from_row(row: &Row) -> rusqlite::Result<MotherhoodJournal> {
    Ok(MotherhoodJournal {
        id: uuid_col(row, 0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        mood: opt_enum_col(row, 3)?,
        is_private: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn group_from_row(row: &Row) -> rusqlite::Result<SupportGroup> {
    Ok(SupportGroup {
        id: uuid_col(row, 0)?,
        name: row.get(1)?,
        group_type: enum_col(row, 2)?,
        description: row.get(3)?,
        is_private: row.get(4)?,
        max_members: row.get(5)?,
        current_members: row.get(6)?,
        is_active: row.get(7)?,
        created_at: row.get(8)?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveTime, Utc};
    use uuid::Uuid;

    use herspace_types::api::{ResourceQuery, RoutineQuery};
    use herspace_types::enums::{
        GroupType, MotherhoodMood, ResourceCategory, ResourceType, RoutineType,
    };
    use herspace_types::models::{
        ChildcareRoutine, MotherhoodJournal, MotherhoodResource, RitualCompletion, SupportGroup,
    };

    use super::super::testutil::{add_user, db_with_user};

    fn routine(title: &str, routine_type: RoutineType, is_active: bool) -> ChildcareRoutine {
        let now = Utc::now();
        ChildcareRoutine {
            id: Uuid::new_v4(),
            title: title.into(),
            routine_type,
            description: String::new(),
            time_of_day: NaiveTime::from_hms_opt(19, 30, 0),
            duration_minutes: Some(20),
            is_active,
            created_at: now,
            updated_at: now,
        }
    }

    fn resource(title: &str, category: ResourceCategory, is_featured: bool) -> MotherhoodResource {
        MotherhoodResource {
            id: Uuid::new_v4(),
            title: title.into(),
            resource_type: ResourceType::Article,
            category,
            description: "A gentle read".into(),
            url: None,
            author: "Nino".into(),
            is_featured,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn routine_filters_combine() {
        let (db, user) = db_with_user("mia");
        db.insert_routine(user, &routine("Bath time", RoutineType::Hygiene, true)).unwrap();
        db.insert_routine(user, &routine("Bedtime story", RoutineType::Sleep, true)).unwrap();
        db.insert_routine(user, &routine("Old nap", RoutineType::Sleep, false)).unwrap();

        let sleep = RoutineQuery {
            routine_type: Some(RoutineType::Sleep),
            ..Default::default()
        };
        assert_eq!(db.list_routines(user, &sleep).unwrap().len(), 2);

        let active_sleep = RoutineQuery {
            routine_type: Some(RoutineType::Sleep),
            is_active: Some(true),
            ..Default::default()
        };
        assert_eq!(db.list_routines(user, &active_sleep).unwrap().len(), 1);

        let search = RoutineQuery {
            search: Some("bath".into()),
            ..Default::default()
        };
        let found = db.list_routines(user, &search).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].time_of_day, NaiveTime::from_hms_opt(19, 30, 0));
    }

    #[test]
    fn routines_are_private() {
        let (db, user) = db_with_user("mia");
        let other = add_user(&db, "zoe");
        let r = routine("Feeding", RoutineType::Feeding, true);
        db.insert_routine(user, &r).unwrap();

        assert!(db.get_routine(other, r.id).unwrap().is_none());
        assert!(!db.delete_routine(other, r.id).unwrap());
        assert!(db.list_routines(other, &RoutineQuery::default()).unwrap().is_empty());
    }

    #[test]
    fn completion_is_removed_with_its_routine() {
        let (db, user) = db_with_user("mia");
        let r = routine("Feeding", RoutineType::Feeding, true);
        db.insert_routine(user, &r).unwrap();
        db.insert_completion(
            user,
            &RitualCompletion {
                id: Uuid::new_v4(),
                routine: Some(r.id),
                completed: true,
                completed_at: Utc::now(),
                notes: Some("all done".into()),
            },
        )
        .unwrap();
        assert_eq!(db.list_completions(user).unwrap()[0].routine, Some(r.id));

        db.delete_routine(user, r.id).unwrap();
        assert!(db.list_completions(user).unwrap().is_empty());
    }

    #[test]
    fn featured_resources_come_first() {
        let db = crate::Database::open_in_memory().unwrap();
        db.insert_resource(&resource("Sleep basics", ResourceCategory::Newborn, false)).unwrap();
        db.insert_resource(&resource("Self-care 101", ResourceCategory::SelfCare, true)).unwrap();

        let all = db.list_resources(&ResourceQuery::default()).unwrap();
        assert_eq!(all[0].title, "Self-care 101");

        let newborn = ResourceQuery {
            category: Some(ResourceCategory::Newborn),
            ..Default::default()
        };
        assert_eq!(db.list_resources(&newborn).unwrap().len(), 1);
    }

    #[test]
    fn motherhood_journal_mood_is_optional() {
        let (db, user) = db_with_user("mia");
        let now = Utc::now();
        let mut entry = MotherhoodJournal {
            id: Uuid::new_v4(),
            title: String::new(),
            content: "First smile today".into(),
            mood: None,
            is_private: true,
            created_at: now,
            updated_at: now,
        };
        db.insert_motherhood_journal(user, &entry).unwrap();

        entry.mood = Some(MotherhoodMood::Joyful);
        assert!(db.update_motherhood_journal(user, &entry).unwrap());
        let stored = db.get_motherhood_journal(user, entry.id).unwrap().unwrap();
        assert_eq!(stored.mood, Some(MotherhoodMood::Joyful));
    }

    #[test]
    fn support_groups_filter_by_type() {
        let db = crate::Database::open_in_memory().unwrap();
        for (name, group_type) in [("New moms", GroupType::Newborn), ("Solo", GroupType::SingleMom)] {
            db.insert_support_group(&SupportGroup {
                id: Uuid::new_v4(),
                name: name.into(),
                group_type,
                description: String::new(),
                is_private: true,
                max_members: 50,
                current_members: 0,
                is_active: true,
                created_at: Utc::now(),
            })
            .unwrap();
        }
        let solo = db.list_support_groups(Some(GroupType::SingleMom)).unwrap();
        assert_eq!(solo.len(), 1);
        assert_eq!(solo[0].name, "Solo");
        assert_eq!(db.list_support_groups(None).unwrap().len(), 2);
    }
}
