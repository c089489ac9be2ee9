use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use herspace_types::api::PostQuery;
use herspace_types::enums::{ReactionAction, ReactionType};
use herspace_types::models::{CommunityComment, CommunityPost, CommunityReaction};

use super::{enum_col, like_pattern, uuid_col};
use crate::Database;
use crate::models::ReactorKey;

const POST_COLUMNS: &str = "p.id, p.post_type, p.title, p.content, p.is_anonymous, p.created_at, p.updated_at,
     (SELECT COUNT(*) FROM community_comments c WHERE c.post_id = p.id),
     (SELECT COUNT(*) FROM community_reactions r WHERE r.post_id = p.id)";
const COMMENT_COLUMNS: &str = "id, content, is_anonymous, created_at";
const REACTION_COLUMNS: &str = "id, reaction_type, is_anonymous, created_at";

impl ReactorKey {
    /// Column holding this identity and the value stored in it.
    fn column(&self) -> (&'static str, String) {
        match self {
            ReactorKey::User(id) => ("user_id", id.to_string()),
            ReactorKey::Session(session) => ("session_id", session.clone()),
        }
    }
}

impl Database {
    // -- Posts --

    /// `author` is only recorded for non-anonymous posts.
    pub fn insert_post(&self, author: Option<Uuid>, post: &CommunityPost) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO community_posts
                    (id, user_id, post_type, title, content, is_anonymous, is_approved, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?8)",
                rusqlite::params![
                    post.id.to_string(),
                    author.map(|id| id.to_string()),
                    post.post_type.as_ref(),
                    post.title,
                    post.content,
                    post.is_anonymous,
                    post.created_at,
                    post.updated_at,
                ],
            )?;
            Ok(())
        })
    }

    /// Approved posts, newest first, with counts and the caller's reactions.
    pub fn list_posts(&self, query: &PostQuery, reactor: Option<&ReactorKey>) -> Result<Vec<CommunityPost>> {
        let search = query.search.as_deref().map(like_pattern);
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {POST_COLUMNS} FROM community_posts p
                 WHERE p.is_approved = 1
                   AND (?1 IS NULL OR p.post_type = ?1)
                   AND (?2 IS NULL OR p.title LIKE ?2 ESCAPE '\\' OR p.content LIKE ?2 ESCAPE '\\')
                 ORDER BY p.created_at DESC, p.rowid DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let mut posts = stmt
                .query_map(
                    rusqlite::params![query.post_type.as_ref().map(AsRef::<str>::as_ref), search],
                    post_from_row,
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            if let Some(reactor) = reactor {
                let mut mine = reactions_by(conn, reactor)?;
                for post in &mut posts {
                    post.user_reactions = mine.remove(&post.id).unwrap_or_default();
                }
            }
            Ok(posts)
        })
    }

    pub fn get_post(&self, id: Uuid, reactor: Option<&ReactorKey>) -> Result<Option<CommunityPost>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {POST_COLUMNS} FROM community_posts p WHERE p.id = ?1 AND p.is_approved = 1");
            let Some(mut post) = conn.query_row(&sql, [id.to_string()], post_from_row).optional()? else {
                return Ok(None);
            };
            if let Some(reactor) = reactor {
                post.user_reactions = reactions_by(conn, reactor)?.remove(&id).unwrap_or_default();
            }
            Ok(Some(post))
        })
    }

    pub fn post_exists(&self, id: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let exists = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM community_posts WHERE id = ?1 AND is_approved = 1)",
                [id.to_string()],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
    }

    // -- Comments --

    pub fn insert_comment(&self, post_id: Uuid, author: Option<Uuid>, comment: &CommunityComment) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO community_comments (id, post_id, user_id, content, is_anonymous, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    comment.id.to_string(),
                    post_id.to_string(),
                    author.map(|id| id.to_string()),
                    comment.content,
                    comment.is_anonymous,
                    comment.created_at,
                ],
            )?;
            Ok(())
        })
    }

    pub fn list_comments(&self, post_id: Uuid) -> Result<Vec<CommunityComment>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {COMMENT_COLUMNS} FROM community_comments WHERE post_id = ?1 ORDER BY created_at, rowid"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([post_id.to_string()], comment_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Reactions --

    /// Applies a reaction from `reactor` to a post.
    ///
    /// With no existing reaction a new one is inserted. Reacting again with
    /// the same type removes it, and a different type replaces it. Returns
    /// the resulting reaction, or `None` when it was removed.
    pub fn toggle_reaction(
        &self,
        post_id: Uuid,
        reactor: &ReactorKey,
        reaction_type: ReactionType,
        is_anonymous: bool,
        now: DateTime<Utc>,
    ) -> Result<(ReactionAction, Option<CommunityReaction>)> {
        let (column, key) = reactor.column();
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            // `column` is always one of our literals, never user input
            let sql = format!(
                "SELECT {REACTION_COLUMNS} FROM community_reactions WHERE post_id = ?1 AND {column} = ?2"
            );
            let existing = tx
                .query_row(&sql, [post_id.to_string(), key.clone()], reaction_from_row)
                .optional()?;

            let outcome = match existing {
                Some(current) if current.reaction_type == reaction_type => {
                    tx.execute("DELETE FROM community_reactions WHERE id = ?1", [current.id.to_string()])?;
                    (ReactionAction::Removed, None)
                }
                Some(mut current) => {
                    tx.execute(
                        "UPDATE community_reactions SET reaction_type = ?1 WHERE id = ?2",
                        [reaction_type.as_ref(), current.id.to_string().as_str()],
                    )?;
                    current.reaction_type = reaction_type;
                    (ReactionAction::Changed, Some(current))
                }
                None => {
                    let reaction = CommunityReaction {
                        id: Uuid::new_v4(),
                        reaction_type,
                        is_anonymous,
                        created_at: now,
                    };
                    let (user_id, session_id) = match reactor {
                        ReactorKey::User(id) => (Some(id.to_string()), None),
                        ReactorKey::Session(session) => (None, Some(session.as_str())),
                    };
                    tx.execute(
                        "INSERT INTO community_reactions
                            (id, post_id, user_id, session_id, reaction_type, is_anonymous, created_at)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                        rusqlite::params![
                            reaction.id.to_string(),
                            post_id.to_string(),
                            user_id,
                            session_id,
                            reaction.reaction_type.as_ref(),
                            reaction.is_anonymous,
                            reaction.created_at,
                        ],
                    )?;
                    (ReactionAction::Added, Some(reaction))
                }
            };

            tx.commit()?;
            Ok(outcome)
        })
    }

    pub fn list_reactions(&self, post_id: Uuid) -> Result<Vec<CommunityReaction>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {REACTION_COLUMNS} FROM community_reactions WHERE post_id = ?1 ORDER BY created_at, rowid"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([post_id.to_string()], reaction_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

/// Every reaction left by `reactor`, grouped by post.
fn reactions_by(conn: &Connection, reactor: &ReactorKey) -> Result<HashMap<Uuid, Vec<ReactionType>>> {
    let (column, key) = reactor.column();
    let sql = format!("SELECT post_id, reaction_type FROM community_reactions WHERE {column} = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([key], |row| Ok((uuid_col(row, 0)?, enum_col::<ReactionType>(row, 1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut grouped: HashMap<Uuid, Vec<ReactionType>> = HashMap::new();
    for (post_id, reaction_type) in rows {
        grouped.entry(post_id).or_default().push(reaction_type);
    }
    Ok(grouped)
}

fn post_from_row(row: &Row) -> rusqlite::Result<CommunityPost> {
    Ok(CommunityPost {
        id: uuid_col(row, 0)?,
        post_type: enum_col(row, 1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        is_anonymous: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
        comment_count: row.get(7)?,
        reaction_count: row.get(8)?,
        user_reactions: Vec::new(),
    })
}

fn comment_from_row(row: &Row) -> rusqlite::Result<CommunityComment> {
    Ok(CommunityComment {
        id: uuid_col(row, 0)?,
        content: row.get(1)?,
        is_anonymous: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn reaction_from_row(row: &Row) -> rusqlite::Result<CommunityReaction> {
    Ok(CommunityReaction {
        id: uuid_col(row, 0)?,
        reaction_type: enum_col(row, 1)?,
        is_anonymous: row.get(2)?,
        created_at: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use herspace_types::api::PostQuery;
    use herspace_types::enums::{PostType, ReactionAction, ReactionType};
    use herspace_types::models::{CommunityComment, CommunityPost};

    use super::super::testutil::db_with_user;
    use crate::Database;
    use crate::models::ReactorKey;

    fn post(db: &Database, title: &str, post_type: PostType) -> Uuid {
        let now = Utc::now();
        let post = CommunityPost {
            id: Uuid::new_v4(),
            post_type,
            title: title.into(),
            content: "Sharing this with you all".into(),
            is_anonymous: true,
            created_at: now,
            updated_at: now,
            comment_count: 0,
            reaction_count: 0,
            user_reactions: Vec::new(),
        };
        db.insert_post(None, &post).unwrap();
        post.id
    }

    fn react(db: &Database, post_id: Uuid, who: &ReactorKey, kind: ReactionType) -> ReactionAction {
        db.toggle_reaction(post_id, who, kind, true, Utc::now()).unwrap().0
    }

    #[test]
    fn same_reaction_twice_toggles_off() {
        let (db, user) = db_with_user("ana");
        let id = post(&db, "Hello", PostType::Support);
        let me = ReactorKey::User(user);

        assert_eq!(react(&db, id, &me, ReactionType::Heart), ReactionAction::Added);
        assert_eq!(react(&db, id, &me, ReactionType::Heart), ReactionAction::Removed);
        assert!(db.list_reactions(id).unwrap().is_empty());
    }

    #[test]
    fn different_reaction_replaces() {
        let (db, user) = db_with_user("ana");
        let id = post(&db, "Hello", PostType::Support);
        let me = ReactorKey::User(user);

        react(&db, id, &me, ReactionType::Heart);
        assert_eq!(react(&db, id, &me, ReactionType::Hug), ReactionAction::Changed);

        let reactions = db.list_reactions(id).unwrap();
        assert_eq!(reactions.len(), 1);
        assert_eq!(reactions[0].reaction_type, ReactionType::Hug);
    }

    #[test]
    fn sessions_and_users_react_independently() {
        let (db, user) = db_with_user("ana");
        let id = post(&db, "Hello", PostType::Gratitude);
        let session = ReactorKey::Session("browser-1".into());
        let me = ReactorKey::User(user);

        react(&db, id, &session, ReactionType::Prayer);
        react(&db, id, &me, ReactionType::Prayer);

        let seen_by_session = db.get_post(id, Some(&session)).unwrap().unwrap();
        assert_eq!(seen_by_session.reaction_count, 2);
        assert_eq!(seen_by_session.user_reactions, vec![ReactionType::Prayer]);

        let anonymous = db.get_post(id, None).unwrap().unwrap();
        assert!(anonymous.user_reactions.is_empty());
    }

    #[test]
    fn listing_counts_comments_and_filters() {
        let db = Database::open_in_memory().unwrap();
        let story = post(&db, "My birth story", PostType::Story);
        post(&db, "Need advice on sleep", PostType::Advice);

        db.insert_comment(
            story,
            None,
            &CommunityComment {
                id: Uuid::new_v4(),
                content: "Thank you for sharing".into(),
                is_anonymous: true,
                created_at: Utc::now(),
            },
        )
        .unwrap();

        let stories = PostQuery {
            post_type: Some(PostType::Story),
            ..Default::default()
        };
        let listed = db.list_posts(&stories, None).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].comment_count, 1);

        let search = PostQuery {
            search: Some("sleep".into()),
            ..Default::default()
        };
        assert_eq!(db.list_posts(&search, None).unwrap()[0].post_type, PostType::Advice);
        assert_eq!(db.list_comments(story).unwrap().len(), 1);
    }
}
