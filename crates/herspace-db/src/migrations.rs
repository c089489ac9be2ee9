use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            username    TEXT NOT NULL UNIQUE,
            email       TEXT NOT NULL DEFAULT '',
            password    TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );

        -- Journal ---------------------------------------------------------

        CREATE TABLE IF NOT EXISTS journal_entries (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            title       TEXT NOT NULL DEFAULT '',
            content     TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_journal_entries_user
            ON journal_entries(user_id, created_at);

        CREATE TABLE IF NOT EXISTS mood_checkins (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            date        TEXT NOT NULL,
            mood        TEXT NOT NULL,
            notes       TEXT,
            UNIQUE(user_id, date)
        );

        -- One task per user per day is checked by the application.
        CREATE TABLE IF NOT EXISTS daily_tasks (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            date        TEXT NOT NULL,
            body_task   TEXT NOT NULL,
            work_task   TEXT NOT NULL,
            soul_task   TEXT NOT NULL,
            completed   INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_daily_tasks_user
            ON daily_tasks(user_id, date);

        CREATE TABLE IF NOT EXISTS rituals (
            id                  TEXT PRIMARY KEY,
            title               TEXT NOT NULL,
            description         TEXT NOT NULL DEFAULT '',
            ritual_type         TEXT NOT NULL,
            content             TEXT NOT NULL,
            for_life_phase      TEXT NOT NULL DEFAULT 'any',
            emotional_tone      TEXT NOT NULL DEFAULT 'gentle',
            duration_minutes    INTEGER NOT NULL DEFAULT 5,
            is_for_beginners    INTEGER NOT NULL DEFAULT 1,
            tags                TEXT NOT NULL DEFAULT '[]',
            is_active           INTEGER NOT NULL DEFAULT 1,
            language            TEXT NOT NULL DEFAULT 'en',
            created_at          TEXT NOT NULL
        );

        -- Tarot and assistant ---------------------------------------------

        CREATE TABLE IF NOT EXISTS tarot_cards (
            id                  TEXT PRIMARY KEY,
            name                TEXT NOT NULL UNIQUE,
            description         TEXT NOT NULL DEFAULT '',
            is_major_arcana     INTEGER NOT NULL DEFAULT 0,
            suit                TEXT NOT NULL,
            upright_meanings    TEXT NOT NULL DEFAULT '[]',
            reversed_meanings   TEXT NOT NULL DEFAULT '[]'
        );

        CREATE TABLE IF NOT EXISTS tarot_readings (
            id              TEXT PRIMARY KEY,
            user_id         TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            question        TEXT NOT NULL,
            reading_type    TEXT NOT NULL,
            cards           TEXT NOT NULL,
            interpretation  TEXT NOT NULL,
            created_at      TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS ai_conversations (
            id                  TEXT PRIMARY KEY,
            user_id             TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            message             TEXT NOT NULL,
            response            TEXT NOT NULL,
            conversation_type   TEXT NOT NULL,
            created_at          TEXT NOT NULL
        );

        -- Motherhood ------------------------------------------------------

        CREATE TABLE IF NOT EXISTS childcare_routines (
            id                  TEXT PRIMARY KEY,
            user_id             TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            title               TEXT NOT NULL,
            routine_type        TEXT NOT NULL,
            description         TEXT NOT NULL DEFAULT '',
            time_of_day         TEXT,
            duration_minutes    INTEGER,
            is_active           INTEGER NOT NULL DEFAULT 1,
            created_at          TEXT NOT NULL,
            updated_at          TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS ritual_completions (
            id              TEXT PRIMARY KEY,
            user_id         TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            routine_id      TEXT REFERENCES childcare_routines(id) ON DELETE CASCADE,
            completed       INTEGER NOT NULL DEFAULT 1,
            completed_at    TEXT NOT NULL,
            notes           TEXT
        );

        CREATE TABLE IF NOT EXISTS motherhood_resources (
            id              TEXT PRIMARY KEY,
            title           TEXT NOT NULL UNIQUE,
            resource_type   TEXT NOT NULL,
            category        TEXT NOT NULL,
            description     TEXT NOT NULL,
            url             TEXT,
            author          TEXT NOT NULL DEFAULT '',
            is_featured     INTEGER NOT NULL DEFAULT 0,
            is_active       INTEGER NOT NULL DEFAULT 1,
            created_at      TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS motherhood_journal (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            title       TEXT NOT NULL DEFAULT '',
            content     TEXT NOT NULL,
            mood        TEXT,
            is_private  INTEGER NOT NULL DEFAULT 1,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS support_groups (
            id              TEXT PRIMARY KEY,
            name            TEXT NOT NULL UNIQUE,
            group_type      TEXT NOT NULL,
            description     TEXT NOT NULL,
            is_private      INTEGER NOT NULL DEFAULT 1,
            max_members     INTEGER NOT NULL DEFAULT 50,
            current_members INTEGER NOT NULL DEFAULT 0,
            is_active       INTEGER NOT NULL DEFAULT 1,
            created_at      TEXT NOT NULL
        );

        -- Community -------------------------------------------------------

        CREATE TABLE IF NOT EXISTS community_posts (
            id              TEXT PRIMARY KEY,
            user_id         TEXT REFERENCES users(id) ON DELETE SET NULL,
            post_type       TEXT NOT NULL,
            title           TEXT NOT NULL,
            content         TEXT NOT NULL,
            is_anonymous    INTEGER NOT NULL DEFAULT 1,
            is_approved     INTEGER NOT NULL DEFAULT 1,
            created_at      TEXT NOT NULL,
            updated_at      TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_community_posts_created
            ON community_posts(created_at);

        CREATE TABLE IF NOT EXISTS community_comments (
            id              TEXT PRIMARY KEY,
            post_id         TEXT NOT NULL REFERENCES community_posts(id) ON DELETE CASCADE,
            user_id         TEXT REFERENCES users(id) ON DELETE SET NULL,
            content         TEXT NOT NULL,
            is_anonymous    INTEGER NOT NULL DEFAULT 1,
            created_at      TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_community_comments_post
            ON community_comments(post_id, created_at);

        CREATE TABLE IF NOT EXISTS community_reactions (
            id              TEXT PRIMARY KEY,
            post_id         TEXT NOT NULL REFERENCES community_posts(id) ON DELETE CASCADE,
            user_id         TEXT REFERENCES users(id) ON DELETE CASCADE,
            session_id      TEXT,
            reaction_type   TEXT NOT NULL,
            is_anonymous    INTEGER NOT NULL DEFAULT 1,
            created_at      TEXT NOT NULL,
            CHECK ((user_id IS NULL) <> (session_id IS NULL))
        );

        -- One reaction per post per identity
        CREATE UNIQUE INDEX IF NOT EXISTS uq_reactions_post_user
            ON community_reactions(post_id, user_id) WHERE user_id IS NOT NULL;

        CREATE UNIQUE INDEX IF NOT EXISTS uq_reactions_post_session
            ON community_reactions(post_id, session_id) WHERE session_id IS NOT NULL;

        -- Notifications ---------------------------------------------------

        CREATE TABLE IF NOT EXISTS notifications (
            id                  TEXT PRIMARY KEY,
            user_id             TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            notification_type   TEXT NOT NULL,
            title               TEXT NOT NULL,
            message             TEXT NOT NULL,
            priority            TEXT NOT NULL DEFAULT 'medium',
            is_read             INTEGER NOT NULL DEFAULT 0,
            is_sent             INTEGER NOT NULL DEFAULT 0,
            created_at          TEXT NOT NULL,
            scheduled_for       TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_notifications_user
            ON notifications(user_id, created_at);

        CREATE TABLE IF NOT EXISTS notification_preferences (
            id                              TEXT PRIMARY KEY,
            user_id                         TEXT NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
            mood_reminder_enabled           INTEGER NOT NULL,
            mood_reminder_time              TEXT NOT NULL,
            mood_reminder_days              TEXT NOT NULL DEFAULT '[]',
            task_reminder_enabled           INTEGER NOT NULL,
            task_reminder_time              TEXT NOT NULL,
            journal_reminder_enabled        INTEGER NOT NULL,
            journal_reminder_time           TEXT NOT NULL,
            community_notifications_enabled INTEGER NOT NULL,
            comment_notifications_enabled   INTEGER NOT NULL,
            reaction_notifications_enabled  INTEGER NOT NULL,
            insight_notifications_enabled   INTEGER NOT NULL,
            weekly_insight_enabled          INTEGER NOT NULL,
            email_notifications_enabled     INTEGER NOT NULL,
            push_notifications_enabled      INTEGER NOT NULL,
            quiet_hours_start               TEXT,
            quiet_hours_end                 TEXT,
            created_at                      TEXT NOT NULL,
            updated_at                      TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS notification_templates (
            id                  TEXT PRIMARY KEY,
            template_type       TEXT NOT NULL UNIQUE,
            title_template      TEXT NOT NULL,
            message_template    TEXT NOT NULL,
            is_active           INTEGER NOT NULL DEFAULT 1,
            created_at          TEXT NOT NULL
        );

        -- Wellness --------------------------------------------------------

        CREATE TABLE IF NOT EXISTS user_profiles (
            user_id                 TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
            current_mood_context    TEXT,
            preferred_support_style TEXT,
            life_roles              TEXT NOT NULL DEFAULT '[]',
            created_at              TEXT NOT NULL,
            updated_at              TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS wisdom_messages (
            id                  TEXT PRIMARY KEY,
            title               TEXT NOT NULL UNIQUE,
            message             TEXT NOT NULL,
            affirmation         TEXT NOT NULL DEFAULT '',
            for_mood_context    TEXT NOT NULL DEFAULT 'any',
            for_support_style   TEXT NOT NULL DEFAULT 'any',
            for_energy_level    TEXT NOT NULL DEFAULT 'any',
            tags                TEXT NOT NULL DEFAULT '[]',
            is_active           INTEGER NOT NULL DEFAULT 1,
            created_at          TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS wisdom_deliveries (
            id              TEXT PRIMARY KEY,
            user_id         TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            wisdom_id       TEXT NOT NULL REFERENCES wisdom_messages(id) ON DELETE CASCADE,
            delivered_at    TEXT NOT NULL,
            was_helpful     INTEGER
        );

        CREATE TABLE IF NOT EXISTS ritual_usages (
            id                      TEXT PRIMARY KEY,
            user_id                 TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            ritual_id               TEXT NOT NULL REFERENCES rituals(id) ON DELETE CASCADE,
            used_at                 TEXT NOT NULL,
            was_helpful             INTEGER,
            effectiveness_rating    INTEGER CHECK (effectiveness_rating BETWEEN 1 AND 5),
            mood_before             TEXT,
            mood_after              TEXT,
            notes                   TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_ritual_usages_user
            ON ritual_usages(user_id, used_at);

        CREATE TABLE IF NOT EXISTS mindfulness_activities (
            id                      TEXT PRIMARY KEY,
            title                   TEXT NOT NULL UNIQUE,
            title_ka                TEXT NOT NULL DEFAULT '',
            description             TEXT NOT NULL,
            description_ka          TEXT NOT NULL DEFAULT '',
            short_description       TEXT NOT NULL DEFAULT '',
            short_description_ka    TEXT NOT NULL DEFAULT '',
            icon                    TEXT NOT NULL DEFAULT '',
            duration_minutes        INTEGER NOT NULL,
            audio_url               TEXT,
            category                TEXT NOT NULL,
            difficulty              TEXT NOT NULL DEFAULT 'beginner',
            is_active               INTEGER NOT NULL DEFAULT 1,
            created_at              TEXT NOT NULL,
            updated_at              TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS mindfulness_sessions (
            id                  TEXT PRIMARY KEY,
            user_id             TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            activity_id         TEXT NOT NULL REFERENCES mindfulness_activities(id) ON DELETE CASCADE,
            started_at          TEXT NOT NULL,
            duration_minutes    INTEGER,
            mood_before         TEXT,
            mood_after          TEXT,
            notes               TEXT,
            created_at          TEXT NOT NULL
        );

        -- Analytics -------------------------------------------------------

        CREATE TABLE IF NOT EXISTS user_insights (
            id              TEXT PRIMARY KEY,
            user_id         TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            insight_type    TEXT NOT NULL,
            data            TEXT NOT NULL,
            computed_at     TEXT NOT NULL,
            UNIQUE(user_id, insight_type)
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
