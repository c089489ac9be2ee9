use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub date_joined: DateTime<Utc>,
}

// -- Journal --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodCheckIn {
    pub id: Uuid,
    pub date: NaiveDate,
    pub mood: Mood,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyTask {
    pub id: Uuid,
    pub date: NaiveDate,
    pub body_task: String,
    pub work_task: String,
    pub soul_task: String,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ritual {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub ritual_type: RitualType,
    pub content: String,
    pub for_life_phase: LifePhase,
    pub emotional_tone: EmotionalTone,
    pub duration_minutes: u32,
    pub is_for_beginners: bool,
    pub tags: Vec<String>,
    pub is_active: bool,
    pub language: Language,
    pub created_at: DateTime<Utc>,
}

// -- Tarot --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TarotCard {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub is_major_arcana: bool,
    pub suit: Suit,
    pub upright_meanings: Vec<String>,
    pub reversed_meanings: Vec<String>,
}

/// A card as it lies in a reading. `position` is the zero-based slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawnCard {
    pub id: Uuid,
    pub name: String,
    pub suit: Suit,
    pub reversed: bool,
    pub position: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TarotReading {
    pub id: Uuid,
    pub question: String,
    pub reading_type: ReadingType,
    pub cards: Vec<DrawnCard>,
    pub interpretation: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConversation {
    pub id: Uuid,
    pub message: String,
    pub response: String,
    pub conversation_type: ConversationType,
    pub created_at: DateTime<Utc>,
}

// -- Motherhood --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildcareRoutine {
    pub id: Uuid,
    pub title: String,
    pub routine_type: RoutineType,
    pub description: String,
    pub time_of_day: Option<NaiveTime>,
    pub duration_minutes: Option<u32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RitualCompletion {
    pub id: Uuid,
    pub routine: Option<Uuid>,
    pub completed: bool,
    pub completed_at: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotherhoodResource {
    pub id: Uuid,
    pub title: String,
    pub resource_type: ResourceType,
    pub category: ResourceCategory,
    pub description: String,
    pub url: Option<String>,
    pub author: String,
    pub is_featured: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotherhoodJournal {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub mood: Option<MotherhoodMood>,
    pub is_private: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportGroup {
    pub id: Uuid,
    pub name: String,
    pub group_type: GroupType,
    pub description: String,
    pub is_private: bool,
    pub max_members: u32,
    pub current_members: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

// -- Community --

/// Posts never expose their author: the row keeps an optional user id for
/// non-anonymous posts but the wire model does not carry it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityPost {
    pub id: Uuid,
    pub post_type: PostType,
    pub title: String,
    pub content: String,
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub comment_count: u32,
    pub reaction_count: u32,
    /// Reactions the caller has left on this post.
    pub user_reactions: Vec<ReactionType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityComment {
    pub id: Uuid,
    pub content: String,
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityReaction {
    pub id: Uuid,
    pub reaction_type: ReactionType,
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
}

// -- Notifications --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub priority: Priority,
    pub is_read: bool,
    pub is_sent: bool,
    pub created_at: DateTime<Utc>,
    pub scheduled_for: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPreference {
    pub id: Uuid,
    pub mood_reminder_enabled: bool,
    pub mood_reminder_time: NaiveTime,
    pub mood_reminder_days: Vec<String>,
    pub task_reminder_enabled: bool,
    pub task_reminder_time: NaiveTime,
    pub journal_reminder_enabled: bool,
    pub journal_reminder_time: NaiveTime,
    pub community_notifications_enabled: bool,
    pub comment_notifications_enabled: bool,
    pub reaction_notifications_enabled: bool,
    pub insight_notifications_enabled: bool,
    pub weekly_insight_enabled: bool,
    pub email_notifications_enabled: bool,
    pub push_notifications_enabled: bool,
    pub quiet_hours_start: Option<NaiveTime>,
    pub quiet_hours_end: Option<NaiveTime>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NotificationPreference {
    /// Preferences a user gets the first time they are looked up.
    pub fn defaults(id: Uuid, now: DateTime<Utc>) -> Self {
        let at = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap_or_default();
        Self {
            id,
            mood_reminder_enabled: true,
            mood_reminder_time: at(9),
            mood_reminder_days: Vec::new(),
            task_reminder_enabled: true,
            task_reminder_time: at(8),
            journal_reminder_enabled: true,
            journal_reminder_time: at(20),
            community_notifications_enabled: true,
            comment_notifications_enabled: true,
            reaction_notifications_enabled: true,
            insight_notifications_enabled: true,
            weekly_insight_enabled: true,
            email_notifications_enabled: false,
            push_notifications_enabled: true,
            quiet_hours_start: None,
            quiet_hours_end: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationTemplate {
    pub id: Uuid,
    pub template_type: TemplateType,
    pub title_template: String,
    pub message_template: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

// -- Wellness --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub current_mood_context: Option<LifePhase>,
    pub preferred_support_style: Option<SupportStyle>,
    pub life_roles: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WisdomMessage {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    pub affirmation: String,
    pub for_mood_context: LifePhase,
    pub for_support_style: SupportStyle,
    pub for_energy_level: EnergyLevel,
    pub tags: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RitualUsage {
    pub id: Uuid,
    pub ritual: Uuid,
    pub ritual_title: String,
    pub used_at: DateTime<Utc>,
    pub was_helpful: Option<bool>,
    pub effectiveness_rating: Option<u8>,
    pub mood_before: Option<String>,
    pub mood_after: Option<String>,
    pub notes: Option<String>,
}

/// Stored activity with both English and Georgian copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MindfulnessActivity {
    pub id: Uuid,
    pub title: String,
    pub title_ka: String,
    pub description: String,
    pub description_ka: String,
    pub short_description: String,
    pub short_description_ka: String,
    pub icon: String,
    pub duration_minutes: u32,
    pub audio_url: Option<String>,
    pub category: MindfulnessCategory,
    pub difficulty: Difficulty,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MindfulnessSession {
    pub id: Uuid,
    pub activity: Uuid,
    pub activity_title: String,
    pub started_at: DateTime<Utc>,
    pub duration_minutes: Option<u32>,
    pub mood_before: Option<String>,
    pub mood_after: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

// -- Analytics --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInsight {
    pub id: Uuid,
    pub insight_type: InsightType,
    pub data: serde_json::Value,
    pub computed_at: DateTime<Utc>,
}
