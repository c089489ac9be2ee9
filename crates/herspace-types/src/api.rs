use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::*;
use crate::models::*;

// -- JWT Claims --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub token_type: TokenType,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub username: String,
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessToken {
    pub access: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UserStats {
    pub journal_entries: u32,
    pub mood_checkins: u32,
    pub daily_tasks: u32,
    pub completed_tasks: u32,
    pub tarot_readings: u32,
    pub ai_conversations: u32,
    pub motherhood_journal_entries: u32,
    pub rituals_tracked: u32,
}

// -- Journal --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateJournalEntry {
    #[serde(default)]
    pub title: String,
    pub content: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateJournalEntry {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateMoodCheckIn {
    pub mood: Mood,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateMoodCheckIn {
    pub mood: Option<Mood>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateDailyTask {
    pub body_task: String,
    pub work_task: String,
    pub soul_task: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateDailyTask {
    pub body_task: Option<String>,
    pub work_task: Option<String>,
    pub soul_task: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateRitual {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub ritual_type: RitualType,
    pub content: String,
    #[serde(default = "default_life_phase")]
    pub for_life_phase: LifePhase,
    #[serde(default = "default_tone")]
    pub emotional_tone: EmotionalTone,
    #[serde(default = "default_ritual_minutes")]
    pub duration_minutes: u32,
    #[serde(default = "default_true")]
    pub is_for_beginners: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub language: Language,
}

fn default_life_phase() -> LifePhase {
    LifePhase::Any
}

fn default_tone() -> EmotionalTone {
    EmotionalTone::Gentle
}

fn default_ritual_minutes() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateRitual {
    pub title: Option<String>,
    pub description: Option<String>,
    pub ritual_type: Option<RitualType>,
    pub content: Option<String>,
    pub for_life_phase: Option<LifePhase>,
    pub emotional_tone: Option<EmotionalTone>,
    pub duration_minutes: Option<u32>,
    pub is_for_beginners: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub is_active: Option<bool>,
    pub language: Option<Language>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RitualQuery {
    pub language: Option<Language>,
    pub ritual_type: Option<RitualType>,
}

// -- Tarot / assistant --

#[derive(Debug, Default, Deserialize)]
pub struct TarotCardQuery {
    pub suit: Option<Suit>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateReading {
    pub question: String,
    #[serde(default)]
    pub card_count: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateReading {
    pub question: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssistantRequest {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AssistantResponse {
    pub conversation_id: Uuid,
    pub response: String,
    pub conversation_type: ConversationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading: Option<TarotReading>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateConversation {
    pub message: String,
    pub response: String,
    #[serde(default = "default_conversation_type")]
    pub conversation_type: ConversationType,
}

fn default_conversation_type() -> ConversationType {
    ConversationType::General
}

// -- Motherhood --

#[derive(Debug, Default, Deserialize)]
pub struct RoutineQuery {
    pub routine_type: Option<RoutineType>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateRoutine {
    pub title: String,
    pub routine_type: RoutineType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub time_of_day: Option<NaiveTime>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateRoutine {
    pub title: Option<String>,
    pub routine_type: Option<RoutineType>,
    pub description: Option<String>,
    pub time_of_day: Option<NaiveTime>,
    pub duration_minutes: Option<u32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompleteRoutine {
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResourceQuery {
    pub resource_type: Option<ResourceType>,
    pub category: Option<ResourceCategory>,
    pub is_featured: Option<bool>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateMotherhoodJournal {
    #[serde(default)]
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub mood: Option<MotherhoodMood>,
    #[serde(default = "default_true")]
    pub is_private: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateMotherhoodJournal {
    pub title: Option<String>,
    pub content: Option<String>,
    pub mood: Option<MotherhoodMood>,
    pub is_private: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SupportGroupQuery {
    pub group_type: Option<GroupType>,
}

// -- Community --

#[derive(Debug, Default, Deserialize)]
pub struct PostQuery {
    pub post_type: Option<PostType>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePost {
    pub post_type: PostType,
    pub title: String,
    pub content: String,
    #[serde(default = "default_true")]
    pub is_anonymous: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateComment {
    pub content: String,
    #[serde(default = "default_true")]
    pub is_anonymous: bool,
}

#[derive(Debug, Deserialize)]
pub struct ReactRequest {
    pub reaction_type: ReactionType,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReactionResponse {
    pub action: ReactionAction,
    pub message: String,
    #[serde(flatten)]
    pub reaction: Option<CommunityReaction>,
    /// Session the reaction is tracked under, for anonymous callers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

// -- Notifications --

#[derive(Debug, Default, Deserialize)]
pub struct NotificationQuery {
    pub notification_type: Option<NotificationType>,
    pub is_read: Option<bool>,
    pub priority: Option<Priority>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateNotification {
    #[serde(default = "default_notification_type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub scheduled_for: Option<DateTime<Utc>>,
}

fn default_notification_type() -> NotificationType {
    NotificationType::Custom
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarkReadRequest {
    pub notification_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MarkReadResponse {
    pub message: String,
    pub updated: usize,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct NotificationStats {
    pub total_notifications: u32,
    pub unread_count: u32,
    pub read_count: u32,
    pub high_priority_count: u32,
    pub today_notifications: u32,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePreferences {
    pub mood_reminder_enabled: Option<bool>,
    pub mood_reminder_time: Option<NaiveTime>,
    pub mood_reminder_days: Option<Vec<String>>,
    pub task_reminder_enabled: Option<bool>,
    pub task_reminder_time: Option<NaiveTime>,
    pub journal_reminder_enabled: Option<bool>,
    pub journal_reminder_time: Option<NaiveTime>,
    pub community_notifications_enabled: Option<bool>,
    pub comment_notifications_enabled: Option<bool>,
    pub reaction_notifications_enabled: Option<bool>,
    pub insight_notifications_enabled: Option<bool>,
    pub weekly_insight_enabled: Option<bool>,
    pub email_notifications_enabled: Option<bool>,
    pub push_notifications_enabled: Option<bool>,
    pub quiet_hours_start: Option<NaiveTime>,
    pub quiet_hours_end: Option<NaiveTime>,
}

// -- Wellness --

#[derive(Debug, Default, Deserialize)]
pub struct ProfileInput {
    pub current_mood_context: Option<LifePhase>,
    pub preferred_support_style: Option<SupportStyle>,
    pub life_roles: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OnboardingResponse {
    pub message: String,
    pub profile: UserProfile,
}

#[derive(Debug, Default, Deserialize)]
pub struct WisdomQuery {
    pub mood_context: Option<LifePhase>,
    pub support_style: Option<SupportStyle>,
    pub energy_level: Option<EnergyLevel>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserContext {
    pub mood_context: Option<LifePhase>,
    pub support_style: Option<SupportStyle>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EffectivenessContext {
    pub total_rituals_tried: u32,
    pub highly_rated_count: u32,
    pub recommendation_basis: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PersonalizedRituals {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_context: Option<UserContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effectiveness_context: Option<EffectivenessContext>,
    pub rituals: Vec<Ritual>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrackRitualRequest {
    pub ritual: Uuid,
    #[serde(default)]
    pub was_helpful: Option<bool>,
    #[serde(default)]
    pub effectiveness_rating: Option<u8>,
    #[serde(default)]
    pub mood_before: Option<String>,
    #[serde(default)]
    pub mood_after: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TrackRitualResponse {
    pub message: String,
    pub usage: RitualUsage,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RitualHistoryStats {
    pub total_rituals_used: u32,
    pub helpful_rituals: u32,
    pub average_rating: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RitualHistory {
    pub history: Vec<RitualUsage>,
    pub stats: RitualHistoryStats,
}

#[derive(Debug, Default, Deserialize)]
pub struct LanguageQuery {
    pub lang: Option<Language>,
}

/// Mindfulness activity rendered in one language.
#[derive(Debug, Serialize, Deserialize)]
pub struct LocalizedActivity {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub short_description: String,
    pub icon: String,
    pub duration_minutes: u32,
    pub audio_url: Option<String>,
    pub category: MindfulnessCategory,
    pub difficulty: Difficulty,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StartSession {
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub mood_before: Option<String>,
    #[serde(default)]
    pub mood_after: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

// -- Analytics --

#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodTrendPoint {
    pub date: NaiveDate,
    pub mood: Mood,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodAnalytics {
    pub total_checkins: u32,
    pub mood_distribution: BTreeMap<String, u32>,
    pub most_common_mood: String,
    pub average_mood_score: f64,
    pub mood_trend: Vec<MoodTrendPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskTrendPoint {
    pub date: NaiveDate,
    pub completed: u32,
    pub total: u32,
    pub rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskAnalytics {
    pub total_tasks: u32,
    pub completed_tasks: u32,
    pub completion_rate: f64,
    pub task_completion_trend: Vec<TaskTrendPoint>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryLengthStats {
    pub average_length: usize,
    pub shortest: usize,
    pub longest: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalAnalytics {
    pub total_entries: u32,
    pub average_entries_per_week: f64,
    pub most_active_day: String,
    pub entry_length_stats: Option<EntryLengthStats>,
    pub journaling_streak: u32,
}
