use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{NaiveTime, Utc};
use tracing::info;
use uuid::Uuid;

use herspace_types::api::{
    Claims, CreateNotification, MarkReadRequest, MarkReadResponse, NotificationQuery,
    NotificationStats, UpdatePreferences,
};
use herspace_types::models::{Notification, NotificationPreference, NotificationTemplate};

use crate::auth::{AppState, blocking};
use crate::error::{ApiError, Violations};
use crate::extract::{JsonBody, QueryParams};

const WEEKDAYS: [&str; 7] = ["monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday"];

pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    QueryParams(query): QueryParams<NotificationQuery>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let notifications = blocking(&state, move |db| db.list_notifications(claims.sub, &query)).await?;
    Ok(Json(notifications))
}

pub async fn get_notification(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<Notification>, ApiError> {
    let notification = blocking(&state, move |db| db.get_notification(claims.sub, id))
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(notification))
}

pub async fn create_notification(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    JsonBody(req): JsonBody<CreateNotification>,
) -> Result<(StatusCode, Json<Notification>), ApiError> {
    let mut v = Violations::new();
    v.require("title", &req.title, 200);
    v.require("message", &req.message, usize::MAX);
    v.finish()?;

    let notification = Notification {
        id: Uuid::new_v4(),
        notification_type: req.notification_type,
        title: req.title,
        message: req.message,
        priority: req.priority,
        is_read: false,
        is_sent: false,
        created_at: Utc::now(),
        scheduled_for: req.scheduled_for,
    };
    let stored = notification.clone();
    blocking(&state, move |db| db.insert_notification(claims.sub, &stored)).await?;
    Ok((StatusCode::CREATED, Json(notification)))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    JsonBody(req): JsonBody<MarkReadRequest>,
) -> Result<Json<MarkReadResponse>, ApiError> {
    if req.notification_ids.is_empty() {
        return Err(ApiError::field("notification_ids", "This list may not be empty."));
    }
    let updated = blocking(&state, move |db| {
        db.mark_notifications_read(claims.sub, &req.notification_ids)
    })
    .await?;
    Ok(Json(MarkReadResponse {
        message: format!("{updated} notifications marked as read"),
        updated,
    }))
}

pub async fn stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<NotificationStats>, ApiError> {
    let day_start = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();
    let stats = blocking(&state, move |db| db.notification_stats(claims.sub, day_start)).await?;
    Ok(Json(stats))
}

// -- Preferences --

pub async fn get_preferences(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<NotificationPreference>, ApiError> {
    let prefs = blocking(&state, move |db| db.get_or_create_preferences(claims.sub, Utc::now())).await?;
    Ok(Json(prefs))
}

/// Serves both PUT and PATCH: only the fields present are changed.
pub async fn update_preferences(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    JsonBody(req): JsonBody<UpdatePreferences>,
) -> Result<Json<NotificationPreference>, ApiError> {
    if let Some(days) = &req.mood_reminder_days {
        if let Some(bad) = days.iter().find(|d| !WEEKDAYS.contains(&d.to_lowercase().as_str())) {
            return Err(ApiError::field("mood_reminder_days", format!("\"{bad}\" is not a weekday.")));
        }
    }

    let user = claims.sub;
    let prefs = blocking(&state, move |db| {
        let mut prefs = db.get_or_create_preferences(user, Utc::now())?;
        apply(&mut prefs, req);
        prefs.updated_at = Utc::now();
        db.update_preferences(user, &prefs)?;
        Ok(prefs)
    })
    .await?;
    info!("Updated notification preferences for {}", claims.username);
    Ok(Json(prefs))
}

fn apply(prefs: &mut NotificationPreference, req: UpdatePreferences) {
    macro_rules! merge {
        ($($field:ident),+ $(,)?) => {
            $(if let Some(value) = req.$field {
                prefs.$field = value;
            })+
        };
    }
    merge!(
        mood_reminder_enabled,
        mood_reminder_time,
        task_reminder_enabled,
        task_reminder_time,
        journal_reminder_enabled,
        journal_reminder_time,
        community_notifications_enabled,
        comment_notifications_enabled,
        reaction_notifications_enabled,
        insight_notifications_enabled,
        weekly_insight_enabled,
        email_notifications_enabled,
        push_notifications_enabled,
    );
    if let Some(days) = req.mood_reminder_days {
        prefs.mood_reminder_days = days.into_iter().map(|d| d.to_lowercase()).collect();
    }
    if req.quiet_hours_start.is_some() {
        prefs.quiet_hours_start = req.quiet_hours_start;
    }
    if req.quiet_hours_end.is_some() {
        prefs.quiet_hours_end = req.quiet_hours_end;
    }
}

pub async fn list_templates(State(state): State<AppState>) -> Result<Json<Vec<NotificationTemplate>>, ApiError> {
    let templates = blocking(&state, |db| db.list_templates()).await?;
    Ok(Json(templates))
}
