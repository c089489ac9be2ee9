use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use herspace_types::api::{
    Claims, CreateDailyTask, CreateJournalEntry, CreateMoodCheckIn, UpdateDailyTask,
    UpdateJournalEntry, UpdateMoodCheckIn,
};
use herspace_types::models::{DailyTask, JournalEntry, MoodCheckIn};

use crate::auth::{AppState, blocking};
use crate::error::{ApiError, Violations};
use crate::extract::JsonBody;

const TITLE_MAX: usize = 255;
const TASK_MAX: usize = 255;

// -- Journal entries --

fn validate_entry(entry: &JournalEntry) -> Result<(), ApiError> {
    let mut v = Violations::new();
    v.max_len("title", &entry.title, TITLE_MAX);
    v.require("content", &entry.content, usize::MAX);
    v.finish()
}

pub async fn list_entries(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<JournalEntry>>, ApiError> {
    let entries = blocking(&state, move |db| db.list_journal_entries(claims.sub)).await?;
    Ok(Json(entries))
}

pub async fn create_entry(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    JsonBody(req): JsonBody<CreateJournalEntry>,
) -> Result<(StatusCode, Json<JournalEntry>), ApiError> {
    let entry = JournalEntry {
        id: Uuid::new_v4(),
        title: req.title,
        content: req.content,
        created_at: Utc::now(),
    };
    validate_entry(&entry)?;

    let stored = entry.clone();
    blocking(&state, move |db| db.insert_journal_entry(claims.sub, &stored)).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn get_entry(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<JournalEntry>, ApiError> {
    let entry = blocking(&state, move |db| db.get_journal_entry(claims.sub, id))
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(entry))
}

pub async fn update_entry(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    JsonBody(req): JsonBody<UpdateJournalEntry>,
) -> Result<Json<JournalEntry>, ApiError> {
    let user = claims.sub;
    let mut entry = blocking(&state, move |db| db.get_journal_entry(user, id))
        .await?
        .ok_or(ApiError::NotFound)?;

    if let Some(title) = req.title {
        entry.title = title;
    }
    if let Some(content) = req.content {
        entry.content = content;
    }
    validate_entry(&entry)?;

    let stored = entry.clone();
    blocking(&state, move |db| db.update_journal_entry(user, &stored)).await?;
    Ok(Json(entry))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if blocking(&state, move |db| db.delete_journal_entry(claims.sub, id)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

// -- Mood check-ins --

pub async fn list_checkins(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<MoodCheckIn>>, ApiError> {
    let checkins = blocking(&state, move |db| db.list_mood_checkins(claims.sub)).await?;
    Ok(Json(checkins))
}

pub async fn create_checkin(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    JsonBody(req): JsonBody<CreateMoodCheckIn>,
) -> Result<(StatusCode, Json<MoodCheckIn>), ApiError> {
    let checkin = MoodCheckIn {
        id: Uuid::new_v4(),
        date: Utc::now().date_naive(),
        mood: req.mood,
        notes: req.notes,
    };

    let stored = checkin.clone();
    let inserted = blocking(&state, move |db| db.insert_mood_checkin(claims.sub, &stored)).await?;
    if !inserted {
        debug!("user {} already checked in on {}", claims.sub, checkin.date);
        return Err(ApiError::field("date", "You have already checked in today."));
    }
    Ok((StatusCode::CREATED, Json(checkin)))
}

pub async fn get_checkin(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<MoodCheckIn>, ApiError> {
    let checkin = blocking(&state, move |db| db.get_mood_checkin(claims.sub, id))
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(checkin))
}

pub async fn update_checkin(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    JsonBody(req): JsonBody<UpdateMoodCheckIn>,
) -> Result<Json<MoodCheckIn>, ApiError> {
    let user = claims.sub;
    let mut checkin = blocking(&state, move |db| db.get_mood_checkin(user, id))
        .await?
        .ok_or(ApiError::NotFound)?;

    if let Some(mood) = req.mood {
        checkin.mood = mood;
    }
    if req.notes.is_some() {
        checkin.notes = req.notes;
    }

    let stored = checkin.clone();
    blocking(&state, move |db| db.update_mood_checkin(user, &stored)).await?;
    Ok(Json(checkin))
}

pub async fn delete_checkin(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if blocking(&state, move |db| db.delete_mood_checkin(claims.sub, id)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

// -- Daily tasks --

fn validate_task(task: &DailyTask) -> Result<(), ApiError> {
    let mut v = Violations::new();
    v.require("body_task", &task.body_task, TASK_MAX);
    v.require("work_task", &task.work_task, TASK_MAX);
    v.require("soul_task", &task.soul_task, TASK_MAX);
    v.finish()
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<DailyTask>>, ApiError> {
    let tasks = blocking(&state, move |db| db.list_daily_tasks(claims.sub)).await?;
    Ok(Json(tasks))
}

pub async fn create_task(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    JsonBody(req): JsonBody<CreateDailyTask>,
) -> Result<(StatusCode, Json<DailyTask>), ApiError> {
    let task = DailyTask {
        id: Uuid::new_v4(),
        date: Utc::now().date_naive(),
        body_task: req.body_task,
        work_task: req.work_task,
        soul_task: req.soul_task,
        completed: req.completed,
    };
    validate_task(&task)?;

    let stored = task.clone();
    let inserted = blocking(&state, move |db| db.insert_daily_task(claims.sub, &stored)).await?;
    if !inserted {
        return Err(ApiError::field("date", "You already have tasks for today."));
    }
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<DailyTask>, ApiError> {
    let task = blocking(&state, move |db| db.get_daily_task(claims.sub, id))
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(task))
}

pub async fn update_task(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    JsonBody(req): JsonBody<UpdateDailyTask>,
) -> Result<Json<DailyTask>, ApiError> {
    let user = claims.sub;
    let mut task = blocking(&state, move |db| db.get_daily_task(user, id))
        .await?
        .ok_or(ApiError::NotFound)?;

    if let Some(body_task) = req.body_task {
        task.body_task = body_task;
    }
    if let Some(work_task) = req.work_task {
        task.work_task = work_task;
    }
    if let Some(soul_task) = req.soul_task {
        task.soul_task = soul_task;
    }
    if let Some(completed) = req.completed {
        task.completed = completed;
    }
    validate_task(&task)?;

    let stored = task.clone();
    blocking(&state, move |db| db.update_daily_task(user, &stored)).await?;
    Ok(Json(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if blocking(&state, move |db| db.delete_daily_task(claims.sub, id)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
