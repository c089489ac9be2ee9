use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use herspace_types::api::{
    Claims, CompleteRoutine, CreateMotherhoodJournal, CreateRoutine, ResourceQuery, RoutineQuery,
    SupportGroupQuery, UpdateMotherhoodJournal, UpdateRoutine,
};
use herspace_types::models::{
    ChildcareRoutine, MotherhoodJournal, MotherhoodResource, RitualCompletion, SupportGroup,
};

use crate::auth::{AppState, blocking};
use crate::error::{ApiError, Violations};
use crate::extract::{JsonBody, QueryParams};

fn validate_routine(routine: &ChildcareRoutine) -> Result<(), ApiError> {
    let mut v = Violations::new();
    v.require("title", &routine.title, 200);
    if routine.duration_minutes == Some(0) {
        v.add("duration_minutes", "Ensure this value is greater than or equal to 1.");
    }
    v.finish()
}

// -- Routines --

pub async fn list_routines(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    QueryParams(query): QueryParams<RoutineQuery>,
) -> Result<Json<Vec<ChildcareRoutine>>, ApiError> {
    let routines = blocking(&state, move |db| db.list_routines(claims.sub, &query)).await?;
    Ok(Json(routines))
}

pub async fn create_routine(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    JsonBody(req): JsonBody<CreateRoutine>,
) -> Result<(StatusCode, Json<ChildcareRoutine>), ApiError> {
    let now = Utc::now();
    let routine = ChildcareRoutine {
        id: Uuid::new_v4(),
        title: req.title,
        routine_type: req.routine_type,
        description: req.description,
        time_of_day: req.time_of_day,
        duration_minutes: req.duration_minutes,
        is_active: req.is_active,
        created_at: now,
        updated_at: now,
    };
    validate_routine(&routine)?;

    let stored = routine.clone();
    blocking(&state, move |db| db.insert_routine(claims.sub, &stored)).await?;
    Ok((StatusCode::CREATED, Json(routine)))
}

pub async fn get_routine(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ChildcareRoutine>, ApiError> {
    let routine = blocking(&state, move |db| db.get_routine(claims.sub, id))
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(routine))
}

pub async fn update_routine(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    JsonBody(req): JsonBody<UpdateRoutine>,
) -> Result<Json<ChildcareRoutine>, ApiError> {
    let user = claims.sub;
    let mut routine = blocking(&state, move |db| db.get_routine(user, id))
        .await?
        .ok_or(ApiError::NotFound)?;

    if let Some(title) = req.title {
        routine.title = title;
    }
    if let Some(routine_type) = req.routine_type {
        routine.routine_type = routine_type;
    }
    if let Some(description) = req.description {
        routine.description = description;
    }
    if req.time_of_day.is_some() {
        routine.time_of_day = req.time_of_day;
    }
    if req.duration_minutes.is_some() {
        routine.duration_minutes = req.duration_minutes;
    }
    if let Some(active) = req.is_active {
        routine.is_active = active;
    }
    routine.updated_at = Utc::now();
    validate_routine(&routine)?;

    let stored = routine.clone();
    blocking(&state, move |db| db.update_routine(user, &stored)).await?;
    Ok(Json(routine))
}

pub async fn delete_routine(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if blocking(&state, move |db| db.delete_routine(claims.sub, id)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

pub async fn complete_routine(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    body: Result<JsonBody<CompleteRoutine>, ApiError>,
) -> Result<(StatusCode, Json<RitualCompletion>), ApiError> {
    // the body is optional; an empty POST completes without notes
    let notes = body.ok().and_then(|JsonBody(req)| req.notes);
    let completion = RitualCompletion {
        id: Uuid::new_v4(),
        routine: Some(id),
        completed: true,
        completed_at: Utc::now(),
        notes,
    };

    let user = claims.sub;
    let stored = completion.clone();
    let found = blocking(&state, move |db| {
        if db.get_routine(user, id)?.is_none() {
            return Ok(false);
        }
        db.insert_completion(user, &stored)?;
        Ok(true)
    })
    .await?;

    if !found {
        return Err(ApiError::NotFound);
    }
    Ok((StatusCode::CREATED, Json(completion)))
}

pub async fn list_completions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<RitualCompletion>>, ApiError> {
    let completions = blocking(&state, move |db| db.list_completions(claims.sub)).await?;
    Ok(Json(completions))
}

// -- Resources --

pub async fn list_resources(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ResourceQuery>,
) -> Result<Json<Vec<MotherhoodResource>>, ApiError> {
    let resources = blocking(&state, move |db| db.list_resources(&query)).await?;
    Ok(Json(resources))
}

pub async fn get_resource(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MotherhoodResource>, ApiError> {
    let resource = blocking(&state, move |db| db.get_resource(id))
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(resource))
}

// -- Journal --

fn validate_journal(entry: &MotherhoodJournal) -> Result<(), ApiError> {
    let mut v = Violations::new();
    v.max_len("title", &entry.title, 200);
    v.require("content", &entry.content, usize::MAX);
    v.finish()
}

pub async fn list_journal(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<MotherhoodJournal>>, ApiError> {
    let entries = blocking(&state, move |db| db.list_motherhood_journal(claims.sub)).await?;
    Ok(Json(entries))
}

pub async fn create_journal(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    JsonBody(req): JsonBody<CreateMotherhoodJournal>,
) -> Result<(StatusCode, Json<MotherhoodJournal>), ApiError> {
    let now = Utc::now();
    let entry = MotherhoodJournal {
        id: Uuid::new_v4(),
        title: req.title,
        content: req.content,
        mood: req.mood,
        is_private: req.is_private,
        created_at: now,
        updated_at: now,
    };
    validate_journal(&entry)?;

    let stored = entry.clone();
    blocking(&state, move |db| db.insert_motherhood_journal(claims.sub, &stored)).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn get_journal(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<MotherhoodJournal>, ApiError> {
    let entry = blocking(&state, move |db| db.get_motherhood_journal(claims.sub, id))
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(entry))
}

pub async fn update_journal(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    JsonBody(req): JsonBody<UpdateMotherhoodJournal>,
) -> Result<Json<MotherhoodJournal>, ApiError> {
    let user = claims.sub;
    let mut entry = blocking(&state, move |db| db.get_motherhood_journal(user, id))
        .await?
        .ok_or(ApiError::NotFound)?;

    if let Some(title) = req.title {
        entry.title = title;
    }
    if let Some(content) = req.content {
        entry.content = content;
    }
    if req.mood.is_some() {
        entry.mood = req.mood;
    }
    if let Some(private) = req.is_private {
        entry.is_private = private;
    }
    entry.updated_at = Utc::now();
    validate_journal(&entry)?;

    let stored = entry.clone();
    blocking(&state, move |db| db.update_motherhood_journal(user, &stored)).await?;
    Ok(Json(entry))
}

pub async fn delete_journal(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if blocking(&state, move |db| db.delete_motherhood_journal(claims.sub, id)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

// -- Support groups --

pub async fn list_support_groups(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SupportGroupQuery>,
) -> Result<Json<Vec<SupportGroup>>, ApiError> {
    let groups = blocking(&state, move |db| db.list_support_groups(query.group_type)).await?;
    Ok(Json(groups))
}

pub async fn get_support_group(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SupportGroup>, ApiError> {
    let group = blocking(&state, move |db| db.get_support_group(id))
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(group))
}
