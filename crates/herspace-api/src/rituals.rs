use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use herspace_types::api::{CreateRitual, RitualQuery, UpdateRitual};
use herspace_types::models::Ritual;

use crate::auth::{AppState, blocking};
use crate::error::{ApiError, Violations};
use crate::extract::{JsonBody, QueryParams};

fn validate(ritual: &Ritual) -> Result<(), ApiError> {
    let mut v = Violations::new();
    v.require("title", &ritual.title, 200);
    v.require("content", &ritual.content, usize::MAX);
    if ritual.duration_minutes == 0 {
        v.add("duration_minutes", "Ensure this value is greater than or equal to 1.");
    }
    v.finish()
}

pub async fn list_rituals(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<RitualQuery>,
) -> Result<Json<Vec<Ritual>>, ApiError> {
    let rituals = blocking(&state, move |db| db.list_rituals(query.language, query.ritual_type)).await?;
    Ok(Json(rituals))
}

pub async fn create_ritual(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateRitual>,
) -> Result<(StatusCode, Json<Ritual>), ApiError> {
    let ritual = Ritual {
        id: Uuid::new_v4(),
        title: req.title,
        description: req.description,
        ritual_type: req.ritual_type,
        content: req.content,
        for_life_phase: req.for_life_phase,
        emotional_tone: req.emotional_tone,
        duration_minutes: req.duration_minutes,
        is_for_beginners: req.is_for_beginners,
        tags: req.tags,
        is_active: req.is_active,
        language: req.language,
        created_at: Utc::now(),
    };
    validate(&ritual)?;

    let stored = ritual.clone();
    blocking(&state, move |db| db.insert_ritual(&stored)).await?;
    info!("Created ritual {} ({})", ritual.title, ritual.language.as_ref());
    Ok((StatusCode::CREATED, Json(ritual)))
}

pub async fn get_ritual(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Ritual>, ApiError> {
    let ritual = blocking(&state, move |db| db.get_ritual(id))
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(ritual))
}

pub async fn update_ritual(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    JsonBody(req): JsonBody<UpdateRitual>,
) -> Result<Json<Ritual>, ApiError> {
    let mut ritual = blocking(&state, move |db| db.get_ritual(id))
        .await?
        .ok_or(ApiError::NotFound)?;

    if let Some(title) = req.title {
        ritual.title = title;
    }
    if let Some(description) = req.description {
        ritual.description = description;
    }
    if let Some(ritual_type) = req.ritual_type {
        ritual.ritual_type = ritual_type;
    }
    if let Some(content) = req.content {
        ritual.content = content;
    }
    if let Some(phase) = req.for_life_phase {
        ritual.for_life_phase = phase;
    }
    if let Some(tone) = req.emotional_tone {
        ritual.emotional_tone = tone;
    }
    if let Some(minutes) = req.duration_minutes {
        ritual.duration_minutes = minutes;
    }
    if let Some(beginners) = req.is_for_beginners {
        ritual.is_for_beginners = beginners;
    }
    if let Some(tags) = req.tags {
        ritual.tags = tags;
    }
    if let Some(active) = req.is_active {
        ritual.is_active = active;
    }
    if let Some(language) = req.language {
        ritual.language = language;
    }
    validate(&ritual)?;

    let stored = ritual.clone();
    blocking(&state, move |db| db.update_ritual(&stored)).await?;
    Ok(Json(ritual))
}

pub async fn delete_ritual(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if blocking(&state, move |db| db.delete_ritual(id)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
