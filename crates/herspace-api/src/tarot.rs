use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use herspace_types::api::{Claims, CreateReading, TarotCardQuery, UpdateReading};
use herspace_types::enums::ReadingType;
use herspace_types::models::{DrawnCard, TarotCard, TarotReading};

use crate::auth::{AppState, blocking};
use crate::chat::ChatError;
use crate::error::{ApiError, Violations};
use crate::extract::{JsonBody, QueryParams};
use crate::reading::{self, READER_SYSTEM_PROMPT};

/// Draws a spread for `question`, asks the chat endpoint to interpret it and
/// stores the reading for `user_id`. Shared by the readings endpoint and the
/// assistant.
pub(crate) async fn perform_reading(
    state: &AppState,
    user_id: Uuid,
    question: String,
    requested: Option<usize>,
) -> Result<TarotReading, ApiError> {
    let deck = blocking(state, |db| db.list_tarot_cards(None)).await?;
    let count = reading::clamp_card_count(requested, deck.len());
    if count == 0 {
        return Err(ApiError::BadRequest("No tarot cards are available.".into()));
    }

    let (cards, prompt, fallback): (Vec<DrawnCard>, String, String) = {
        let mut rng = rand::rng();
        let spread = reading::draw(&deck, count, &mut rng);
        (
            spread.iter().map(|s| s.drawn.clone()).collect(),
            reading::build_prompt(&question, &spread),
            reading::fallback_interpretation(&question, &spread),
        )
    };

    let interpretation = match state.chat.complete(READER_SYSTEM_PROMPT, &prompt).await {
        Ok(text) => text,
        Err(ChatError::NotConfigured) => {
            debug!("chat not configured, using card meanings");
            fallback
        }
        Err(e) => {
            warn!("tarot interpretation failed, using card meanings: {}", e);
            fallback
        }
    };

    let reading = TarotReading {
        id: Uuid::new_v4(),
        question,
        reading_type: ReadingType::for_card_count(cards.len()),
        cards,
        interpretation,
        created_at: Utc::now(),
    };

    let stored = reading.clone();
    blocking(state, move |db| db.insert_tarot_reading(user_id, &stored)).await?;
    info!("Stored {} reading with {} cards", reading.reading_type.as_ref(), reading.cards.len());
    Ok(reading)
}

pub async fn list_cards(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<TarotCardQuery>,
) -> Result<Json<Vec<TarotCard>>, ApiError> {
    let cards = blocking(&state, move |db| db.list_tarot_cards(query.suit)).await?;
    Ok(Json(cards))
}

pub async fn list_readings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<TarotReading>>, ApiError> {
    let readings = blocking(&state, move |db| db.list_tarot_readings(claims.sub)).await?;
    Ok(Json(readings))
}

pub async fn create_reading(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    JsonBody(req): JsonBody<CreateReading>,
) -> Result<(StatusCode, Json<TarotReading>), ApiError> {
    let mut v = Violations::new();
    v.require("question", &req.question, usize::MAX);
    v.finish()?;

    let reading = perform_reading(&state, claims.sub, req.question, req.card_count).await?;
    Ok((StatusCode::CREATED, Json(reading)))
}

pub async fn get_reading(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<TarotReading>, ApiError> {
    let reading = blocking(&state, move |db| db.get_tarot_reading(claims.sub, id))
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(reading))
}

/// Only the question can change; the drawn cards are fixed.
pub async fn update_reading(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    JsonBody(req): JsonBody<UpdateReading>,
) -> Result<Json<TarotReading>, ApiError> {
    let mut v = Violations::new();
    v.require("question", &req.question, usize::MAX);
    v.finish()?;

    let user = claims.sub;
    let reading = blocking(&state, move |db| {
        if !db.update_tarot_question(user, id, &req.question)? {
            return Ok(None);
        }
        db.get_tarot_reading(user, id)
    })
    .await?
    .ok_or(ApiError::NotFound)?;
    Ok(Json(reading))
}

pub async fn delete_reading(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if blocking(&state, move |db| db.delete_tarot_reading(claims.sub, id)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
