use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use herspace_types::api::{AssistantRequest, AssistantResponse, Claims, CreateConversation};
use herspace_types::enums::ConversationType;
use herspace_types::models::AiConversation;

use crate::auth::{AppState, blocking};
use crate::chat::ChatError;
use crate::error::{ApiError, Violations};
use crate::extract::JsonBody;
use crate::reading::{COMPANION_FALLBACK, COMPANION_SYSTEM_PROMPT, parse_tarot_request};
use crate::tarot::perform_reading;

/// Dagi: tarot-flavoured messages get a full reading, everything else a
/// supportive reply. Each exchange is stored as a conversation.
pub async fn dagi(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    JsonBody(req): JsonBody<AssistantRequest>,
) -> Result<Json<AssistantResponse>, ApiError> {
    let mut v = Violations::new();
    v.require("message", &req.message, usize::MAX);
    v.finish()?;

    let message = req.message.trim().to_string();
    let (conversation_type, response, reading) = match parse_tarot_request(&message) {
        Some(count) => {
            debug!("dagi message read as a {}-card tarot request", count);
            let reading = perform_reading(&state, claims.sub, message.clone(), Some(count)).await?;
            (ConversationType::Tarot, reading.interpretation.clone(), Some(reading))
        }
        None => {
            let reply = match state.chat.complete(COMPANION_SYSTEM_PROMPT, &message).await {
                Ok(text) => text,
                Err(ChatError::NotConfigured) => COMPANION_FALLBACK.to_string(),
                Err(e) => {
                    warn!("dagi reply failed, sending fallback: {}", e);
                    COMPANION_FALLBACK.to_string()
                }
            };
            (ConversationType::General, reply, None)
        }
    };

    let conversation = AiConversation {
        id: Uuid::new_v4(),
        message,
        response: response.clone(),
        conversation_type,
        created_at: Utc::now(),
    };
    let conversation_id = conversation.id;
    blocking(&state, move |db| db.insert_conversation(claims.sub, &conversation)).await?;

    Ok(Json(AssistantResponse {
        conversation_id,
        response,
        conversation_type,
        reading,
    }))
}

// -- Conversations --

pub async fn list_conversations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<AiConversation>>, ApiError> {
    let conversations = blocking(&state, move |db| db.list_conversations(claims.sub)).await?;
    Ok(Json(conversations))
}

pub async fn create_conversation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    JsonBody(req): JsonBody<CreateConversation>,
) -> Result<(StatusCode, Json<AiConversation>), ApiError> {
    let mut v = Violations::new();
    v.require("message", &req.message, usize::MAX);
    v.require("response", &req.response, usize::MAX);
    v.finish()?;

    let conversation = AiConversation {
        id: Uuid::new_v4(),
        message: req.message,
        response: req.response,
        conversation_type: req.conversation_type,
        created_at: Utc::now(),
    };
    let stored = conversation.clone();
    blocking(&state, move |db| db.insert_conversation(claims.sub, &stored)).await?;
    Ok((StatusCode::CREATED, Json(conversation)))
}

pub async fn get_conversation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<AiConversation>, ApiError> {
    let conversation = blocking(&state, move |db| db.get_conversation(claims.sub, id))
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(conversation))
}

pub async fn delete_conversation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if blocking(&state, move |db| db.delete_conversation(claims.sub, id)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
