//! Anonymous-first community board. Every route here runs behind
//! `resolve_identity`, so a caller may be a signed-in user, a browser
//! session identified by `X-Session-Id`, or neither.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use herspace_db::models::ReactorKey;
use herspace_types::api::{CreateComment, CreatePost, PostQuery, ReactRequest, ReactionResponse};
use herspace_types::enums::ReactionAction;
use herspace_types::models::{CommunityComment, CommunityPost, CommunityReaction};

use crate::auth::{AppState, blocking};
use crate::error::{ApiError, Violations};
use crate::extract::{JsonBody, QueryParams};
use crate::middleware::{SESSION_HEADER, Viewer};

impl Viewer {
    /// Identity reactions are keyed on: the user when signed in, else the session.
    fn reactor(&self) -> Option<ReactorKey> {
        match (&self.user, &self.session) {
            (Some(claims), _) => Some(ReactorKey::User(claims.sub)),
            (None, Some(session)) => Some(ReactorKey::Session(session.clone())),
            (None, None) => None,
        }
    }

    fn user_id(&self) -> Option<Uuid> {
        self.user.as_ref().map(|claims| claims.sub)
    }
}

// -- Posts --

pub async fn list_posts(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    QueryParams(query): QueryParams<PostQuery>,
) -> Result<Json<Vec<CommunityPost>>, ApiError> {
    let reactor = viewer.reactor();
    let posts = blocking(&state, move |db| db.list_posts(&query, reactor.as_ref())).await?;
    Ok(Json(posts))
}

pub async fn create_post(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    JsonBody(req): JsonBody<CreatePost>,
) -> Result<(StatusCode, Json<CommunityPost>), ApiError> {
    let mut v = Violations::new();
    v.require("title", &req.title, 200);
    v.require("content", &req.content, usize::MAX);
    v.finish()?;

    let now = Utc::now();
    let post = CommunityPost {
        id: Uuid::new_v4(),
        post_type: req.post_type,
        title: req.title,
        content: req.content,
        is_anonymous: req.is_anonymous,
        created_at: now,
        updated_at: now,
        comment_count: 0,
        reaction_count: 0,
        user_reactions: Vec::new(),
    };
    let author = viewer.user_id().filter(|_| !post.is_anonymous);

    let stored = post.clone();
    blocking(&state, move |db| db.insert_post(author, &stored)).await?;
    debug!("community post {} created (anonymous: {})", post.id, post.is_anonymous);
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn get_post(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<Uuid>,
) -> Result<Json<CommunityPost>, ApiError> {
    let reactor = viewer.reactor();
    let post = blocking(&state, move |db| db.get_post(id, reactor.as_ref()))
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(post))
}

// -- Comments --

pub async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<CommunityComment>>, ApiError> {
    let comments = blocking(&state, move |db| {
        if !db.post_exists(id)? {
            return Ok(None);
        }
        db.list_comments(id).map(Some)
    })
    .await?
    .ok_or(ApiError::NotFound)?;
    Ok(Json(comments))
}

pub async fn create_comment(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<Uuid>,
    JsonBody(req): JsonBody<CreateComment>,
) -> Result<(StatusCode, Json<CommunityComment>), ApiError> {
    let mut v = Violations::new();
    v.require("content", &req.content, usize::MAX);
    v.finish()?;

    let comment = CommunityComment {
        id: Uuid::new_v4(),
        content: req.content,
        is_anonymous: req.is_anonymous,
        created_at: Utc::now(),
    };
    let author = viewer.user_id().filter(|_| !comment.is_anonymous);

    let stored = comment.clone();
    let found = blocking(&state, move |db| {
        if !db.post_exists(id)? {
            return Ok(false);
        }
        db.insert_comment(id, author, &stored)?;
        Ok(true)
    })
    .await?;

    if !found {
        return Err(ApiError::NotFound);
    }
    Ok((StatusCode::CREATED, Json(comment)))
}

// -- Reactions --

/// Adds, removes or swaps the caller's reaction. Anonymous callers without a
/// session get a fresh one, echoed in the body and the `X-Session-Id` header.
pub async fn react(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<Uuid>,
    JsonBody(req): JsonBody<ReactRequest>,
) -> Result<Response, ApiError> {
    let reactor = match viewer.reactor() {
        Some(key) => key,
        None => ReactorKey::Session(Uuid::new_v4().to_string()),
    };
    let session_id = match &reactor {
        ReactorKey::Session(session) => Some(session.clone()),
        ReactorKey::User(_) => None,
    };
    let is_anonymous = viewer.user.is_none();

    let key = reactor.clone();
    let outcome = blocking(&state, move |db| {
        if !db.post_exists(id)? {
            return Ok(None);
        }
        db.toggle_reaction(id, &key, req.reaction_type, is_anonymous, Utc::now())
            .map(Some)
    })
    .await?;
    let (action, reaction) = outcome.ok_or(ApiError::NotFound)?;

    let (status, message) = match action {
        ReactionAction::Added => (StatusCode::CREATED, "Reaction added"),
        ReactionAction::Removed => (StatusCode::OK, "Reaction removed"),
        ReactionAction::Changed => (StatusCode::OK, "Reaction changed"),
    };

    let mut headers = HeaderMap::new();
    if let Some(session) = &session_id {
        let value = HeaderValue::from_str(session)
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("invalid session header: {e}")))?;
        headers.insert(SESSION_HEADER, value);
    }

    let body = ReactionResponse {
        action,
        message: message.to_string(),
        reaction,
        session_id,
    };
    Ok((status, headers, Json(body)).into_response())
}

pub async fn list_reactions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<CommunityReaction>>, ApiError> {
    let reactions = blocking(&state, move |db| {
        if !db.post_exists(id)? {
            return Ok(None);
        }
        db.list_reactions(id).map(Some)
    })
    .await?
    .ok_or(ApiError::NotFound)?;
    Ok(Json(reactions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use herspace_types::api::Claims;
    use herspace_types::enums::TokenType;

    fn claims(id: Uuid) -> Claims {
        Claims { sub: id, username: "luna".into(), token_type: TokenType::Access, exp: 0 }
    }

    #[test]
    fn signed_in_users_react_as_themselves() {
        let id = Uuid::new_v4();
        let viewer = Viewer { user: Some(claims(id)), session: Some("abc".into()) };
        assert_eq!(viewer.reactor(), Some(ReactorKey::User(id)));
    }

    #[test]
    fn anonymous_viewers_fall_back_to_session() {
        let viewer = Viewer { user: None, session: Some("abc".into()) };
        assert_eq!(viewer.reactor(), Some(ReactorKey::Session("abc".into())));
        assert_eq!(Viewer::default().reactor(), None);
    }
}
