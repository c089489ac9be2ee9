use axum::{Extension, Json, extract::State};

use herspace_types::api::{Claims, UserStats};
use herspace_types::models::User;

use crate::auth::{AppState, blocking};
use crate::error::ApiError;

pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<User>, ApiError> {
    let row = blocking(&state, move |db| db.get_user_by_id(claims.sub))
        .await?
        // Token outlived its account
        .ok_or(ApiError::Unauthorized)?;

    Ok(Json(User {
        id: row.id,
        username: row.username,
        email: row.email,
        date_joined: row.created_at,
    }))
}

pub async fn stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UserStats>, ApiError> {
    let stats = blocking(&state, move |db| db.user_stats(claims.sub)).await?;
    Ok(Json(stats))
}
