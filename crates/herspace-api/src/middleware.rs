use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};

use herspace_types::enums::TokenType;

use crate::auth::{AppState, decode_token};
use crate::error::ApiError;

pub const SESSION_HEADER: &str = "x-session-id";

/// Who is calling a route that also accepts anonymous visitors.
#[derive(Debug, Clone, Default)]
pub struct Viewer {
    pub user: Option<herspace_types::api::Claims>,
    /// Value of the `X-Session-Id` header, if sent.
    pub session: Option<String>,
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
}

/// Reject requests without a valid access token; on success the claims are
/// available to handlers as `Extension<Claims>`.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer(req.headers()).ok_or(ApiError::Unauthorized)?;
    let claims = decode_token(&state.jwt.secret, &token, TokenType::Access)?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Attach a [`Viewer`] to every request. A bearer token is optional, but one
/// that is sent must be valid.
pub async fn resolve_identity(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = match bearer(req.headers()) {
        Some(token) => Some(decode_token(&state.jwt.secret, &token, TokenType::Access)?),
        None => None,
    };
    let session = req
        .headers()
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty() && s.len() <= 64)
        .map(str::to_string);

    req.extensions_mut().insert(Viewer { user, session });
    Ok(next.run(req).await)
}
