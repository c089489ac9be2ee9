use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand_core::OsRng;
use tracing::{error, info};
use uuid::Uuid;

use herspace_db::Database;
use herspace_types::api::{
    AccessToken, Claims, LoginRequest, RefreshRequest, RegisterRequest, RegisterResponse, TokenPair,
};
use herspace_types::enums::TokenType;

use crate::chat::ChatClient;
use crate::error::{ApiError, Violations};
use crate::extract::JsonBody;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt: JwtConfig,
    pub chat: ChatClient,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

/// Run a blocking DB call off the async runtime.
pub async fn blocking<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow::anyhow!("blocking task failed"))
        })?
        .map_err(ApiError::from)
}

pub async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = req.email.unwrap_or_default().trim().to_string();

    let mut violations = Violations::new();
    validate_username(&mut violations, &req.username);
    validate_password(&mut violations, &req.password);
    if !email.is_empty() && !email.contains('@') {
        violations.add("email", "Enter a valid email address.");
    }
    violations.finish()?;

    let (username_taken, email_taken) = {
        let username = req.username.clone();
        let email = email.clone();
        blocking(&state, move |db| {
            Ok((db.get_user_by_username(&username)?.is_some(), db.email_taken(&email)?))
        })
        .await?
    };
    let mut violations = Violations::new();
    if username_taken {
        violations.add("username", "A user with that username already exists.");
    }
    if email_taken {
        violations.add("email", "A user with this email already exists.");
    }
    violations.finish()?;

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("password hashing failed: {e}")))?
        .to_string();

    let user_id = Uuid::new_v4();
    let username = req.username.clone();
    blocking(&state, move |db| {
        db.create_user(user_id, &username, &email, &password_hash, Utc::now())
    })
    .await?;

    let tokens = issue_pair(&state.jwt, user_id, &req.username)?;
    info!("Registered user {}", req.username);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id,
            username: req.username,
            access: tokens.access,
            refresh: tokens.refresh,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    let username = req.username.clone();
    let user = blocking(&state, move |db| db.get_user_by_username(&username))
        .await?
        .ok_or(ApiError::Unauthorized)?;

    // Verify password
    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("stored hash is invalid: {e}")))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::Unauthorized)?;

    Ok(Json(issue_pair(&state.jwt, user.id, &user.username)?))
}

pub async fn refresh(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RefreshRequest>,
) -> Result<Json<AccessToken>, ApiError> {
    let claims = decode_token(&state.jwt.secret, &req.refresh, TokenType::Refresh)?;
    let access = create_token(
        &state.jwt.secret,
        claims.sub,
        &claims.username,
        TokenType::Access,
        state.jwt.access_ttl,
    )?;
    Ok(Json(AccessToken { access }))
}

fn validate_username(violations: &mut Violations, username: &str) {
    let len = username.chars().count();
    if !(3..=150).contains(&len) {
        violations.add("username", "Username must be between 3 and 150 characters.");
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        violations.add(
            "username",
            "Enter a valid username. It may contain only letters, numbers, and @/./+/-/_ characters.",
        );
    }
}

fn validate_password(violations: &mut Violations, password: &str) {
    if password.chars().count() < 8 {
        violations.add("password", "This password is too short. It must contain at least 8 characters.");
    }
    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        violations.add("password", "This password is entirely numeric.");
    }
}

fn issue_pair(jwt: &JwtConfig, user_id: Uuid, username: &str) -> Result<TokenPair, ApiError> {
    Ok(TokenPair {
        access: create_token(&jwt.secret, user_id, username, TokenType::Access, jwt.access_ttl)?,
        refresh: create_token(&jwt.secret, user_id, username, TokenType::Refresh, jwt.refresh_ttl)?,
    })
}

pub fn create_token(
    secret: &str,
    user_id: Uuid,
    username: &str,
    token_type: TokenType,
    ttl: Duration,
) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        token_type,
        exp: (Utc::now() + ttl).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Validates signature and expiry, then insists on the expected token type.
pub fn decode_token(secret: &str, token: &str, expected: TokenType) -> Result<Claims, ApiError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ApiError::Unauthorized)?;

    if data.claims.token_type != expected {
        return Err(ApiError::Unauthorized);
    }
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn token_type_is_enforced() {
        let id = Uuid::new_v4();
        let refresh = create_token(SECRET, id, "luna", TokenType::Refresh, Duration::days(1)).unwrap();

        assert!(decode_token(SECRET, &refresh, TokenType::Access).is_err());
        let claims = decode_token(SECRET, &refresh, TokenType::Refresh).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.username, "luna");
    }

    #[test]
    fn expired_and_foreign_tokens_are_rejected() {
        let id = Uuid::new_v4();
        let expired = create_token(SECRET, id, "luna", TokenType::Access, Duration::hours(-2)).unwrap();
        assert!(decode_token(SECRET, &expired, TokenType::Access).is_err());

        let foreign = create_token("other", id, "luna", TokenType::Access, Duration::hours(1)).unwrap();
        assert!(decode_token(SECRET, &foreign, TokenType::Access).is_err());
    }

    #[test]
    fn username_rules() {
        let mut v = Violations::new();
        validate_username(&mut v, "ok.name+tag@x");
        assert!(v.finish().is_ok());

        let mut v = Violations::new();
        validate_username(&mut v, "no spaces!");
        assert!(v.finish().is_err());

        let mut v = Violations::new();
        validate_username(&mut v, "ab");
        assert!(v.finish().is_err());
    }

    #[test]
    fn numeric_or_short_passwords_fail() {
        let mut v = Violations::new();
        validate_password(&mut v, "12345678");
        assert!(v.finish().is_err());

        let mut v = Violations::new();
        validate_password(&mut v, "short");
        assert!(v.finish().is_err());

        let mut v = Violations::new();
        validate_password(&mut v, "moonlight-42");
        assert!(v.finish().is_ok());
    }
}
