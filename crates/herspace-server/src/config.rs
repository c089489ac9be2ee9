use std::path::PathBuf;

use anyhow::{Context, bail};
use chrono::Duration;

use herspace_api::auth::JwtConfig;
use herspace_api::chat::{ChatConfig, DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
    "your-secret-key",
];

const MAX_ACCESS_TOKEN_MINUTES: i64 = 7 * 24 * 60;
const MAX_REFRESH_TOKEN_DAYS: i64 = 365;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub seed: bool,
    pub jwt: JwtConfig,
    pub chat: ChatConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let bounded = |key: &str, default: i64, max: i64| -> anyhow::Result<i64> {
            let n = match var(key) {
                Some(v) => v.parse().with_context(|| format!("{key} must be a number, got {v:?}"))?,
                None => default,
            };
            if !(1..=max).contains(&n) {
                bail!("{key} must be between 1 and {max}, got {n}");
            }
            Ok(n)
        };

        let secret = var("HERSPACE_JWT_SECRET").unwrap_or_default();
        if secret.is_empty() || PLACEHOLDER_SECRETS.contains(&secret.as_str()) {
            bail!("HERSPACE_JWT_SECRET is unset or still a placeholder");
        }

        let port = match var("HERSPACE_PORT") {
            Some(v) => v.parse().with_context(|| format!("HERSPACE_PORT is not a port: {v:?}"))?,
            None => 8000,
        };
        let max_tokens = match var("OPENAI_MAX_TOKENS") {
            Some(v) => v.parse().with_context(|| format!("OPENAI_MAX_TOKENS must be a number, got {v:?}"))?,
            None => DEFAULT_MAX_TOKENS,
        };

        Ok(Self {
            host: var("HERSPACE_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            db_path: var("HERSPACE_DB_PATH").unwrap_or_else(|| "herspace.db".into()).into(),
            seed: var("HERSPACE_SEED").is_none_or(|v| !matches!(v.to_lowercase().as_str(), "0" | "false" | "no" | "off")),
            jwt: JwtConfig {
                secret,
                access_ttl: Duration::minutes(bounded("HERSPACE_ACCESS_TOKEN_MINUTES", 60, MAX_ACCESS_TOKEN_MINUTES)?),
                refresh_ttl: Duration::days(bounded("HERSPACE_REFRESH_TOKEN_DAYS", 7, MAX_REFRESH_TOKEN_DAYS)?),
            },
            chat: ChatConfig {
                api_key: var("OPENAI_API_KEY"),
                base_url: var("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into()),
                model: var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into()),
                max_tokens,
            },
        })
    }
}
