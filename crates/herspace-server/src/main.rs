mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use herspace_api::auth::{AppState, AppStateInner};
use herspace_api::chat::ChatClient;

use crate::config::Config;

const DEFAULT_LOG_FILTER: &str = "herspace=debug,herspace_api=debug,herspace_db=info,tower_http=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("FATAL: {e:#}");
            eprintln!("       Set HERSPACE_JWT_SECRET to a random string in your .env file and restart.");
            std::process::exit(1);
        }
    };

    // Init database
    let db = herspace_db::Database::open(&config.db_path)?;
    if config.seed {
        herspace_db::seed::seed_static_content(&db, chrono::Utc::now())?;
    }

    let chat = ChatClient::new(config.chat.clone())?;
    if !chat.is_configured() {
        warn!("OPENAI_API_KEY not set; Dagi and tarot will answer from built-in text");
    }

    let state: AppState = Arc::new(AppStateInner { db, jwt: config.jwt.clone(), chat });

    let app = herspace_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("HerSpace server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
