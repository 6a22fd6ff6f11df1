//! noetic-api - HTTP API server for the noetic knowledge backend

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use noetic_api::config::AppConfig;
use noetic_api::handlers::{ACCESS_KEY_HEADER, SECRET_KEY_HEADER};
use noetic_api::services::{
    AdminService, ApiKeyService, AuthService, IdentityStores, KnowledgeService, LogNotifier,
    RedisSessionCache, WebhookNotifier,
};
use noetic_api::{router, AppState};
use noetic_core::{EmbeddingBackend, Notifier, SessionCache};
use noetic_crypto::{AccessTokenIssuer, Argon2Hasher};
use noetic_db::Database;
use noetic_inference::OpenAIBackend;

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("Invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(ACCESS_KEY_HEADER),
            HeaderName::from_static(SECRET_KEY_HEADER),
        ])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
    //   RUST_LOG    - standard env filter (default: "noetic_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "noetic_api=debug,noetic_db=info,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    // Optionally create a file appender with daily rotation
    let _file_guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("noetic-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false)); // no ANSI in files by default
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        // Console-only output
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    let config = AppConfig::from_env();

    // Connect to database
    info!("Connecting to database...");
    let db = Database::connect_with_config(&config.database_url, config.pool_config()).await?;
    info!("Database connected");

    // Run pending database migrations on startup
    info!("Running database migrations...");
    db.migrate().await?;
    info!("Database migrations complete");

    // Session cache: validate now, connect eagerly so a bad REDIS_URL fails fast
    let cache = Arc::new(RedisSessionCache::new(&config.redis_url)?);
    cache.connect().await?;

    let embedder = Arc::new(OpenAIBackend::from_env()?);
    info!(
        model = embedder.model_name(),
        dimension = embedder.dimension(),
        "Embedding backend initialized"
    );

    let notifier: Arc<dyn Notifier> = match &config.notify_webhook_url {
        Some(url) => {
            info!(webhook = %url, signed = config.notify_webhook_secret.is_some(), "Notifications via webhook");
            Arc::new(WebhookNotifier::new(
                url.clone(),
                config.notify_webhook_secret.clone(),
            )?)
        }
        None => {
            warn!("NOTIFY_WEBHOOK_URL not set, notifications are only logged");
            Arc::new(LogNotifier)
        }
    };

    let session_cache: Arc<dyn SessionCache> = cache.clone();
    let issuer =
        AccessTokenIssuer::new(config.jwt_secret.as_bytes(), config.access_token_lifetime());

    let auth = AuthService::new(
        IdentityStores {
            users: db.users.clone(),
            credentials: db.credentials.clone(),
            providers: db.auth_providers.clone(),
        },
        session_cache.clone(),
        notifier,
        issuer.clone(),
        Argon2Hasher::default(),
        config.auth_settings(),
    );
    let knowledge = KnowledgeService::new(db.knowledge.clone(), embedder, db.vectors.clone())
        .with_collection(config.vector_collection.clone());
    let admin = AdminService::new(
        db.users.clone(),
        db.knowledge.clone(),
        db.vectors.clone(),
        session_cache,
    )
    .with_collection(knowledge.collection());
    let api_keys = ApiKeyService::new(db.api_keys.clone(), db.users.clone(), issuer);

    let state = AppState {
        auth,
        knowledge,
        admin,
        api_keys,
    };

    let app = router(state).layer(cors_layer(&config.allowed_origins));

    // Start server
    let addr: SocketAddr = config.bind_address().parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    cache.close().await;
    db.close().await;
    info!("Server stopped");

    Ok(())
}
