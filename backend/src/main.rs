use axum::{
    routing::{get, post},
    Router,
};
use chrono::Duration;
use cupid::db::{DatabaseConfig, PgMatchStore, PgUserStore};
use cupid::handlers::{self, AppState};
use cupid::{Config, EngineConfig, MatchEngine, get_db_pool, utils};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use axum::http::{HeaderValue, Method};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    utils::init_logging();

    let config = Config::from_env()?;
    let db_config = DatabaseConfig::from_env()?;
    let pool = get_db_pool(&db_config).await?;

    // Run migrations
    cupid::db::migrations::run_migrations(&pool).await?;

    let port = config.port;
    let app = create_router(pool, config);

    let listener = tokio::net::TcpListener::bind(&format!("0.0.0.0:{}", port)).await?;
    tracing::info!("Server running on port {}", port);

    axum::serve(listener, app).await?;

    Ok(())
}

fn create_router(pool: sqlx::PgPool, config: Config) -> Router {
    let cors_layer = create_cors_layer(&config);

    let users = Arc::new(PgUserStore::new(pool.clone()));
    let matches = Arc::new(PgMatchStore::new(pool));
    let engine = Arc::new(MatchEngine::new(
        users.clone(),
        matches.clone(),
        EngineConfig {
            match_ttl: Duration::hours(config.match_ttl_hours),
            ..EngineConfig::default()
        },
    ));
    let state = AppState {
        config,
        users,
        matches,
        engine,
    };

    Router::new()
        .route("/health", get(health_check))
        // Admin surface
        .route("/api/admin/do_match", post(handlers::admin::do_match))
        .route("/api/admin/activate", post(handlers::admin::activate_user))
        .route(
            "/api/admin/generate_random_user",
            post(handlers::admin::generate_random_user),
        )
        // Match surface
        .route("/api/match", get(handlers::matches::get_match))
        .route("/api/match/propose", post(handlers::matches::propose_date))
        .route("/api/match/accept", post(handlers::matches::accept_proposal))
        .route("/api/match/unmatch", post(handlers::matches::unmatch))
        .layer(cors_layer)
        .with_state(state)
}

fn create_cors_layer(_config: &Config) -> CorsLayer {
    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .allow_credentials(false);

    // Check if ALLOWED_ORIGINS environment variable is set for multiple domains
    if let Ok(cors_origins) = std::env::var("ALLOWED_ORIGINS") {
        let origins: Vec<HeaderValue> = cors_origins
            .split(',')
            .filter_map(|origin| {
                let trimmed = origin.trim();
                if !trimmed.is_empty() {
                    trimmed.parse().ok()
                } else {
                    None
                }
            })
            .collect();

        if !origins.is_empty() {
            cors = cors.allow_origin(origins);
        } else {
            // Fallback to permissive if parsing fails
            cors = cors.allow_origin(Any);
        }
    } else {
        // Default to permissive for development
        cors = cors.allow_origin(Any);
    }

    cors
}

async fn health_check() -> &'static str {
    "OK"
}
