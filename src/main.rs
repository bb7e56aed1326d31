use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use attendly::gamification::config::GamificationConfig;
use attendly::gamification::repository::{InMemoryParticipantLedger, PostgresParticipantLedger};
use attendly::shared::AppState;
use attendly::stats::repository::{InMemoryStatsRepository, PostgresStatsRepository};
use attendly::build_router;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "attendly=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting event engagement server");

    let config = Arc::new(GamificationConfig::default());

    // Repositories are injected behind trait objects: Postgres when a
    // DATABASE_URL is configured, in-memory otherwise
    let app_state = match std::env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = sqlx::PgPool::connect(&database_url)
                .await
                .expect("Failed to connect to database");
            info!("Using PostgreSQL repositories");
            AppState::new(
                Arc::new(PostgresParticipantLedger::new(pool.clone())),
                Arc::new(PostgresStatsRepository::new(pool)),
                config,
            )
        }
        Err(_) => {
            info!("DATABASE_URL not set, using in-memory repositories");
            AppState::new(
                Arc::new(InMemoryParticipantLedger::new()),
                Arc::new(InMemoryStatsRepository::new()),
                config,
            )
        }
    };

    let app = build_router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .expect("Failed to bind listener");
    info!("Server running on http://localhost:{}", port);
    axum::serve(listener, app).await.expect("Server error");
}
