use anyhow::Context;
use storage::Database;
use tokio::net::TcpListener;
use utoipa::OpenApi;

mod config;
mod error;
mod features;
mod routes;

use config::Config;

#[derive(OpenApi)]
#[openapi(
    paths(
        features::health::handlers::health,
        features::scores::handlers::submit_score,
        features::scores::handlers::recent_scores,
        features::leaderboard::handlers::get_leaderboard,
    ),
    components(
        schemas(
            storage::dto::score::SubmitScoreRequest,
            storage::models::Score,
            storage::models::LeaderboardEntry,
            storage::health::HealthStatus,
            storage::ranking::Aggregate,
            storage::ranking::Direction,
        )
    ),
    tags(
        (name = "scores", description = "Score submission and recent results"),
        (name = "leaderboard", description = "Ranked best results per user"),
        (name = "health", description = "Liveness probing"),
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting scoreboard API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!(
        "Configuration loaded: store at {}, pool {}..={}, ranking {}",
        config.store.target.redacted(),
        config.store.pool.min_connections,
        config.store.pool.max_connections,
        config.store.ranking
    );

    let db = Database::new(&config.store).context("Failed to initialize score store")?;

    if !db.bootstrap_schema().await {
        tracing::warn!("Starting without a confirmed schema; /health reports degraded until it is in place");
    }

    let bind_address = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    tracing::info!("Starting server at http://{}", bind_address);

    axum::serve(listener, routes::router(db.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Shutting down");
    db.close().await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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
}
