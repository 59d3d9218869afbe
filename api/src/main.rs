use anyhow::Context;
use posts_api::{
    AppState, Config, app,
    store::{MemoryPostStore, MongoPostStore},
};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    let state = match &config.mongo_uri {
        Some(uri) => AppState::new(
            MongoPostStore::connect(uri, &config.mongo_db)
                .await
                .context("failed to connect to MongoDB")?,
        ),
        None => {
            warn!("MONGO_URI not set, posts are kept in memory and lost on exit");
            AppState::new(MemoryPostStore::new())
        }
    };

    let router = app(state, &config);

    let listener = tokio::net::TcpListener::bind(&config.server_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server_addr))?;

    info!("Server running on http://{}", config.server_addr);
    info!("API Endpoints:");
    info!("  GET    /health           - Health check");
    info!("  GET    /posts            - List posts (?owner_id= to filter)");
    info!("  GET    /posts/{{id}}       - Get specific post");
    info!("  POST   /posts            - Create post");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
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
