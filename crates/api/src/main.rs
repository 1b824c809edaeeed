use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bastion_api::config::ServerConfig;
use bastion_api::notifications::ChangeNotifier;
use bastion_api::router::build_app_router;
use bastion_api::state::AppState;
use bastion_api::ws;

/// How long each background service gets to drain during shutdown.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = ServerConfig::from_env().context("Invalid server configuration")?;

    // --- Tracing ---
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter()));
    if config.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
    tracing::info!(
        host = %config.host,
        port = config.port,
        env = %config.node_env,
        model_summaries = config.openai_api_key.is_some(),
        "Loaded server configuration",
    );

    // --- Database ---
    let pool = bastion_db::create_pool(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection pool created");

    bastion_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    tracing::info!("Database health check passed");

    bastion_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    // --- App state ---
    let state = AppState::new(pool.clone(), config.clone());
    let collab = Arc::clone(&state.collab);
    let event_bus = Arc::clone(&state.event_bus);

    // Seed the playbook library in the background; health reports
    // `starting` until this settles.
    let readiness = Arc::clone(&state.readiness);
    let seed_pool = pool.clone();
    tokio::spawn(async move {
        match bastion_db::seed::ensure_library(&seed_pool).await {
            Ok(report) => readiness.mark_ready(report).await,
            Err(e) => {
                tracing::error!(error = %e, "Content library seeding failed");
                readiness.mark_failed(e.to_string()).await;
            }
        }
    });

    // --- Event services ---
    let persistence_handle = tokio::spawn(bastion_events::ActivityPersistence::run(
        pool.clone(),
        event_bus.subscribe(),
    ));
    let notifier_handle =
        tokio::spawn(ChangeNotifier::new(Arc::clone(&collab)).run(event_bus.subscribe()));
    tracing::info!("Event services started (activity persistence, change notifier)");

    // --- Heartbeat ---
    let heartbeat_cancel = CancellationToken::new();
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&collab), heartbeat_cancel.clone());

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    tracing::info!(%addr, "Starting server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    heartbeat_cancel.cancel();
    let _ = tokio::time::timeout(DRAIN_TIMEOUT, heartbeat_handle).await;
    tracing::info!("Heartbeat task stopped");

    // Dropping the last bus handle closes the broadcast channel, which ends
    // the persistence and notifier loops.
    drop(event_bus);
    let _ = tokio::time::timeout(DRAIN_TIMEOUT, persistence_handle).await;
    let _ = tokio::time::timeout(DRAIN_TIMEOUT, notifier_handle).await;
    tracing::info!("Event services shut down");

    let ws_count = collab.connections().connection_count().await;
    tracing::info!(ws_count, "Closing remaining WebSocket connections");
    collab.connections().shutdown_all().await;

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
