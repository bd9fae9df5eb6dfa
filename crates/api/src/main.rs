use std::net::SocketAddr;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tenantwatch_api::background::view_eviction;
use tenantwatch_api::config::Settings;
use tenantwatch_api::router::build_app_router;
use tenantwatch_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "tenantwatch_api=debug,tenantwatch_db=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let settings = Settings::from_env().expect("Invalid configuration");
    tracing::info!(
        host = %settings.server.host,
        port = %settings.server.port,
        version = %settings.application_version,
        mail_configured = settings.mail.is_some(),
        "Loaded configuration"
    );

    // --- Database ---
    let pool = tenantwatch_db::create_pool(&settings.postgres)
        .await
        .expect("Failed to connect to database");
    tracing::info!(postgres = ?settings.postgres, "Database connection pool created");

    tenantwatch_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    // --- App state ---
    let state = AppState::new(pool.clone(), &settings);

    // --- View eviction ---
    let eviction_cancel = CancellationToken::new();
    let eviction_handle = tokio::spawn(view_eviction::run(
        state.views.clone(),
        view_eviction::DEFAULT_MAX_IDLE,
        eviction_cancel.clone(),
    ));

    // --- Router ---
    let app = build_app_router(state, &settings.server);

    // --- Start server ---
    let addr = SocketAddr::new(
        settings.server.host.parse().expect("Invalid HOST address"),
        settings.server.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    eviction_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), eviction_handle).await;
    tracing::info!("View eviction job stopped");

    pool.close().await;
    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl-C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
