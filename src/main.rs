//! Wallet Session - bearer sessions for wallet sign-in over a fail-open cache

use std::net::SocketAddr;

use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wallet_session::api::create_router;
use wallet_session::{AppState, Config};

/// Main entry point for the wallet session server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the cache store and authenticator
/// 4. Connect the cache; failure leaves it degraded, never aborts startup
/// 5. Serve HTTP until SIGINT/SIGTERM
/// 6. Disconnect the cache
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wallet_session=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting wallet session server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: default_ttl={}s, session_ttl={}s, port={}, key_prefix={:?}",
        config.cache.default_ttl,
        config.auth.session_ttl,
        config.server_port,
        config.cache.key_prefix
    );
    if config.auth.allow_unverified_identity {
        warn!("ALLOW_UNVERIFIED_IDENTITY is set; wallets can sign in without a signature");
    }

    let state = AppState::from_config(&config);
    if let Err(err) = state.cache.connect().await {
        error!(error = %err, "Cache unavailable, continuing in degraded mode");
    }

    let app = create_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.cache.disconnect().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
