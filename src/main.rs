use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use waypoint::auth::exchange::{HttpIdentityExchange, IdentityExchange};
use waypoint::lock::{LocalLocks, LockProvider, RedisLocks};
use waypoint::notify::{FcmPush, NoopPush, PushSender};
use waypoint::{api, config::Config, expiration, storage::Database, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_span_list(false),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    info!(version = env!("CARGO_PKG_VERSION"), "waypoint starting");

    // Load configuration
    let config = Config::load()?;

    // Initialize database
    let db = Database::open(&config.node.data_dir)?;
    info!("Database opened at: {}", config.node.data_dir);

    // Shared HTTP client for identity exchange and push delivery
    let http_client = reqwest::Client::builder()
        .pool_idle_timeout(Duration::from_secs(30))
        .timeout(Duration::from_secs(5))
        .build()?;

    // Named lock backend
    let locks: Arc<dyn LockProvider> = match &config.locks.redis_url {
        Some(url) => {
            let lease = Duration::from_secs(config.locks.lease_seconds);
            let locks = RedisLocks::connect(url, lease).await?;
            info!("Using redis named locks");
            Arc::new(locks)
        }
        None => {
            info!("No REDIS_URL configured; using in-process locks (single-node mode)");
            Arc::new(LocalLocks::new())
        }
    };

    // Push delivery
    let push: Arc<dyn PushSender> = match &config.push.server_key {
        Some(key) => Arc::new(FcmPush::new(
            http_client.clone(),
            config.push.endpoint.clone(),
            key.clone(),
        )),
        None => {
            info!("No FCM_SERVER_KEY configured; push delivery disabled");
            Arc::new(NoopPush)
        }
    };

    let exchange: Arc<dyn IdentityExchange> = Arc::new(HttpIdentityExchange::new(http_client));

    // Create shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        exchange,
        locks,
        push,
    });

    // Start background tasks
    let expiration_handle = expiration::start_expiration_cleaner(Arc::clone(&state));

    // Build and start the HTTP server
    let app = api::create_router(Arc::clone(&state));
    let listener = tokio::net::TcpListener::bind(&config.node.bind_address).await?;
    info!("Listening on: {}", config.node.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Cleanup: abort background tasks
    info!("Shutting down background tasks");
    expiration_handle.abort();

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
