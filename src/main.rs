use anyhow::Result;

use proxy_auth::auth::{HttpAuthenticator, TokenRefresher};
use proxy_auth::config::{self, LogFormat};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (for log level)
    let config = config::Config::load()?;
    config.validate()?;

    // Initialize logging with a configured level
    let log_level = config.log_level.to_lowercase();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    match config.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }

    tracing::info!("🚀 Proxy auth starting...");
    tracing::info!(
        "Gateway configured: {}://{}{} (proxy id {})",
        config.gateway_protocol,
        config.gateway_host,
        config.auth_path,
        config.proxy_id
    );

    let authenticator = HttpAuthenticator::new(&config.endpoint(), config.http_request_timeout)?;
    tracing::info!("✅ HTTP authenticator ready: {}", authenticator.url());

    let refresher = TokenRefresher::new(
        authenticator,
        config.credentials(),
        config.retry_policy(),
    );
    let handle = refresher.spawn();

    shutdown_signal().await;

    if let Err(e) = handle.shutdown().await {
        tracing::error!("Token refresher did not stop cleanly: {}", e);
    }

    tracing::info!("👋 Shutdown complete");

    Ok(())
}

/// Handle graceful shutdown signal
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown...");
        },
    }
}
