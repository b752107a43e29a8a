//! intake-server: patient registration HTTP server binary entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use intake_server::config::Config;
use intake_server::{AppState, ai, email};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Load configuration
    let config = Config::from_env();

    // Log startup info
    let mailer: Option<Arc<dyn email::Mailer>> = match &config.resend_api_key {
        Some(key) => {
            tracing::info!("Resend API key configured, email delivery enabled");
            Some(Arc::new(email::ResendMailer::new(
                key.clone(),
                config.email_from.clone(),
            )))
        }
        None => {
            tracing::warn!("RESEND_API_KEY not set, email delivery disabled");
            None
        }
    };
    let extractor = match &config.anthropic_api_key {
        Some(key) => {
            tracing::info!("Anthropic API key configured, card extraction enabled");
            Some(ai::CardExtractor::new(key.clone()))
        }
        None => {
            tracing::warn!("ANTHROPIC_API_KEY not set, card extraction disabled");
            None
        }
    };
    tracing::info!("Rate limiting: {} requests/second", config.rate_limit_rps);
    tracing::info!("Registration inbox: {}", config.practice_email);

    // Build application
    let state = AppState {
        config: Arc::new(config),
        mailer,
        extractor,
    };
    let bind_address = state.config.bind_address.clone();
    let app = intake_server::build_app(state);

    // Start server
    let addr: SocketAddr = bind_address.parse().expect("Invalid bind address");
    tracing::info!("Starting registration server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    tracing::info!("Server shutdown complete");
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
