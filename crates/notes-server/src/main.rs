//! Entry point for the notes-server binary.

use std::sync::Arc;

use notes_server::{
    app::build_app,
    auth::TokenVerifier,
    config::{LogFormat, ServerConfig, StoreBackend},
    state::AppState,
};
use notes_store::{MemoryNoteRepository, NoteRepository, PgNoteRepository, StoreConfig};
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = ServerConfig::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level, config.log_format);

    tracing::info!("Starting notes-server");
    tracing::info!(
        port = config.port,
        log_level = %config.log_level,
        jwks_url = %config.auth.jwks_url,
        "Configuration loaded"
    );

    let repository: Arc<dyn NoteRepository> = match config.store_backend {
        StoreBackend::Postgres => {
            let store_config = StoreConfig::from_env()?;
            let repository = PgNoteRepository::connect(store_config).await?;
            tracing::info!("Connected to database");
            Arc::new(repository)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; notes are lost on shutdown");
            Arc::new(MemoryNoteRepository::new())
        }
    };

    // Build application state
    let verifier = TokenVerifier::new(&config.auth);
    let state = AppState::new(repository, verifier);

    let app = build_app(state, &config);

    // Create listener
    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initialize the tracing subscriber.
fn init_tracing(log_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().flatten_event(true))
            .init(),
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
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
