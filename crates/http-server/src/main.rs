use crate::core::{AppConfig, AppState};
use dotenvy::dotenv;
use relay::{providers, Relay, RelayConfig};
use std::net::SocketAddr;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

// Declare the modules we created.
mod api;
mod core;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from a .env file.
    dotenv().ok();
    // Use a JSON logger for production-ready structured logging
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // --- Configuration ---
    let relay_config = match RelayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return Err(e.into());
        }
    };
    info!(
        provider = relay_config.email.name(),
        model = %relay_config.completion.model,
        mode = ?relay_config.mode,
        "Configuration loaded."
    );

    // --- Outbound clients ---
    // One connection pool shared by the completion and email clients.
    let http_client = reqwest::Client::new();
    let completion =
        providers::build_completion_provider(&relay_config.completion, http_client.clone());
    let email_sender = providers::build_email_sender(&relay_config.email, http_client);

    // --- Shared Application State (for Axum) ---
    let app_state = AppState {
        relay: Relay::new(&relay_config, completion, email_sender),
        config: AppConfig {
            expose_error_trace: relay_config.expose_error_trace,
        },
    };

    let app = api::router(app_state);

    // --- Start HTTP Server ---
    // Bind to 0.0.0.0 to be reachable in a container
    let addr = SocketAddr::from(([0, 0, 0, 0], relay_config.port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            info!("HTTP Server listening on {}", addr);
            listener
        }
        Err(e) => {
            error!("Failed to bind to address {}: {}", addr, e);
            return Err(e.into());
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
    }
    info!("HTTP Server stopped.");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}
