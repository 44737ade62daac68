//! Server inventory assistant HTTP server.
//!
//! Usage: `sia-assistant [config.toml]`. Environment variables override
//! the file; with neither, serves the built-in sample inventory.

use std::path::PathBuf;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use sia_assistant::completion;
use sia_assistant::config::{AssistantConfig, InventoryBackend};
use sia_assistant::routes::build_router;
use sia_assistant::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "sia-assistant starting");

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = AssistantConfig::load(config_path.as_deref())?;

    if config.inventory.backend == InventoryBackend::Memory {
        tracing::warn!("no inventory backend configured, serving built-in sample data");
    }
    let inventory = config.inventory.build()?;
    let completion = completion::from_config(&config.completion);
    tracing::info!(
        inventory = inventory.backend_name(),
        completion = completion.provider_name(),
        "backends ready"
    );

    let state = AppState::with_backends(inventory, completion, &config.assistant_options());
    let app = build_router(state);

    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}
