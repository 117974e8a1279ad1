use anyhow::Result;
use std::sync::Arc;

use risk_dashboard::{config::Config, logging, routes, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    logging::init_logging()?;

    // Load configuration
    let config = Config::new()?;
    let addr = config.bind_addr;
    tracing::info!(
        watchlist = %config.watchlist.path.display(),
        indebtedness = %config.indebtedness.path.display(),
        "configured report sources"
    );

    // Build our application state
    let state = Arc::new(AppState::new(config));

    let app = routes::app(state);

    // Run it
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
