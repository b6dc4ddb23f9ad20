//! Lending client runner
//!
//! Restores the session and loads the catalog once, logging what it finds.

use lending_client::{config::AppConfig, logging, services::catalog::ViewState, LendingClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init(&config.logging);

    tracing::info!("Starting lending client v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Library server: {}", config.api.base_url);

    let client = LendingClient::from_config(config)?;
    let services = &client.services;

    let session = services.session.snapshot();
    if session.has_token() {
        tracing::info!("Found a stored credential; profile will load on next login or refresh");
    } else {
        tracing::info!("No stored credential, browsing anonymously");
    }

    if let Err(e) = services.catalog.initial_load().await {
        tracing::error!("Catalog unavailable: {}", e);
    }

    let catalog = services.catalog.snapshot();
    match catalog.view {
        ViewState::Content => {
            for category in &catalog.categories {
                tracing::info!("Category {}: {}", category.id, category.title);
            }
            tracing::info!(
                "{} books, {} currently available",
                catalog.books.len(),
                catalog.books.iter().filter(|b| b.is_available()).count()
            );
        }
        ViewState::Error(message) => tracing::warn!("{}", message),
        ViewState::Loading => {}
    }

    Ok(())
}
