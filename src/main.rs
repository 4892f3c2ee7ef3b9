use anyhow::{Context, Result};
use axum::{extract::FromRef, Router};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use crate::{config::Settings, stock_api::StockApiClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, fmt};

// Declare modules
mod config;
mod error;
mod facets;
mod models;
mod normalize;
mod report;
mod routes;
mod search;
mod stock_api;

// Shared state handed to every handler
#[derive(Clone, FromRef)]
struct AppState {
    settings: Arc<Settings>,
    stock_api: StockApiClient,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file first. Ignore errors (e.g., file not found)
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "stock_search=info,tower_http=info".into()))
        .with(fmt::layer())
        .init();

    tracing::info!("Stock search server starting...");

    // Load configuration
    let settings = match Settings::new() {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to load configuration: {:#}", e);
            return Err(e);
        }
    };
    tracing::info!(
        country = %settings.country,
        base_url = %settings.base_url,
        api_key = %settings.masked_key(),
        "Configuration loaded"
    );
    let shared_settings = Arc::new(settings);

    // One HTTP client for the whole process
    let http_client = Arc::new(stock_api::build_http_client(&shared_settings)?);
    let app_state = AppState {
        settings: shared_settings.clone(),
        stock_api: StockApiClient::new(http_client, shared_settings.clone()),
    };

    let addr: SocketAddr = app_state
        .settings
        .server_address
        .parse()
        .with_context(|| format!("Invalid server address format: {}", shared_settings.server_address))?;

    let app: Router = routes::create_router(app_state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to address {}", addr))?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
