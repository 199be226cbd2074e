mod api;
mod config;
mod logging;
mod services;

use std::sync::Arc;

use color_eyre::Result;
use database_adapter::db::PostgresStore;
use domain::core::Tracker;
use domain::store::PortfolioStore;
use in_memory_adapter::InMemoryStore;

use crate::services::TrackerHandle;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    // Initialize logging
    logging::init()?;
    tracing::info!("Starting {} API server", *config::PROJECT_NAME);

    let store: Arc<dyn PortfolioStore> = if std::env::var("DATABASE_URL").is_ok() {
        tracing::info!("Using Postgres store");
        Arc::new(PostgresStore::connect().await?)
    } else {
        tracing::info!("DATABASE_URL not set, serving the in-memory demo dataset");
        Arc::new(InMemoryStore::with_demo_data())
    };

    let tracker = Tracker::new(store);
    let app = api::create_api(TrackerHandle::new(tracker));

    let addr = config::bind_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server running on http://{addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
