//! PIX Checkout - configurable checkout storefront service

use anyhow::Result;
use pix_checkout::api::{self, AppState};
use pix_checkout::config::AppConfig;
use pix_checkout::store::{MemoryStore, PgStore, Store};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => {
            let pg = PgStore::connect(url, config.max_connections).await?;
            pg.migrate().await?;
            Arc::new(pg)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; running on the in-memory store, data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let app = api::router(AppState::new(store));
    tracing::info!("🚀 PIX Checkout listening on 0.0.0.0:{}", config.port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?, app).await?;
    Ok(())
}
