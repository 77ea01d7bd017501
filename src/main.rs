//! OpenSASE Cart - storefront cart session service

use anyhow::Result;
use opensase_cart::{api, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();

    let config = Config::from_env()?;
    let app = api::router(api::AppState::from_config(&config)?);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("OpenSASE Cart listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(&addr).await?, app).await?;
    Ok(())
}
