use tracing_subscriber::EnvFilter;

use bloco_radar::api;
use bloco_radar::config::Config;
use bloco_radar::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!("Data directory: {}", config.data_dir.display());
    tracing::info!("Reference zone: UTC{:+}", config.utc_offset_hours);
    match &config.geocoder.base_url {
        Some(url) => tracing::info!("Geocoder: {url}"),
        None => tracing::info!("Geocoder disabled"),
    }

    let state = AppState::new(config.clone())?;
    state.refresher.spawn_periodic(config.refresh_interval_secs);

    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
