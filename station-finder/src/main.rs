use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use station_finder::aggregator::Aggregator;
use station_finder::cache::{CacheConfig, CachedPlacesClient};
use station_finder::config::AppConfig;
use station_finder::location::LocationProvider;
use station_finder::places::{MockPlacesClient, PlacesClient};
use station_finder::search::PlacesProvider;
use station_finder::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("station_finder=info,tower_http=info")),
        )
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    let cache_config = CacheConfig::default();

    // Pick the places backend
    match &config.mock_file {
        Some(path) => {
            let mock = match MockPlacesClient::from_file(path) {
                Ok(mock) => mock,
                Err(e) => {
                    error!(path = %path.display(), error = %e, "Failed to load mock places");
                    std::process::exit(1);
                }
            };
            info!(path = %path.display(), "Serving places from fixture file");
            serve(CachedPlacesClient::new(mock, &cache_config), config).await;
        }
        None => {
            let client = match PlacesClient::new(config.places_config()) {
                Ok(client) => client,
                Err(e) => {
                    error!(error = %e, "Failed to create Places client");
                    std::process::exit(1);
                }
            };
            serve(CachedPlacesClient::new(client, &cache_config), config).await;
        }
    }
}

async fn serve<P: PlacesProvider + 'static>(provider: P, config: AppConfig) {
    let location = LocationProvider::new();
    let aggregator = Aggregator::new(Arc::new(provider), config.search_config());

    // Every position fix starts a new discovery generation
    let discovery = aggregator.clone();
    let fixes = location.subscribe();
    tokio::spawn(async move { discovery.run(fixes).await });

    let state = AppState::new(aggregator, location, config.maps_api_key.clone());
    let app = create_router(state).layer(TraceLayer::new_for_http());

    let listener = match tokio::net::TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %config.bind_addr, error = %e, "Failed to bind");
            std::process::exit(1);
        }
    };

    info!(addr = %config.bind_addr, category = %config.category, "Station finder listening");
    info!("  GET  /health                  - Health check");
    info!("  POST /location                - Report a position fix");
    info!("  POST /location/authorization  - Report location permission");
    info!("  GET  /stations                - Current station board");
    info!("  POST /stations/refresh        - Search again from the latest fix");
    info!("  GET  /stations/:place_id      - One station");
    info!("  GET  /map/config              - Map key and camera");

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
