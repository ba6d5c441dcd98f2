//! Application configuration from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

use tracing::warn;

use crate::places::PlacesConfig;
use crate::search::{DEFAULT_CATEGORY, DEFAULT_QUERY, SearchConfig};

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Error loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid BIND_ADDR {value:?}: {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

/// Runtime settings.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Handed to map clients through `/map/config`.
    pub maps_api_key: String,
    /// Sent with every search and detail request.
    pub places_api_key: String,
    pub bind_addr: SocketAddr,
    /// Overrides the production Places endpoint.
    pub places_base_url: Option<String>,
    /// Serve fixtures from this JSON file instead of calling the API.
    pub mock_file: Option<PathBuf>,
    /// Type tag a place must carry to count as a station.
    pub category: String,
    /// Free-text query sent with each area search.
    pub query: String,
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve variable names. Empty values count as
    /// unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mock_file = get("PLACES_MOCK_FILE").map(PathBuf::from);

        let maps_api_key = get("API_KEY_MAPS").unwrap_or_else(|| {
            warn!("API_KEY_MAPS not set. Map clients will not be able to load tiles.");
            String::new()
        });
        let places_api_key = get("API_KEY_PLACES").unwrap_or_else(|| {
            if mock_file.is_none() {
                warn!("API_KEY_PLACES not set. Places API calls will fail.");
            }
            String::new()
        });

        let bind = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind
            .parse()
            .map_err(|source| ConfigError::InvalidBindAddr {
                value: bind.clone(),
                source,
            })?;

        Ok(Self {
            maps_api_key,
            places_api_key,
            bind_addr,
            places_base_url: get("PLACES_BASE_URL"),
            mock_file,
            category: get("PLACES_CATEGORY").unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            query: get("PLACES_QUERY").unwrap_or_else(|| DEFAULT_QUERY.to_string()),
        })
    }

    /// Search settings with the configured category and query.
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig::default()
            .with_category(&self.category)
            .with_query(&self.query)
    }

    /// Client settings for the live Places API.
    pub fn places_config(&self) -> PlacesConfig {
        let config = PlacesConfig::new(&self.places_api_key);
        match &self.places_base_url {
            Some(url) => config.with_base_url(url),
            None => config,
        }
    }
}
