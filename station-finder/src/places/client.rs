//! Places API HTTP client.
//!
//! Provides async methods for the Places API (New) autocomplete and place
//! details endpoints. Handles authentication, concurrency limiting, status
//! mapping and conversion to domain types.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tokio::sync::Semaphore;

use crate::domain::{PlaceCandidate, PlaceDetail, PlaceId};
use crate::search::{AreaSearch, PlacesProvider};

use super::convert::{convert_autocomplete, convert_place, rectangle_for};
use super::error::PlacesError;
use super::types::{AutocompleteRequest, AutocompleteResponse, PlaceResponse};

/// Default base URL for the Places API.
const DEFAULT_BASE_URL: &str = "https://places.googleapis.com";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 8;

/// Fields requested from the place details endpoint.
pub const DETAIL_FIELD_MASK: &str = "id,displayName,location,formattedAddress,\
nationalPhoneNumber,internationalPhoneNumber,regularOpeningHours,websiteUri,rating,\
priceLevel,userRatingCount,businessStatus,types";

/// Fields requested from autocomplete.
const AUTOCOMPLETE_FIELD_MASK: &str =
    "suggestions.placePrediction.placeId,suggestions.placePrediction.text,suggestions.placePrediction.types";

/// Configuration for the Places client.
#[derive(Debug, Clone)]
pub struct PlacesConfig {
    /// API key sent as `X-Goog-Api-Key`
    pub api_key: String,
    /// Base URL for the API (defaults to production)
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl PlacesConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Places API client.
///
/// Uses a semaphore to limit concurrent requests and avoid rate limiting.
#[derive(Debug, Clone)]
pub struct PlacesClient {
    http: reqwest::Client,
    base_url: String,
    semaphore: Arc<Semaphore>,
}

impl PlacesClient {
    /// Create a new Places client with the given configuration.
    pub fn new(config: PlacesConfig) -> Result<Self, PlacesError> {
        let mut headers = HeaderMap::new();

        let api_key = HeaderValue::from_str(&config.api_key).map_err(|_| {
            PlacesError::InvalidConfig("API key is not a valid header value".to_string())
        })?;
        headers.insert(HeaderName::from_static("x-goog-api-key"), api_key);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    /// Search for places inside a rectangle.
    ///
    /// Returns an empty list (not an error) when nothing matched.
    pub async fn autocomplete(
        &self,
        search: &AreaSearch,
    ) -> Result<Vec<PlaceCandidate>, PlacesError> {
        let _permit = self.permit().await?;

        let url = format!("{}/v1/places:autocomplete", self.base_url);
        let body = AutocompleteRequest {
            input: search.query.clone(),
            location_restriction: rectangle_for(&search.bounds),
            included_primary_types: vec![search.category.clone()],
        };

        let response = self
            .http
            .post(&url)
            .header("X-Goog-FieldMask", AUTOCOMPLETE_FIELD_MASK)
            .json(&body)
            .send()
            .await?;

        let body = check_status(response).await?.text().await?;

        let parsed: AutocompleteResponse = serde_json::from_str(&body).map_err(|e| {
            PlacesError::Json {
                message: e.to_string(),
                body: Some(body.chars().take(500).collect()),
            }
        })?;

        Ok(convert_autocomplete(parsed))
    }

    /// Get the full record for one place.
    pub async fn place_details(&self, id: &PlaceId) -> Result<PlaceDetail, PlacesError> {
        let _permit = self.permit().await?;

        let url = format!("{}/v1/places/{}", self.base_url, id.as_str());

        let response = self
            .http
            .get(&url)
            .header("X-Goog-FieldMask", DETAIL_FIELD_MASK)
            .send()
            .await?;

        let body = check_status(response).await?.text().await?;

        let place: PlaceResponse = serde_json::from_str(&body).map_err(|e| PlacesError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })?;

        convert_place(place).map_err(|e| PlacesError::Json {
            message: e.to_string(),
            body: None,
        })
    }

    async fn permit(&self) -> Result<tokio::sync::SemaphorePermit<'_>, PlacesError> {
        self.semaphore
            .acquire()
            .await
            .map_err(|_| PlacesError::Unavailable("request limiter closed".to_string()))
    }
}

/// Map non-success statuses to errors, passing successful responses through.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, PlacesError> {
    let status = response.status();

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(PlacesError::Unauthorized);
    }

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(PlacesError::RateLimited);
    }

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(PlacesError::PlaceNotFound);
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(PlacesError::Api {
            status: status.as_u16(),
            message: body,
        });
    }

    Ok(response)
}

impl PlacesProvider for PlacesClient {
    async fn autocomplete(&self, search: &AreaSearch) -> Result<Vec<PlaceCandidate>, PlacesError> {
        PlacesClient::autocomplete(self, search).await
    }

    async fn place_details(&self, id: &PlaceId) -> Result<PlaceDetail, PlacesError> {
        PlacesClient::place_details(self, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = PlacesConfig::new("test-key")
            .with_base_url("http://localhost:8080")
            .with_max_concurrent(10)
            .with_timeout(60);

        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.max_concurrent, 10);
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn config_defaults() {
        let config = PlacesConfig::new("test-key");

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.max_concurrent, DEFAULT_MAX_CONCURRENT);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn client_creation() {
        let client = PlacesClient::new(PlacesConfig::new("test-key"));
        assert!(client.is_ok());
    }

    #[test]
    fn rejects_unprintable_key() {
        match PlacesClient::new(PlacesConfig::new("bad\nkey")) {
            Err(PlacesError::InvalidConfig(message)) => assert!(message.contains("API key")),
            Err(other) => panic!("expected InvalidConfig, got: {other:?}"),
            Ok(_) => panic!("client built with an unprintable key"),
        }
    }

    #[test]
    fn field_mask_requests_everything_converted() {
        for field in ["location", "types", "priceLevel", "businessStatus"] {
            assert!(DETAIL_FIELD_MASK.contains(field), "missing {field}");
        }
    }
}
