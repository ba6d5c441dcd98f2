//! Caching layer for place details.
//!
//! Place IDs are stable, so a detail fetched for one search generation is
//! still good for the next one when the user has only moved a few meters.
//! Caching details avoids refetching every candidate on each location
//! update. Autocomplete results depend on the exact search rectangle and
//! are never cached.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::trace;

use crate::domain::{PlaceCandidate, PlaceDetail, PlaceId};
use crate::places::PlacesError;
use crate::search::{AreaSearch, PlacesProvider};

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(10 * 60),
            max_capacity: 1000,
        }
    }
}

/// Places provider with detail caching.
///
/// Wraps any `PlacesProvider`. Only successful lookups are cached, so a
/// place whose fetch failed is retried on the next generation.
pub struct CachedPlacesClient<P> {
    inner: P,
    details: MokaCache<PlaceId, Arc<PlaceDetail>>,
}

impl<P: PlacesProvider> CachedPlacesClient<P> {
    /// Create a new cached client.
    pub fn new(inner: P, config: &CacheConfig) -> Self {
        let details = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { inner, details }
    }

    /// Access the underlying provider for operations that bypass cache.
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Get cache statistics.
    pub fn cache_entry_count(&self) -> u64 {
        self.details.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_cache(&self) {
        self.details.invalidate_all();
    }
}

impl<P: PlacesProvider> PlacesProvider for CachedPlacesClient<P> {
    async fn autocomplete(&self, search: &AreaSearch) -> Result<Vec<PlaceCandidate>, PlacesError> {
        self.inner.autocomplete(search).await
    }

    async fn place_details(&self, id: &PlaceId) -> Result<PlaceDetail, PlacesError> {
        // Try cache first
        if let Some(cached) = self.details.get(id).await {
            trace!(place_id = %id, "detail cache hit");
            return Ok(PlaceDetail::clone(&cached));
        }

        let detail = self.inner.place_details(id).await?;
        self.details
            .insert(id.clone(), Arc::new(detail.clone()))
            .await;

        Ok(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GeoPoint;
    use crate::places::MockPlacesClient;

    fn id(s: &str) -> PlaceId {
        PlaceId::parse(s).unwrap()
    }

    fn mock() -> MockPlacesClient {
        let coord = GeoPoint::new(43.70, -79.40).unwrap();
        MockPlacesClient::new(vec![
            PlaceDetail::new(id("A"), Some("Shell".into()), coord),
            PlaceDetail::new(id("B"), Some("Esso".into()), coord),
        ])
    }

    #[test]
    fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(600));
        assert_eq!(config.max_capacity, 1000);
    }

    #[tokio::test]
    async fn second_lookup_is_served_from_cache() {
        let cached = CachedPlacesClient::new(mock(), &CacheConfig::default());

        let first = cached.place_details(&id("A")).await.unwrap();
        let second = cached.place_details(&id("A")).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(cached.inner().detail_calls(), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let mock = mock();
        mock.fail_details_for(&id("B")).await;
        let cached = CachedPlacesClient::new(mock, &CacheConfig::default());

        assert!(cached.place_details(&id("B")).await.is_err());
        assert!(cached.place_details(&id("B")).await.is_err());
        assert_eq!(cached.inner().detail_calls(), 2);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let cached = CachedPlacesClient::new(mock(), &CacheConfig::default());

        cached.place_details(&id("A")).await.unwrap();
        cached.invalidate_cache();
        cached.place_details(&id("A")).await.unwrap();

        assert_eq!(cached.inner().detail_calls(), 2);
    }
}
