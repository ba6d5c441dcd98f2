//! Parallel place-detail fan-out.
//!
//! Every candidate ID gets its own lookup. Lookups run concurrently (up to
//! a configured limit) and the batch completes only when all of them have
//! settled. Individual failures are collected rather than aborting the
//! batch.

use std::collections::HashSet;

use futures::FutureExt;
use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::domain::{PlaceDetail, PlaceId};
use crate::places::PlacesError;

use super::config::SearchConfig;
use super::provider::PlacesProvider;

/// One settled lookup.
type Lookup = (PlaceId, Result<PlaceDetail, PlacesError>);

/// Settled results of a detail batch.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// Successful lookups in completion order, deduplicated on place ID.
    pub details: Vec<PlaceDetail>,
    /// Lookups that failed or timed out.
    pub failures: Vec<(PlaceId, PlacesError)>,
}

impl FetchOutcome {
    /// Number of lookups that settled, successfully or not.
    pub fn settled(&self) -> usize {
        self.details.len() + self.failures.len()
    }

    /// Whether every lookup failed.
    pub fn all_failed(&self) -> bool {
        self.details.is_empty() && !self.failures.is_empty()
    }
}

/// Fetches details for a batch of place IDs.
pub struct DetailFetcher<'a, P: PlacesProvider> {
    provider: &'a P,
    config: &'a SearchConfig,
}

impl<'a, P: PlacesProvider> DetailFetcher<'a, P> {
    /// Create a new fetcher.
    pub fn new(provider: &'a P, config: &'a SearchConfig) -> Self {
        Self { provider, config }
    }

    /// Fetch every ID concurrently and wait for all of them.
    ///
    /// Never fails as a whole. Duplicate IDs are fetched once. The order of
    /// `details` follows completion, not input order.
    pub async fn fetch_all<'i, I>(&self, ids: I) -> FetchOutcome
    where
        I: IntoIterator<Item = &'i PlaceId>,
    {
        let mut seen = HashSet::new();
        let unique: Vec<PlaceId> = ids
            .into_iter()
            .filter(|id| seen.insert(*id))
            .cloned()
            .collect();

        if unique.is_empty() {
            return FetchOutcome::default();
        }

        let limit = self.config.max_concurrent_details.max(1);
        let deadline = self.config.detail_timeout;
        let provider = self.provider;

        // Each lookup owns its ID so the batch stays Send inside spawned tasks
        let lookups = unique.into_iter().map(|id| -> BoxFuture<'a, Lookup> {
            async move {
                let result = match timeout(deadline, provider.place_details(&id)).await {
                    Ok(result) => result,
                    Err(_) => Err(PlacesError::Timeout),
                };
                (id, result)
            }
            .boxed()
        });
        let mut results = stream::iter(lookups).buffer_unordered(limit);

        let mut outcome = FetchOutcome::default();
        let mut fetched = HashSet::new();

        while let Some((id, result)) = results.next().await {
            match result {
                Ok(detail) => {
                    if fetched.insert(detail.place_id.clone()) {
                        outcome.details.push(detail);
                    } else {
                        debug!(place_id = %id, "Dropping duplicate detail");
                    }
                }
                Err(e) => {
                    warn!(place_id = %id, error = %e, "Failed to fetch place details, dropping");
                    outcome.failures.push((id, e));
                }
            }
        }

        outcome
    }
}
