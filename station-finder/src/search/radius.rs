//! Adaptive-radius area search.
//!
//! Searches a small rectangle around the origin first and doubles its
//! half-width after every empty result, up to a fixed cap. One call per
//! attempt, never in parallel.

use tokio::time::timeout;
use tracing::debug;

use crate::domain::{BoundingBox, GeoPoint, PlaceCandidate};
use crate::places::PlacesError;

use super::config::SearchConfig;
use super::provider::{AreaSearch, PlacesProvider};
use super::rank::dedupe_candidates;

/// Error from an area search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Every radius up to the cap came back empty
    #[error("no candidates within {radius_meters} m after {attempts} attempts")]
    NotFound { attempts: u32, radius_meters: f64 },

    /// A single search call failed; not retried
    #[error("area search failed: {0}")]
    Transient(#[source] PlacesError),
}

/// Progress of one radius-expanding search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchState {
    /// Half-width of the current search rectangle.
    pub radius_meters: f64,
    /// 1-based attempt number.
    pub attempt: u32,
    /// The radius is never expanded past this.
    pub max_radius_meters: f64,
}

impl SearchState {
    /// State for the first attempt.
    pub fn start(config: &SearchConfig) -> Self {
        Self {
            radius_meters: config.initial_radius(),
            attempt: 1,
            max_radius_meters: config.effective_max_radius(),
        }
    }

    /// Whether this attempt already searched the largest allowed rectangle.
    pub fn at_max_radius(&self) -> bool {
        self.radius_meters >= self.max_radius_meters
    }

    /// State for the next attempt, or `None` once the radius cap or the
    /// attempt limit has been reached.
    ///
    /// The next radius is clamped to the cap before it is returned, so an
    /// attempt never searches past `max_radius_meters`.
    pub fn expand(&self, growth_factor: f64, max_attempts: u32) -> Option<Self> {
        if self.at_max_radius() || self.attempt >= max_attempts.max(1) {
            return None;
        }

        let next = (self.radius_meters * growth_factor).min(self.max_radius_meters);
        if !next.is_finite() || next <= self.radius_meters {
            return None;
        }

        Some(Self {
            radius_meters: next,
            attempt: self.attempt + 1,
            ..*self
        })
    }
}

/// Reported to observers as a search moves through its attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RadiusProgress {
    /// About to issue the search for this state.
    Attempt(SearchState),
    /// The previous attempt was empty; this is the next state.
    Expanding(SearchState),
}

/// Drives one adaptive-radius search against a places provider.
pub struct RadiusController<'a, P: PlacesProvider> {
    provider: &'a P,
    config: &'a SearchConfig,
}

impl<'a, P: PlacesProvider> RadiusController<'a, P> {
    /// Create a new controller.
    pub fn new(provider: &'a P, config: &'a SearchConfig) -> Self {
        Self { provider, config }
    }

    /// Search outward from `origin` for places tagged `category`.
    ///
    /// Returns the first non-empty candidate set, or
    /// [`SearchError::NotFound`] once the radius is exhausted.
    pub async fn search(
        &self,
        origin: GeoPoint,
        category: &str,
    ) -> Result<Vec<PlaceCandidate>, SearchError> {
        self.search_observed(origin, category, |_| {}).await
    }

    /// Like [`search`](Self::search), reporting each attempt and expansion
    /// to `on_progress` before it happens.
    pub async fn search_observed<F>(
        &self,
        origin: GeoPoint,
        category: &str,
        mut on_progress: F,
    ) -> Result<Vec<PlaceCandidate>, SearchError>
    where
        F: FnMut(RadiusProgress) + Send,
    {
        let growth = self.config.effective_growth();
        let mut state = SearchState::start(self.config);

        loop {
            on_progress(RadiusProgress::Attempt(state));

            let search = AreaSearch {
                query: self.config.query.clone(),
                category: category.to_string(),
                bounds: BoundingBox::around(origin, state.radius_meters),
            };

            debug!(
                origin = %origin,
                radius_meters = state.radius_meters,
                attempt = state.attempt,
                "Searching area"
            );

            let candidates =
                match timeout(self.config.search_timeout, self.provider.autocomplete(&search)).await
                {
                    Ok(Ok(candidates)) => dedupe_candidates(candidates),
                    Ok(Err(e)) => return Err(SearchError::Transient(e)),
                    Err(_) => return Err(SearchError::Transient(PlacesError::Timeout)),
                };

            if !candidates.is_empty() {
                debug!(
                    count = candidates.len(),
                    radius_meters = state.radius_meters,
                    "Found candidates"
                );
                return Ok(candidates);
            }

            match state.expand(growth, self.config.max_attempts) {
                Some(next) => {
                    on_progress(RadiusProgress::Expanding(next));
                    state = next;
                }
                None => {
                    return Err(SearchError::NotFound {
                        attempts: state.attempt,
                        radius_meters: state.radius_meters,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PlaceDetail, PlaceId};
    use crate::places::MockPlacesClient;
    use std::time::Duration;

    fn origin() -> GeoPoint {
        GeoPoint::new(43.70, -79.40).unwrap()
    }

    fn place(id: &str, meters_north: f64) -> PlaceDetail {
        PlaceDetail::new(
            PlaceId::parse(id).unwrap(),
            None,
            origin().offset(meters_north, 0.0),
        )
        .with_types(["gas_station"])
    }

    #[test]
    fn expansion_doubles_then_caps() {
        let config = SearchConfig::default();
        let mut state = SearchState::start(&config);
        let mut radii = vec![state.radius_meters];

        while let Some(next) = state.expand(config.effective_growth(), config.max_attempts) {
            radii.push(next.radius_meters);
            state = next;
        }

        assert_eq!(
            radii,
            vec![
                100.0, 200.0, 400.0, 800.0, 1_600.0, 3_200.0, 6_400.0, 12_800.0, 25_000.0
            ]
        );
        assert!(state.at_max_radius());
    }

    #[test]
    fn expansion_respects_attempt_limit() {
        let config = SearchConfig {
            max_attempts: 3,
            ..SearchConfig::default()
        };
        let state = SearchState::start(&config);
        let state = state.expand(2.0, 3).unwrap();
        let state = state.expand(2.0, 3).unwrap();
        assert_eq!(state.attempt, 3);
        assert!(state.expand(2.0, 3).is_none());
    }

    #[test]
    fn huge_growth_is_capped_not_overflowed() {
        let config = SearchConfig::default();
        let state = SearchState::start(&config);
        let next = state.expand(f64::MAX, 10).unwrap();
        assert_eq!(next.radius_meters, config.max_radius_meters);
    }

    #[tokio::test]
    async fn returns_first_non_empty_radius() {
        // 150 m north: outside the 100 m box, inside the 200 m box
        let mock = MockPlacesClient::new(vec![place("A", 150.0)]);
        let config = SearchConfig::default();
        let controller = RadiusController::new(&mock, &config);

        let mut progress = Vec::new();
        let candidates = controller
            .search_observed(origin(), "gas_station", |p| progress.push(p))
            .await
            .unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].place_id.as_str(), "A");
        assert_eq!(mock.autocomplete_calls(), 2);

        assert!(matches!(progress[0], RadiusProgress::Attempt(s) if s.radius_meters == 100.0));
        assert!(matches!(progress[1], RadiusProgress::Expanding(s) if s.radius_meters == 200.0));
        assert!(matches!(progress[2], RadiusProgress::Attempt(s) if s.attempt == 2));
        assert_eq!(progress.len(), 3);
    }

    #[tokio::test]
    async fn not_found_after_max_radius() {
        let mock = MockPlacesClient::new(vec![place("far", 60_000.0)]);
        let config = SearchConfig::default();
        let controller = RadiusController::new(&mock, &config);

        let result = controller.search(origin(), "gas_station").await;

        match result {
            Err(SearchError::NotFound {
                attempts,
                radius_meters,
            }) => {
                assert_eq!(attempts, 9);
                assert_eq!(radius_meters, 25_000.0);
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
        assert_eq!(mock.autocomplete_calls(), 9);
    }

    #[tokio::test]
    async fn transient_error_is_not_retried() {
        let mock = MockPlacesClient::new(vec![place("A", 150.0)]);
        mock.fail_autocomplete("connection reset").await;
        let config = SearchConfig::default();
        let controller = RadiusController::new(&mock, &config);

        let result = controller.search(origin(), "gas_station").await;

        assert!(matches!(result, Err(SearchError::Transient(_))));
        assert_eq!(mock.autocomplete_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_search_times_out_as_transient() {
        let mock = MockPlacesClient::new(vec![place("A", 10.0)]);
        mock.delay_autocomplete(Duration::from_secs(60)).await;
        let config =
            SearchConfig::default().with_timeouts(Duration::from_secs(5), Duration::from_secs(5));
        let controller = RadiusController::new(&mock, &config);

        let result = controller.search(origin(), "gas_station").await;

        assert!(matches!(
            result,
            Err(SearchError::Transient(PlacesError::Timeout))
        ));
    }

    #[test]
    fn error_display() {
        let err = SearchError::NotFound {
            attempts: 9,
            radius_meters: 25_000.0,
        };
        assert_eq!(
            err.to_string(),
            "no candidates within 25000 m after 9 attempts"
        );
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::places::MockPlacesClient;
    use proptest::prelude::*;

    proptest! {
        /// An empty area always ends in NotFound within the attempt limit
        #[test]
        fn always_terminates(
            min in 1.0f64..1_000.0,
            extra in 0.0f64..100_000.0,
            growth in 1.01f64..10.0,
            max_attempts in 1u32..40,
        ) {
            let config = SearchConfig {
                max_attempts,
                ..SearchConfig::default()
            }
            .with_radius(min, min + extra, growth);

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .unwrap();
            let mock = MockPlacesClient::new(Vec::new());
            let controller = RadiusController::new(&mock, &config);
            let origin = GeoPoint::new(43.70, -79.40).unwrap();

            let result = runtime.block_on(controller.search(origin, "gas_station"));

            match result {
                Err(SearchError::NotFound { attempts, radius_meters }) => {
                    prop_assert!(attempts <= max_attempts);
                    prop_assert!(radius_meters <= min + extra);
                }
                other => prop_assert!(false, "expected NotFound, got {:?}", other),
            }
            prop_assert!(mock.autocomplete_calls() <= max_attempts as usize);
        }
    }
}
