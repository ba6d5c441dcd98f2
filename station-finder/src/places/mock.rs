//! Mock Places client for testing without API access.
//!
//! Serves a fixed set of places. Autocomplete returns every fixture whose
//! coordinate falls inside the requested rectangle, so radius expansion
//! behaves the way it does against the live API. Failures and latency can
//! be injected per place.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::RwLock;

use crate::domain::{PlaceCandidate, PlaceDetail, PlaceId};
use crate::search::{AreaSearch, PlacesProvider};

use super::error::PlacesError;

#[derive(Default)]
struct MockState {
    /// Fixtures in insertion order; autocomplete preserves this order.
    places: Vec<PlaceDetail>,
    failing_details: HashSet<PlaceId>,
    detail_delays: HashMap<PlaceId, Duration>,
    autocomplete_delay: Option<Duration>,
    autocomplete_failure: Option<String>,
}

/// Mock Places client that serves in-memory fixtures.
///
/// Useful for development and testing without real API credentials.
#[derive(Clone, Default)]
pub struct MockPlacesClient {
    state: Arc<RwLock<MockState>>,
    autocomplete_calls: Arc<AtomicUsize>,
    detail_calls: Arc<AtomicUsize>,
}

impl MockPlacesClient {
    /// Create a mock serving the given places.
    pub fn new(places: Vec<PlaceDetail>) -> Self {
        Self {
            state: Arc::new(RwLock::new(MockState {
                places,
                ..MockState::default()
            })),
            ..Self::default()
        }
    }

    /// Load fixtures from a JSON file containing an array of place details.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PlacesError> {
        let path = path.as_ref();

        let json = std::fs::read_to_string(path).map_err(|e| {
            PlacesError::Unavailable(format!("failed to read {}: {e}", path.display()))
        })?;

        let places: Vec<PlaceDetail> = serde_json::from_str(&json).map_err(|e| PlacesError::Json {
            message: format!("failed to parse {}: {e}", path.display()),
            body: None,
        })?;

        if places.is_empty() {
            return Err(PlacesError::Unavailable(format!(
                "no mock places found in {}",
                path.display()
            )));
        }

        Ok(Self::new(places))
    }

    /// Make detail lookups for `id` fail.
    pub async fn fail_details_for(&self, id: &PlaceId) {
        self.state.write().await.failing_details.insert(id.clone());
    }

    /// Delay detail lookups for `id`.
    pub async fn delay_details_for(&self, id: &PlaceId, delay: Duration) {
        self.state
            .write()
            .await
            .detail_delays
            .insert(id.clone(), delay);
    }

    /// Delay every autocomplete call.
    pub async fn delay_autocomplete(&self, delay: Duration) {
        self.state.write().await.autocomplete_delay = Some(delay);
    }

    /// Make every autocomplete call fail with the given message.
    pub async fn fail_autocomplete(&self, message: impl Into<String>) {
        self.state.write().await.autocomplete_failure = Some(message.into());
    }

    /// Remove every injected failure.
    pub async fn clear_failures(&self) {
        let mut state = self.state.write().await;
        state.failing_details.clear();
        state.autocomplete_failure = None;
    }

    /// Replace the fixture set.
    pub async fn set_places(&self, places: Vec<PlaceDetail>) {
        self.state.write().await.places = places;
    }

    /// Number of autocomplete calls served so far.
    pub fn autocomplete_calls(&self) -> usize {
        self.autocomplete_calls.load(Ordering::SeqCst)
    }

    /// Number of detail calls served so far.
    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

impl PlacesProvider for MockPlacesClient {
    async fn autocomplete(&self, search: &AreaSearch) -> Result<Vec<PlaceCandidate>, PlacesError> {
        self.autocomplete_calls.fetch_add(1, Ordering::SeqCst);

        let (delay, failure) = {
            let state = self.state.read().await;
            (state.autocomplete_delay, state.autocomplete_failure.clone())
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = failure {
            return Err(PlacesError::Unavailable(message));
        }

        let state = self.state.read().await;
        Ok(state
            .places
            .iter()
            .filter(|p| search.bounds.contains(&p.coordinate))
            .map(|p| PlaceCandidate::new(p.place_id.clone(), p.name.clone()))
            .collect())
    }

    async fn place_details(&self, id: &PlaceId) -> Result<PlaceDetail, PlacesError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);

        let delay = self.state.read().await.detail_delays.get(id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state.read().await;

        if state.failing_details.contains(id) {
            return Err(PlacesError::Api {
                status: 503,
                message: format!("injected failure for {id}"),
            });
        }

        state
            .places
            .iter()
            .find(|p| &p.place_id == id)
            .cloned()
            .ok_or(PlacesError::PlaceNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BoundingBox, GeoPoint};

    fn origin() -> GeoPoint {
        GeoPoint::new(43.70, -79.40).unwrap()
    }

    fn place(id: &str, meters_north: f64) -> PlaceDetail {
        PlaceDetail::new(
            PlaceId::parse(id).unwrap(),
            Some(format!("Station {id}")),
            origin().offset(meters_north, 0.0),
        )
        .with_types(["gas_station"])
    }

    fn search(half_width: f64) -> AreaSearch {
        AreaSearch {
            query: "gas station".into(),
            category: "gas_station".into(),
            bounds: BoundingBox::around(origin(), half_width),
        }
    }

    #[tokio::test]
    async fn autocomplete_filters_by_bounds() {
        let client = MockPlacesClient::new(vec![place("A", 50.0), place("B", 500.0)]);

        let near = client.autocomplete(&search(100.0)).await.unwrap();
        assert_eq!(near.len(), 1);
        assert_eq!(near[0].place_id.as_str(), "A");

        let wide = client.autocomplete(&search(1_000.0)).await.unwrap();
        assert_eq!(wide.len(), 2);
        assert_eq!(client.autocomplete_calls(), 2);
    }

    #[tokio::test]
    async fn details_and_injected_failures() {
        let client = MockPlacesClient::new(vec![place("A", 50.0), place("B", 60.0)]);
        let b = PlaceId::parse("B").unwrap();
        client.fail_details_for(&b).await;

        let a = client
            .place_details(&PlaceId::parse("A").unwrap())
            .await
            .unwrap();
        assert_eq!(a.display_name(), "Station A");

        assert!(matches!(
            client.place_details(&b).await,
            Err(PlacesError::Api { status: 503, .. })
        ));
        assert!(matches!(
            client.place_details(&PlaceId::parse("Z").unwrap()).await,
            Err(PlacesError::PlaceNotFound)
        ));
        assert_eq!(client.detail_calls(), 3);
    }

    #[tokio::test]
    async fn autocomplete_failure() {
        let client = MockPlacesClient::new(vec![place("A", 50.0)]);
        client.fail_autocomplete("offline").await;

        let result = client.autocomplete(&search(100.0)).await;
        assert!(matches!(result, Err(PlacesError::Unavailable(m)) if m == "offline"));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("places.json");
        let json = serde_json::to_string(&vec![place("A", 50.0)]).unwrap();
        std::fs::write(&path, json).unwrap();

        assert!(MockPlacesClient::from_file(&path).is_ok());
    }

    #[test]
    fn load_from_empty_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("places.json");
        std::fs::write(&path, "[]").unwrap();

        assert!(matches!(
            MockPlacesClient::from_file(&path),
            Err(PlacesError::Unavailable(_))
        ));
    }

    #[test]
    fn load_from_missing_file_is_an_error() {
        assert!(MockPlacesClient::from_file("/nonexistent/places.json").is_err());
    }
}
