//! Application state for the web layer.

use std::sync::Arc;

use crate::aggregator::Aggregator;
use crate::location::LocationProvider;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
pub struct AppState<P> {
    /// Discovery pipeline and its published board
    pub aggregator: Aggregator<P>,

    /// Position and authorization source
    pub location: LocationProvider,

    /// Key handed to map clients
    pub maps_api_key: Arc<str>,
}

impl<P> AppState<P> {
    /// Create a new app state.
    pub fn new(
        aggregator: Aggregator<P>,
        location: LocationProvider,
        maps_api_key: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            aggregator,
            location,
            maps_api_key: maps_api_key.into(),
        }
    }
}

impl<P> Clone for AppState<P> {
    fn clone(&self) -> Self {
        Self {
            aggregator: self.aggregator.clone(),
            location: self.location.clone(),
            maps_api_key: Arc::clone(&self.maps_api_key),
        }
    }
}
