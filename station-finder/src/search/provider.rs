//! The seam between the discovery pipeline and a places backend.

use std::future::Future;
use std::sync::Arc;

use crate::domain::{BoundingBox, PlaceCandidate, PlaceDetail, PlaceId};
use crate::places::PlacesError;

/// One rectangular-bounds search.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaSearch {
    /// Free-text query sent alongside the category, e.g. "gas station".
    pub query: String,
    /// Category token, e.g. `gas_station`.
    pub category: String,
    /// Results must fall inside this rectangle.
    pub bounds: BoundingBox,
}

/// Trait for looking up places.
///
/// This abstraction allows the pipeline to run against the live API, the
/// cache decorator or an in-memory mock.
pub trait PlacesProvider: Send + Sync {
    /// Return place candidates inside `search.bounds`.
    fn autocomplete(
        &self,
        search: &AreaSearch,
    ) -> impl Future<Output = Result<Vec<PlaceCandidate>, PlacesError>> + Send;

    /// Fetch the full record for one place.
    fn place_details(
        &self,
        id: &PlaceId,
    ) -> impl Future<Output = Result<PlaceDetail, PlacesError>> + Send;
}

impl<P: PlacesProvider> PlacesProvider for Arc<P> {
    async fn autocomplete(&self, search: &AreaSearch) -> Result<Vec<PlaceCandidate>, PlacesError> {
        (**self).autocomplete(search).await
    }

    async fn place_details(&self, id: &PlaceId) -> Result<PlaceDetail, PlacesError> {
        (**self).place_details(id).await
    }
}
