//! Places API client.
//!
//! This module provides an HTTP client for the Places API (New), which
//! backs both stages of station discovery:
//! - `places:autocomplete` returns place predictions inside a rectangle,
//!   restricted to a primary type such as `gas_station`
//! - `places/{id}` returns the full record for one prediction, limited to
//!   the fields named in the `X-Goog-FieldMask` header

mod client;
mod convert;
mod error;
mod mock;
mod types;

pub use client::{DETAIL_FIELD_MASK, PlacesClient, PlacesConfig};
pub use convert::ConversionError;
pub use error::PlacesError;
pub use mock::MockPlacesClient;
pub use types::{AutocompleteResponse, PlacePrediction, PlaceResponse, Suggestion};
