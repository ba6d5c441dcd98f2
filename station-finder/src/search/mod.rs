//! Nearby-place search pipeline stages.
//!
//! Discovery runs in two network-bound stages:
//!
//! 1. [`RadiusController`] searches a rectangle around the origin, growing
//!    it until at least one candidate turns up or the cap is reached.
//! 2. [`DetailFetcher`] hydrates every candidate concurrently and joins the
//!    results, keeping successes and per-place failures apart.
//!
//! [`rank`] holds the pure helpers applied to the joined result.

mod config;
mod details;
mod provider;
mod radius;
pub mod rank;

pub use config::{DEFAULT_CATEGORY, DEFAULT_QUERY, SearchConfig};
pub use details::{DetailFetcher, FetchOutcome};
pub use provider::{AreaSearch, PlacesProvider};
pub use radius::{RadiusController, RadiusProgress, SearchError, SearchState};
pub use rank::closest_station;
