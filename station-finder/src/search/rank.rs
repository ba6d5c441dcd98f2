//! Filtering, deduplication and closest-station selection.

use std::collections::HashSet;

use crate::domain::{GeoPoint, PlaceCandidate, PlaceDetail, geodesic_distance};

/// Drop candidates whose place ID was already seen, keeping first-seen order.
pub fn dedupe_candidates(candidates: Vec<PlaceCandidate>) -> Vec<PlaceCandidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.place_id.clone()))
        .collect()
}

/// Drop details whose place ID was already seen, keeping first-seen order.
pub fn dedupe_details(details: Vec<PlaceDetail>) -> Vec<PlaceDetail> {
    let mut seen = HashSet::new();
    details
        .into_iter()
        .filter(|d| seen.insert(d.place_id.clone()))
        .collect()
}

/// Keep details tagged with `category`, preserving order.
pub fn filter_by_category(details: Vec<PlaceDetail>, category: &str) -> Vec<PlaceDetail> {
    details.into_iter().filter(|d| d.has_type(category)).collect()
}

/// The station nearest to `origin`.
///
/// Ties go to the station that appears first in `stations`: a later
/// station only replaces the current pick when it is strictly closer.
pub fn closest_station<'a>(origin: &GeoPoint, stations: &'a [PlaceDetail]) -> Option<&'a PlaceDetail> {
    let mut best: Option<(&PlaceDetail, f64)> = None;

    for station in stations {
        let distance = geodesic_distance(origin, &station.coordinate);
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((station, distance)),
        }
    }

    best.map(|(station, _)| station)
}
