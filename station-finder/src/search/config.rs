//! Search configuration for station discovery.

use std::time::Duration;

/// Category token requested from the places API and required on details.
pub const DEFAULT_CATEGORY: &str = "gas_station";

/// Free-text query sent with every area search.
pub const DEFAULT_QUERY: &str = "gas station";

/// Configuration parameters for nearby-station discovery.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Half-width of the first search rectangle (meters).
    pub min_radius_meters: f64,

    /// Largest half-width ever searched (meters).
    /// Expansion is capped here before the call is issued.
    pub max_radius_meters: f64,

    /// Multiplier applied to the radius after an empty result.
    pub growth_factor: f64,

    /// Maximum number of area searches per generation.
    pub max_attempts: u32,

    /// Category token, e.g. `gas_station`.
    /// Details without this type tag are filtered out.
    pub category: String,

    /// Free-text query sent alongside the category.
    pub query: String,

    /// Deadline for one area search.
    pub search_timeout: Duration,

    /// Deadline for one place detail lookup.
    pub detail_timeout: Duration,

    /// Maximum number of detail lookups in flight at once.
    pub max_concurrent_details: usize,
}

impl SearchConfig {
    /// Set the category token.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the free-text query.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Set the radius policy.
    pub fn with_radius(mut self, min_meters: f64, max_meters: f64, growth_factor: f64) -> Self {
        self.min_radius_meters = min_meters;
        self.max_radius_meters = max_meters;
        self.growth_factor = growth_factor;
        self
    }

    /// Set both per-call deadlines.
    pub fn with_timeouts(mut self, search: Duration, detail: Duration) -> Self {
        self.search_timeout = search;
        self.detail_timeout = detail;
        self
    }

    /// Growth factor, falling back to doubling when the configured value
    /// would never increase the radius.
    pub(crate) fn effective_growth(&self) -> f64 {
        if self.growth_factor.is_finite() && self.growth_factor > 1.0 {
            self.growth_factor
        } else {
            2.0
        }
    }

    /// First radius, never above the cap and never zero or negative.
    pub(crate) fn initial_radius(&self) -> f64 {
        let max = self.effective_max_radius();
        if self.min_radius_meters.is_finite() && self.min_radius_meters > 0.0 {
            self.min_radius_meters.min(max)
        } else {
            max.min(100.0)
        }
    }

    pub(crate) fn effective_max_radius(&self) -> f64 {
        if self.max_radius_meters.is_finite() && self.max_radius_meters > 0.0 {
            self.max_radius_meters
        } else {
            25_000.0
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_radius_meters: 100.0,
            max_radius_meters: 25_000.0, // 25 km
            growth_factor: 2.0,
            max_attempts: 10,
            category: DEFAULT_CATEGORY.to_string(),
            query: DEFAULT_QUERY.to_string(),
            search_timeout: Duration::from_secs(10),
            detail_timeout: Duration::from_secs(10),
            max_concurrent_details: 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = SearchConfig::default();

        assert_eq!(config.min_radius_meters, 100.0);
        assert_eq!(config.max_radius_meters, 25_000.0);
        assert_eq!(config.growth_factor, 2.0);
        assert_eq!(config.max_attempts, 10);
        assert_eq!(config.category, "gas_station");
        assert_eq!(config.query, "gas station");
        assert_eq!(config.search_timeout, Duration::from_secs(10));
        assert_eq!(config.max_concurrent_details, 8);
    }

    #[test]
    fn builders() {
        let config = SearchConfig::default()
            .with_category("charging_station")
            .with_query("ev charger")
            .with_radius(50.0, 5_000.0, 3.0)
            .with_timeouts(Duration::from_secs(1), Duration::from_secs(2));

        assert_eq!(config.category, "charging_station");
        assert_eq!(config.query, "ev charger");
        assert_eq!(config.min_radius_meters, 50.0);
        assert_eq!(config.max_radius_meters, 5_000.0);
        assert_eq!(config.growth_factor, 3.0);
        assert_eq!(config.detail_timeout, Duration::from_secs(2));
    }

    #[test]
    fn degenerate_growth_falls_back_to_doubling() {
        for factor in [1.0, 0.5, 0.0, -2.0, f64::NAN, f64::INFINITY] {
            let config = SearchConfig::default().with_radius(100.0, 1_000.0, factor);
            assert_eq!(config.effective_growth(), 2.0, "factor {factor}");
        }
    }

    #[test]
    fn initial_radius_is_capped() {
        let config = SearchConfig::default().with_radius(5_000.0, 1_000.0, 2.0);
        assert_eq!(config.initial_radius(), 1_000.0);

        let config = SearchConfig::default().with_radius(0.0, 1_000.0, 2.0);
        assert_eq!(config.initial_radius(), 100.0);
    }
}
