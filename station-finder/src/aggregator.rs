//! Nearby station discovery state machine.
//!
//! Each location observation starts a new *generation*: an adaptive-radius
//! search, a parallel detail fan-out, category filtering and closest-station
//! selection. Progress and results are published as a [`StationBoard`] on a
//! `watch` channel.
//!
//! Every publish carries the generation that produced it and is applied only
//! while that generation is still current. The check and the write happen
//! inside one `send_if_modified` call, so a slow generation can never
//! overwrite the board once a newer one has begun.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::{GeoPoint, PlaceDetail};
use crate::location::{LocationError, LocationStatus};
use crate::search::rank::{dedupe_details, filter_by_category};
use crate::search::{
    DetailFetcher, PlacesProvider, RadiusController, RadiusProgress, SearchConfig, SearchError,
    closest_station,
};

/// Shown when discovery completed but nothing matched.
pub const NO_STATIONS_MESSAGE: &str = "No gas stations found nearby.";

/// Shown when the places service could not be reached.
pub const SERVICE_UNAVAILABLE_MESSAGE: &str = "Unable to reach the places service. Please try again.";

/// How a generation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Empty,
    Error,
}

/// Where the current generation is.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Searching { radius_meters: f64, attempt: u32 },
    Expanding { next_radius_meters: f64, attempt: u32 },
    FetchingDetails { candidates: usize },
    Settled { outcome: Outcome },
}

impl Phase {
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Settled { .. })
    }
}

/// Which network stage failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStage {
    AreaSearch,
    Details,
}

impl std::fmt::Display for FetchStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AreaSearch => f.write_str("area search"),
            Self::Details => f.write_str("detail fetch"),
        }
    }
}

/// Why a generation produced no stations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DiscoveryError {
    /// No position to search from
    #[error("location unavailable: {0}")]
    LocationUnavailable(LocationError),

    /// A network stage failed
    #[error("{stage} failed: {message}")]
    TransientFetch { stage: FetchStage, message: String },

    /// Every radius up to the cap came back empty
    #[error("no candidates within {radius_meters} m after {attempts} attempts")]
    NotFound { attempts: u32, radius_meters: f64 },

    /// Details were fetched but none carried the search category
    #[error("none of {candidates} fetched places matched the search category")]
    EmptyAfterFilter { candidates: usize },
}

impl DiscoveryError {
    /// The string published to users.
    pub fn user_message(&self) -> String {
        match self {
            Self::LocationUnavailable(e) => e.to_string(),
            Self::TransientFetch { .. } => SERVICE_UNAVAILABLE_MESSAGE.to_string(),
            Self::NotFound { .. } | Self::EmptyAfterFilter { .. } => NO_STATIONS_MESSAGE.to_string(),
        }
    }

    pub fn outcome(&self) -> Outcome {
        match self {
            Self::EmptyAfterFilter { .. } => Outcome::Empty,
            _ => Outcome::Error,
        }
    }
}

impl From<SearchError> for DiscoveryError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::NotFound {
                attempts,
                radius_meters,
            } => Self::NotFound {
                attempts,
                radius_meters,
            },
            SearchError::Transient(e) => Self::TransientFetch {
                stage: FetchStage::AreaSearch,
                message: e.to_string(),
            },
        }
    }
}

/// The result of one settled generation.
///
/// Always replaced as a whole, never merged into.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateResult {
    /// Matching stations in detail-completion order.
    pub stations: Vec<PlaceDetail>,
    /// The station nearest to `origin`, if any.
    pub closest: Option<PlaceDetail>,
    /// Set exactly when `stations` is empty after a completed generation.
    pub error: Option<String>,
    /// Where the generation searched from.
    pub origin: Option<GeoPoint>,
    pub settled_at: Option<DateTime<Utc>>,
}

impl AggregateResult {
    fn found(origin: GeoPoint, stations: Vec<PlaceDetail>) -> Self {
        let closest = closest_station(&origin, &stations).cloned();
        Self {
            stations,
            closest,
            error: None,
            origin: Some(origin),
            settled_at: Some(Utc::now()),
        }
    }

    fn failed(origin: GeoPoint, error: &DiscoveryError) -> Self {
        Self {
            stations: Vec::new(),
            closest: None,
            error: Some(error.user_message()),
            origin: Some(origin),
            settled_at: Some(Utc::now()),
        }
    }

    /// Look up a station by place ID.
    pub fn station(&self, place_id: &str) -> Option<&PlaceDetail> {
        self.stations.iter().find(|s| s.place_id.as_str() == place_id)
    }
}

/// The published discovery state.
#[derive(Debug, Clone, Default)]
pub struct StationBoard {
    /// Generation that last touched the board; 0 before the first search.
    pub generation: u64,
    pub phase: Phase,
    /// The last settled result. Kept visible while a newer generation runs.
    pub result: Arc<AggregateResult>,
}

struct Inner<P> {
    provider: Arc<P>,
    config: SearchConfig,
    board: watch::Sender<StationBoard>,
    task: Mutex<Option<JoinHandle<()>>>,
}

/// Runs discovery generations and publishes their progress.
pub struct Aggregator<P> {
    inner: Arc<Inner<P>>,
}

impl<P> Clone for Aggregator<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: PlacesProvider + 'static> Aggregator<P> {
    pub fn new(provider: Arc<P>, config: SearchConfig) -> Self {
        let (board, _) = watch::channel(StationBoard::default());
        Self {
            inner: Arc::new(Inner {
                provider,
                config,
                board,
                task: Mutex::new(None),
            }),
        }
    }

    /// Receive every board change.
    pub fn subscribe(&self) -> watch::Receiver<StationBoard> {
        self.inner.board.subscribe()
    }

    /// Snapshot of the current board.
    pub fn board(&self) -> StationBoard {
        self.inner.board.borrow().clone()
    }

    pub fn config(&self) -> &SearchConfig {
        &self.inner.config
    }

    /// Start discovery around `origin` in the background.
    ///
    /// Supersedes any running generation and returns the new generation
    /// number.
    pub fn observe(&self, origin: GeoPoint) -> u64 {
        let mut task = self.task_slot();
        let generation = self.inner.begin(origin);

        if let Some(previous) = task.take() {
            previous.abort();
        }

        let inner = Arc::clone(&self.inner);
        *task = Some(tokio::spawn(async move {
            inner.run_generation(generation, origin).await;
        }));

        generation
    }

    /// Run discovery around `origin` and wait for it to settle.
    ///
    /// The generation runs on its own task, so dropping this future does not
    /// abandon it. Returns early with the newer board if another generation
    /// supersedes this one first.
    pub async fn refresh(&self, origin: GeoPoint) -> StationBoard {
        let mut boards = self.subscribe();
        let generation = self.observe(origin);

        match boards
            .wait_for(|b| b.generation != generation || b.phase.is_settled())
            .await
        {
            Ok(board) => board.clone(),
            Err(_) => self.board(),
        }
    }

    /// Start a generation for every new position fix until the location
    /// source closes.
    pub async fn run(&self, mut locations: watch::Receiver<LocationStatus>) {
        loop {
            let status = locations.borrow_and_update().clone();
            match status {
                LocationStatus::Fix(origin) => {
                    let generation = self.observe(origin);
                    debug!(generation, %origin, "Position fix, starting discovery");
                }
                LocationStatus::Pending => {}
                LocationStatus::Unavailable(error) => {
                    debug!(%error, "Location unavailable, keeping current board");
                }
            }

            if locations.changed().await.is_err() {
                break;
            }
        }

        info!("Location source closed, discovery stopped");
    }

    fn task_slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.inner
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<P: PlacesProvider> Inner<P> {
    /// Bump the generation. The previous result stays visible.
    fn begin(&self, origin: GeoPoint) -> u64 {
        let mut generation = 0;
        let radius_meters = self.config.initial_radius();

        self.board.send_modify(|board| {
            board.generation += 1;
            board.phase = Phase::Searching {
                radius_meters,
                attempt: 1,
            };
            generation = board.generation;
        });

        debug!(generation, %origin, "Discovery generation started");
        generation
    }

    /// Apply `update` only if `generation` is still current.
    fn publish<F>(&self, generation: u64, update: F) -> bool
    where
        F: FnOnce(&mut StationBoard),
    {
        let applied = self.board.send_if_modified(|board| {
            if board.generation != generation {
                return false;
            }
            update(board);
            true
        });

        if !applied {
            warn!(
                generation,
                current = self.board.borrow().generation,
                "Discarding update from superseded generation"
            );
        }
        applied
    }

    async fn run_generation(&self, generation: u64, origin: GeoPoint) {
        let provider = self.provider.as_ref();
        let category = self.config.category.as_str();

        let search = RadiusController::new(provider, &self.config)
            .search_observed(origin, category, |progress| {
                let phase = match progress {
                    RadiusProgress::Attempt(state) => Phase::Searching {
                        radius_meters: state.radius_meters,
                        attempt: state.attempt,
                    },
                    RadiusProgress::Expanding(state) => Phase::Expanding {
                        next_radius_meters: state.radius_meters,
                        attempt: state.attempt,
                    },
                };
                self.publish(generation, |board| board.phase = phase);
            })
            .await;

        let candidates = match search {
            Ok(candidates) => candidates,
            Err(e) => {
                self.settle(generation, origin, Err(e.into()));
                return;
            }
        };

        let count = candidates.len();
        if !self.publish(generation, |board| {
            board.phase = Phase::FetchingDetails { candidates: count }
        }) {
            return;
        }

        let fetched = DetailFetcher::new(provider, &self.config)
            .fetch_all(candidates.iter().map(|c| &c.place_id))
            .await;

        let result = if fetched.all_failed() {
            let message = fetched
                .failures
                .first()
                .map(|(_, e)| e.to_string())
                .unwrap_or_default();
            Err(DiscoveryError::TransientFetch {
                stage: FetchStage::Details,
                message,
            })
        } else {
            let total = fetched.details.len();
            let stations = filter_by_category(dedupe_details(fetched.details), category);
            if stations.is_empty() {
                Err(DiscoveryError::EmptyAfterFilter { candidates: total })
            } else {
                Ok(stations)
            }
        };

        self.settle(generation, origin, result);
    }

    fn settle(
        &self,
        generation: u64,
        origin: GeoPoint,
        result: Result<Vec<PlaceDetail>, DiscoveryError>,
    ) {
        let (outcome, aggregate) = match result {
            Ok(stations) => (Outcome::Success, AggregateResult::found(origin, stations)),
            Err(e) => {
                debug!(generation, error = %e, "Discovery produced no stations");
                (e.outcome(), AggregateResult::failed(origin, &e))
            }
        };

        let stations = aggregate.stations.len();
        let closest = aggregate
            .closest
            .as_ref()
            .map(|c| c.place_id.to_string());
        let aggregate = Arc::new(aggregate);

        let published = self.publish(generation, |board| {
            board.phase = Phase::Settled { outcome };
            board.result = aggregate;
        });

        if published {
            info!(
                generation,
                ?outcome,
                stations,
                closest = closest.as_deref().unwrap_or("-"),
                "Discovery settled"
            );
        }
    }
}
