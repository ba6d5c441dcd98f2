//! Current-position source for discovery.
//!
//! The provider holds the latest position fix and the platform's
//! authorization state, and pushes every change to subscribers over a
//! `watch` channel. The aggregator treats each new fix as the start of a
//! new search; the presentation layer reads [`LocationProvider::error_message`]
//! to explain why no fix is available.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::domain::GeoPoint;

/// Why no usable position is available.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    /// The user refused location access
    #[error("Location access denied. Enable location services to find nearby gas stations.")]
    PermissionDenied,

    /// Location access is blocked by policy (parental controls, MDM, etc.)
    #[error("Location access is restricted on this device.")]
    Restricted,

    /// Authorized, but no position has been reported yet
    #[error("Waiting for your location...")]
    NoFix,

    /// The platform reported an error
    #[error("Unable to determine your location: {0}")]
    Failed(String),
}

/// Location permission state as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationStatus {
    #[default]
    NotDetermined,
    Restricted,
    Denied,
    AuthorizedWhenInUse,
    AuthorizedAlways,
}

impl AuthorizationStatus {
    pub fn is_authorized(self) -> bool {
        matches!(self, Self::AuthorizedWhenInUse | Self::AuthorizedAlways)
    }
}

/// What subscribers see.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationStatus {
    /// No fix and no error yet.
    Pending,
    /// A position observation. Every update is a distinct observation, even
    /// when the coordinates repeat.
    Fix(GeoPoint),
    /// Location cannot be used.
    Unavailable(LocationError),
}

#[derive(Debug)]
struct ProviderState {
    status: LocationStatus,
    authorization: AuthorizationStatus,
    last_fix: Option<GeoPoint>,
}

/// Thread-safe location state with change notification.
#[derive(Clone)]
pub struct LocationProvider {
    status: watch::Sender<LocationStatus>,
    inner: std::sync::Arc<std::sync::Mutex<ProviderState>>,
}

impl LocationProvider {
    /// Create a provider with no fix and undetermined authorization.
    pub fn new() -> Self {
        let (status, _) = watch::channel(LocationStatus::Pending);
        Self {
            status,
            inner: std::sync::Arc::new(std::sync::Mutex::new(ProviderState {
                status: LocationStatus::Pending,
                authorization: AuthorizationStatus::NotDetermined,
                last_fix: None,
            })),
        }
    }

    /// Subscribe to status changes.
    pub fn subscribe(&self) -> watch::Receiver<LocationStatus> {
        self.status.subscribe()
    }

    /// Report a new position.
    ///
    /// Ignored while authorization is denied or restricted.
    pub fn update(&self, point: GeoPoint) {
        let mut state = self.lock();
        if matches!(
            state.authorization,
            AuthorizationStatus::Denied | AuthorizationStatus::Restricted
        ) {
            debug!(%point, "Ignoring position while location access is blocked");
            return;
        }

        state.last_fix = Some(point);
        self.publish(&mut state, LocationStatus::Fix(point));
    }

    /// Report an authorization change.
    ///
    /// Denied and restricted publish an error. Becoming authorized
    /// re-publishes the last fix if there is one.
    pub fn set_authorization(&self, authorization: AuthorizationStatus) {
        let mut state = self.lock();
        if state.authorization == authorization {
            return;
        }
        info!(?authorization, "Location authorization changed");
        state.authorization = authorization;

        let status = match authorization {
            AuthorizationStatus::Denied => LocationStatus::Unavailable(LocationError::PermissionDenied),
            AuthorizationStatus::Restricted => LocationStatus::Unavailable(LocationError::Restricted),
            AuthorizationStatus::NotDetermined => LocationStatus::Pending,
            AuthorizationStatus::AuthorizedWhenInUse | AuthorizationStatus::AuthorizedAlways => {
                match state.last_fix {
                    Some(point) => LocationStatus::Fix(point),
                    None => LocationStatus::Pending,
                }
            }
        };
        self.publish(&mut state, status);
    }

    /// Report a platform error.
    pub fn fail(&self, error: LocationError) {
        let mut state = self.lock();
        self.publish(&mut state, LocationStatus::Unavailable(error));
    }

    /// Most recent position, if any.
    pub fn latest(&self) -> Option<GeoPoint> {
        self.lock().last_fix
    }

    /// Current authorization state.
    pub fn authorization(&self) -> AuthorizationStatus {
        self.lock().authorization
    }

    /// Current status.
    pub fn status(&self) -> LocationStatus {
        self.lock().status.clone()
    }

    /// Human-readable explanation when no position can be used.
    ///
    /// `None` once a fix is available.
    pub fn error_message(&self) -> Option<String> {
        match &self.lock().status {
            LocationStatus::Fix(_) => None,
            LocationStatus::Pending => Some(LocationError::NoFix.to_string()),
            LocationStatus::Unavailable(e) => Some(e.to_string()),
        }
    }

    fn publish(&self, state: &mut ProviderState, status: LocationStatus) {
        state.status = status.clone();
        // send_replace so that the value is stored even with no receivers
        self.status.send_replace(status);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ProviderState> {
        // A poisoned lock only means a panic elsewhere mid-update; the
        // state itself is always a complete value.
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Default for LocationProvider {
    fn default() -> Self {
        Self::new()
    }
}
