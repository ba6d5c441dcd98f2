//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::{debug, error, warn};

use crate::aggregator::DiscoveryError;
use crate::domain::GeoPoint;
use crate::location::{AuthorizationStatus, LocationError};
use crate::search::PlacesProvider;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router<P: PlacesProvider + 'static>(state: AppState<P>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/location", post(report_location::<P>))
        .route("/location/authorization", post(report_authorization::<P>))
        .route("/stations", get(stations::<P>))
        .route("/stations/refresh", post(refresh_stations::<P>))
        .route("/stations/:place_id", get(station_detail::<P>))
        .route("/map/config", get(map_config::<P>))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Accept a position fix.
async fn report_location<P: PlacesProvider + 'static>(
    State(state): State<AppState<P>>,
    Json(req): Json<LocationRequest>,
) -> Result<StatusCode, AppError> {
    let point = GeoPoint::new(req.latitude, req.longitude).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })?;

    match state.location.authorization() {
        AuthorizationStatus::Denied => {
            return Err(DiscoveryError::LocationUnavailable(LocationError::PermissionDenied).into());
        }
        AuthorizationStatus::Restricted => {
            return Err(DiscoveryError::LocationUnavailable(LocationError::Restricted).into());
        }
        _ => {}
    }

    state.location.update(point);
    debug!(%point, "Position reported");

    Ok(StatusCode::ACCEPTED)
}

/// Accept an authorization change.
async fn report_authorization<P: PlacesProvider + 'static>(
    State(state): State<AppState<P>>,
    Json(req): Json<AuthorizationRequest>,
) -> StatusCode {
    state.location.set_authorization(req.status);
    StatusCode::NO_CONTENT
}

/// The current station board.
async fn stations<P: PlacesProvider + 'static>(
    State(state): State<AppState<P>>,
) -> Json<StationsResponse> {
    let board = state.aggregator.board();
    Json(StationsResponse::from_board(
        &board,
        state.location.error_message(),
    ))
}

/// Search again from the latest fix and wait for the result.
async fn refresh_stations<P: PlacesProvider + 'static>(
    State(state): State<AppState<P>>,
) -> Result<Json<StationsResponse>, AppError> {
    let origin = state.location.latest().ok_or(DiscoveryError::LocationUnavailable(
        LocationError::NoFix,
    ))?;

    let board = state.aggregator.refresh(origin).await;
    Ok(Json(StationsResponse::from_board(
        &board,
        state.location.error_message(),
    )))
}

/// One station from the current board.
async fn station_detail<P: PlacesProvider + 'static>(
    State(state): State<AppState<P>>,
    Path(place_id): Path<String>,
) -> Result<Json<StationView>, AppError> {
    let board = state.aggregator.board();
    let result = &board.result;

    let station = result.station(&place_id).ok_or_else(|| AppError::NotFound {
        message: format!("No station with place ID {place_id}"),
    })?;

    Ok(Json(StationView::from_detail(station, result.origin.as_ref())))
}

/// Map key and initial camera.
async fn map_config<P: PlacesProvider + 'static>(
    State(state): State<AppState<P>>,
) -> Json<MapConfigResponse> {
    let camera = state.location.latest().map(|p| CameraView {
        latitude: p.latitude(),
        longitude: p.longitude(),
        zoom: DEFAULT_ZOOM,
    });

    Json(MapConfigResponse {
        api_key: state.maps_api_key.to_string(),
        camera,
    })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Conflict { message: String },
    Internal { message: String },
}

impl From<DiscoveryError> for AppError {
    fn from(e: DiscoveryError) -> Self {
        match e {
            DiscoveryError::LocationUnavailable(_) => AppError::Conflict {
                message: e.user_message(),
            },
            _ => AppError::Internal {
                message: e.user_message(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Conflict { message } => (StatusCode::CONFLICT, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "Request failed");
        } else {
            warn!(%status, %message, "Request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
