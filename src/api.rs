use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use tracing::{debug, error, info, instrument, warn};

use crate::db::{Station, TemperatureObservation, TemperatureStatsRecord};
use crate::services::climate_service::PrecipitationRecord;
use crate::services::ClimateService;

#[derive(Clone)]
pub struct AppState {
    pub climate_service: ClimateService,
}

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/precipitation", get(precipitation))
        .route("/stations", get(stations))
        .route("/tobs", get(tobs))
        .route("/{start}", get(temp_stats_from))
        .route("/{start}/{end}", get(temp_stats_between))
        .with_state(state);

    Router::new()
        .route("/", get(home))
        .nest("/api/v1.0", api_routes)
}

async fn home() -> Html<&'static str> {
    debug!("Route listing requested");
    Html(
        "Welcome to the Climate Analysis API!<br/>\
         Available Routes:<br/>\
         /api/v1.0/precipitation<br/>\
         /api/v1.0/stations<br/>\
         /api/v1.0/tobs<br/>\
         /api/v1.0/&lt;start&gt;<br/>\
         /api/v1.0/&lt;start&gt;/&lt;end&gt;<br/>",
    )
}

#[instrument(skip(state))]
async fn precipitation(
    State(state): State<AppState>,
) -> Result<Json<Vec<PrecipitationRecord>>, StatusCode> {
    debug!("Fetching trailing-year precipitation readings");
    let records = state
        .climate_service
        .precipitation_trailing_year()
        .await
        .map_err(|e| {
            error!("Failed to fetch precipitation readings: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or_else(|| {
            warn!("No measurements available to anchor the precipitation window");
            StatusCode::NOT_FOUND
        })?;

    info!("Retrieved {} precipitation records", records.len());

    Ok(Json(records))
}

#[instrument(skip(state))]
async fn stations(State(state): State<AppState>) -> Result<Json<Vec<Station>>, StatusCode> {
    debug!("Fetching all stations");
    let stations = state.climate_service.all_stations().await.map_err(|e| {
        error!("Failed to fetch stations: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    info!("Retrieved {} stations", stations.len());

    Ok(Json(stations))
}

#[instrument(skip(state))]
async fn tobs(
    State(state): State<AppState>,
) -> Result<Json<Vec<TemperatureObservation>>, StatusCode> {
    debug!("Fetching trailing-year observations for the most active station");
    let observations = state
        .climate_service
        .observations_for_most_active_station()
        .await
        .map_err(|e| {
            error!("Failed to fetch temperature observations: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or_else(|| {
            warn!("No measurements available to pick a most active station");
            StatusCode::NOT_FOUND
        })?;

    info!("Retrieved {} temperature observations", observations.len());

    Ok(Json(observations))
}

#[instrument(skip(state), fields(start = %start))]
async fn temp_stats_from(
    State(state): State<AppState>,
    Path(start): Path<String>,
) -> Result<Json<Vec<TemperatureStatsRecord>>, StatusCode> {
    validate_date(&start)?;

    debug!("Fetching temperature stats since {}", start);
    let stats = state
        .climate_service
        .temperature_stats(&start, None)
        .await
        .map_err(|e| {
            error!("Failed to fetch temperature stats since {}: {}", start, e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    info!("Retrieved temperature stats since {}", start);

    Ok(Json(stats))
}

#[instrument(skip(state), fields(start = %start, end = %end))]
async fn temp_stats_between(
    State(state): State<AppState>,
    Path((start, end)): Path<(String, String)>,
) -> Result<Json<Vec<TemperatureStatsRecord>>, StatusCode> {
    validate_date(&start)?;
    validate_date(&end)?;

    debug!("Fetching temperature stats from {} to {}", start, end);
    let stats = state
        .climate_service
        .temperature_stats(&start, Some(&end))
        .await
        .map_err(|e| {
            error!(
                "Failed to fetch temperature stats from {} to {}: {}",
                start, end, e
            );
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    info!("Retrieved temperature stats from {} to {}", start, end);

    Ok(Json(stats))
}

/// Path dates must parse as ISO `YYYY-MM-DD`; anything else is a client error.
fn validate_date(raw: &str) -> Result<(), StatusCode> {
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(_) => Ok(()),
        Err(_) => {
            warn!("Rejecting malformed date path segment: {:?}", raw);
            Err(StatusCode::BAD_REQUEST)
        }
    }
}
