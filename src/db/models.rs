use serde::Serialize;
use sqlx::FromRow;

// Database row models
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Station {
    pub station: String,
    pub name: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct PrecipitationReading {
    pub date: String,
    pub prcp: Option<f64>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TemperatureObservation {
    pub date: String,
    pub tobs: Option<f64>,
}

/// Single aggregate row over tobs. All three columns are null when the
/// filtered set is empty.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct TemperatureStats {
    pub tmin: Option<f64>,
    pub tavg: Option<f64>,
    pub tmax: Option<f64>,
}

// API response DTOs (to avoid circular dependency between services and api modules)
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TemperatureStatsRecord {
    #[serde(rename = "TMIN")]
    pub tmin: Option<f64>,
    #[serde(rename = "TAVG")]
    pub tavg: Option<f64>,
    #[serde(rename = "TMAX")]
    pub tmax: Option<f64>,
}
