use chrono::{Duration, NaiveDate};
use serde_json::{json, Map, Value};

use crate::db::{
    DbError, MeasurementRepository, Station, StationRepository, TemperatureObservation,
    TemperatureStatsRecord,
};

/// One reading per record, keyed by its observation date. Rows that share
/// a date stay separate single-entry records and are never merged.
pub type PrecipitationRecord = Map<String, Value>;

#[derive(Clone)]
pub struct ClimateService {
    measurement_repo: MeasurementRepository,
    station_repo: StationRepository,
}

impl ClimateService {
    pub fn new(measurement_repo: MeasurementRepository, station_repo: StationRepository) -> Self {
        Self {
            measurement_repo,
            station_repo,
        }
    }

    /// Precipitation readings for the trailing year, anchored at the most
    /// recent observation date. `None` when there are no measurements at
    /// all to anchor the window.
    pub async fn precipitation_trailing_year(
        &self,
    ) -> Result<Option<Vec<PrecipitationRecord>>, DbError> {
        let Some(max_date) = self.measurement_repo.max_date().await? else {
            return Ok(None);
        };
        let window_start = Self::trailing_year_start(&max_date);

        let readings = self
            .measurement_repo
            .find_precipitation_since(&window_start)
            .await?;

        let records = readings
            .into_iter()
            .map(|reading| {
                let mut record = Map::new();
                record.insert(reading.date, json!(reading.prcp));
                record
            })
            .collect();

        Ok(Some(records))
    }

    pub async fn all_stations(&self) -> Result<Vec<Station>, DbError> {
        self.station_repo.find_all().await
    }

    /// Trailing-year temperature observations for the station with the
    /// most measurement rows. `None` when there are no measurements.
    pub async fn observations_for_most_active_station(
        &self,
    ) -> Result<Option<Vec<TemperatureObservation>>, DbError> {
        let Some(max_date) = self.measurement_repo.max_date().await? else {
            return Ok(None);
        };
        let window_start = Self::trailing_year_start(&max_date);

        let Some(station_id) = self.measurement_repo.most_active_station().await? else {
            return Ok(None);
        };

        let observations = self
            .measurement_repo
            .find_observations(&station_id, &window_start)
            .await?;

        Ok(Some(observations))
    }

    /// Temperature stats for dates >= start and, when given, <= end, as
    /// the one-element list the API returns. An empty match set comes
    /// back with all three stats null.
    pub async fn temperature_stats(
        &self,
        start: &str,
        end: Option<&str>,
    ) -> Result<Vec<TemperatureStatsRecord>, DbError> {
        let stats = self.measurement_repo.temperature_stats(start, end).await?;

        Ok(vec![TemperatureStatsRecord {
            tmin: stats.tmin,
            tavg: stats.tavg.map(Self::round_avg),
            tmax: stats.tmax,
        }])
    }

    // Business logic helpers (private)

    /// Start of the 365-day window ending at the given date. An
    /// unparseable anchor date degrades to a window containing only
    /// itself instead of failing the request.
    fn trailing_year_start(max_date: &str) -> String {
        match NaiveDate::parse_from_str(max_date, "%Y-%m-%d") {
            Ok(date) => (date - Duration::days(365)).format("%Y-%m-%d").to_string(),
            Err(_) => max_date.to_string(),
        }
    }

    /// The average temperature is reported to 2 decimal places;
    /// min and max pass through as stored.
    fn round_avg(value: f64) -> f64 {
        (value * 100.0).round() / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_year_window_spans_365_days() {
        assert_eq!(
            ClimateService::trailing_year_start("2017-08-23"),
            "2016-08-23"
        );
        // 2016 is a leap year, so 365 days back is not "same date last year"
        assert_eq!(
            ClimateService::trailing_year_start("2016-12-31"),
            "2016-01-01"
        );
    }

    #[test]
    fn unparseable_anchor_date_degrades_to_itself() {
        assert_eq!(
            ClimateService::trailing_year_start("not-a-date"),
            "not-a-date"
        );
    }

    #[test]
    fn average_rounds_to_two_decimals() {
        assert_eq!(ClimateService::round_avg(187.0 / 3.0), 62.33);
        assert_eq!(ClimateService::round_avg(73.0), 73.0);
        assert_eq!(ClimateService::round_avg(71.125), 71.13);
    }
}
