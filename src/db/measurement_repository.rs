use sqlx::SqlitePool;
use tracing::{debug, instrument};

use crate::db::{DbError, PrecipitationReading, TemperatureObservation, TemperatureStats};

#[derive(Clone)]
pub struct MeasurementRepository {
    pool: SqlitePool,
}

impl MeasurementRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Most recent observation date across all measurements.
    /// Dates are stored as ISO `YYYY-MM-DD` text, so MAX is the lexical maximum.
    /// Returns `None` when the measurement table is empty.
    #[instrument(skip(self))]
    pub async fn max_date(&self) -> Result<Option<String>, DbError> {
        debug!("Querying most recent measurement date");

        let max_date = sqlx::query_scalar::<_, Option<String>>("SELECT MAX(date) FROM measurement")
            .fetch_one(&self.pool)
            .await?;

        Ok(max_date)
    }

    /// Precipitation readings on or after the given date, in storage order.
    #[instrument(skip(self))]
    pub async fn find_precipitation_since(
        &self,
        since: &str,
    ) -> Result<Vec<PrecipitationReading>, DbError> {
        debug!("Querying precipitation readings since {}", since);

        let readings = sqlx::query_as::<_, PrecipitationReading>(
            "SELECT date, prcp FROM measurement WHERE date >= ?1",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        debug!("Found {} precipitation readings", readings.len());
        Ok(readings)
    }

    /// Station id with the most measurement rows. Equal counts resolve to
    /// the lexically lowest station id.
    #[instrument(skip(self))]
    pub async fn most_active_station(&self) -> Result<Option<String>, DbError> {
        debug!("Querying most active station");

        let station = sqlx::query_scalar::<_, String>(
            r#"
            SELECT station FROM measurement
            GROUP BY station
            ORDER BY COUNT(station) DESC, station ASC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        if let Some(ref station) = station {
            debug!("Most active station is {}", station);
        } else {
            debug!("No measurements found in database");
        }

        Ok(station)
    }

    /// Temperature observations for one station on or after the given date.
    #[instrument(skip(self), fields(station_id = %station_id))]
    pub async fn find_observations(
        &self,
        station_id: &str,
        since: &str,
    ) -> Result<Vec<TemperatureObservation>, DbError> {
        debug!("Querying temperature observations since {}", since);

        let observations = sqlx::query_as::<_, TemperatureObservation>(
            "SELECT date, tobs FROM measurement WHERE station = ?1 AND date >= ?2",
        )
        .bind(station_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        debug!("Found {} temperature observations", observations.len());
        Ok(observations)
    }

    /// MIN/AVG/MAX of tobs for dates >= since and, when given, <= until.
    /// Both bounds are inclusive. An empty match set yields a row of nulls
    /// rather than an error.
    #[instrument(skip(self))]
    pub async fn temperature_stats(
        &self,
        since: &str,
        until: Option<&str>,
    ) -> Result<TemperatureStats, DbError> {
        debug!("Querying temperature stats since {} until {:?}", since, until);

        let stats = match until {
            Some(until) => {
                sqlx::query_as::<_, TemperatureStats>(
                    r#"
                    SELECT MIN(tobs) AS tmin, AVG(tobs) AS tavg, MAX(tobs) AS tmax
                    FROM measurement
                    WHERE date >= ?1 AND date <= ?2
                    "#,
                )
                .bind(since)
                .bind(until)
                .fetch_one(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, TemperatureStats>(
                    r#"
                    SELECT MIN(tobs) AS tmin, AVG(tobs) AS tavg, MAX(tobs) AS tmax
                    FROM measurement
                    WHERE date >= ?1
                    "#,
                )
                .bind(since)
                .fetch_one(&self.pool)
                .await?
            }
        };

        Ok(stats)
    }
}
