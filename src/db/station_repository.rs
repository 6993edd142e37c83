use sqlx::SqlitePool;
use tracing::{debug, instrument};

use crate::db::{DbError, Station};

#[derive(Clone)]
pub struct StationRepository {
    pool: SqlitePool,
}

impl StationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All stations, in storage order.
    #[instrument(skip(self))]
    pub async fn find_all(&self) -> Result<Vec<Station>, DbError> {
        debug!("Querying all stations");

        let stations = sqlx::query_as::<_, Station>("SELECT station, name FROM station")
            .fetch_all(&self.pool)
            .await?;

        debug!("Found {} stations", stations.len());
        Ok(stations)
    }
}
