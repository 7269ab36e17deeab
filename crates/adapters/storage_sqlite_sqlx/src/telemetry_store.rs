//! `SQLite` implementation of [`TelemetryStore`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use farmhub_app::ports::TelemetryStore;
use farmhub_domain::error::FarmHubError;
use farmhub_domain::telemetry::TelemetrySample;

use crate::error::StorageError;

struct Wrapper(TelemetrySample);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let soil_moisture: Option<f64> = row.try_get("soil_moisture")?;
        let temperature: Option<f64> = row.try_get("temperature")?;
        let humidity: Option<f64> = row.try_get("humidity")?;
        let light: Option<f64> = row.try_get("light")?;
        let water_level: Option<f64> = row.try_get("water_level")?;
        let timestamp_str: String = row.try_get("timestamp")?;

        let timestamp = chrono::DateTime::parse_from_rfc3339(&timestamp_str)
            .map(|dt| dt.to_utc())
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(TelemetrySample {
            soil_moisture,
            temperature,
            humidity,
            light,
            water_level,
            timestamp,
        }))
    }
}

/// `SQLite`-backed telemetry store.
pub struct SqliteTelemetryStore {
    pool: SqlitePool,
}

impl SqliteTelemetryStore {
    /// Create a new store backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl TelemetryStore for SqliteTelemetryStore {
    async fn append(&self, sample: TelemetrySample) -> Result<TelemetrySample, FarmHubError> {
        sqlx::query(
                "INSERT INTO telemetry (soil_moisture, temperature, humidity, light, water_level, timestamp) VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(sample.soil_moisture)
            .bind(sample.temperature)
            .bind(sample.humidity)
            .bind(sample.light)
            .bind(sample.water_level)
            .bind(sample.timestamp.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(sample)
    }

    async fn get_recent(&self, limit: usize) -> Result<Vec<TelemetrySample>, FarmHubError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<Wrapper> =
            sqlx::query_as("SELECT * FROM telemetry ORDER BY timestamp DESC, id DESC LIMIT ?")
                .bind(limit)
                .fetch_all(&self.pool)
                .await
                .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Config;

    async fn setup() -> SqliteTelemetryStore {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        SqliteTelemetryStore::new(db.pool().clone())
    }

    #[tokio::test]
    async fn should_append_and_list_samples() {
        let store = setup().await;
        store
            .append(
                TelemetrySample::builder()
                    .soil_moisture(15.0)
                    .temperature(24.0)
                    .build(),
            )
            .await
            .unwrap();

        let recent = store.get_recent(10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].soil_moisture, Some(15.0));
        assert_eq!(recent[0].temperature, Some(24.0));
        assert_eq!(recent[0].humidity, None);
    }

    #[tokio::test]
    async fn should_preserve_missing_fields_as_null() {
        let store = setup().await;
        store
            .append(TelemetrySample::builder().water_level(8.5).build())
            .await
            .unwrap();

        let recent = store.get_recent(1).await.unwrap();
        assert_eq!(recent[0].water_level, Some(8.5));
        assert_eq!(recent[0].soil_moisture, None);
        assert_eq!(recent[0].light, None);
    }

    #[tokio::test]
    async fn should_limit_and_order_newest_first() {
        let store = setup().await;
        for i in 0..5 {
            store
                .append(TelemetrySample::builder().temperature(f64::from(i)).build())
                .await
                .unwrap();
        }

        let recent = store.get_recent(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].temperature, Some(4.0));
    }
}
