//! `SQLite` implementation of [`DeviceStateStore`].
//!
//! Saves go through a compare-and-set on the `revision` column: the
//! update only lands while the stored revision still equals the one the
//! caller read, and bumps it by one. A lost race surfaces as
//! [`FarmHubError::StateConflict`] so the caller can retry against
//! fresh state.

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use farmhub_app::ports::DeviceStateStore;
use farmhub_domain::device::DeviceState;
use farmhub_domain::error::{FarmHubError, StateConflictError};
use farmhub_domain::id::DeviceId;

use crate::error::StorageError;

struct Wrapper(DeviceState);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<DeviceState> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let device_id: String = row.try_get("device_id")?;
        let irrigation_on: bool = row.try_get("irrigation_on")?;
        let auto_mode: bool = row.try_get("auto_mode")?;
        let total_water_usage: f64 = row.try_get("total_water_usage")?;
        let last_run_duration: u32 = row.try_get("last_run_duration")?;
        let last_updated_str: String = row.try_get("last_updated")?;
        let revision: i64 = row.try_get("revision")?;

        let last_updated = chrono::DateTime::parse_from_rfc3339(&last_updated_str)
            .map(|dt| dt.to_utc())
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let revision =
            u64::try_from(revision).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(DeviceState {
            device_id: DeviceId::new(device_id),
            irrigation_on,
            auto_mode,
            total_water_usage,
            last_run_duration,
            last_updated,
            revision,
        }))
    }
}

/// `SQLite`-backed device state store.
pub struct SqliteDeviceStateStore {
    pool: SqlitePool,
}

impl SqliteDeviceStateStore {
    /// Create a new store backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl DeviceStateStore for SqliteDeviceStateStore {
    async fn get(&self, id: &DeviceId) -> Result<Option<DeviceState>, FarmHubError> {
        let row: Option<Wrapper> = sqlx::query_as("SELECT * FROM devices WHERE device_id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(Wrapper::maybe(row))
    }

    async fn get_all(&self) -> Result<Vec<DeviceState>, FarmHubError> {
        let rows: Vec<Wrapper> = sqlx::query_as("SELECT * FROM devices ORDER BY device_id")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn create(&self, state: DeviceState) -> Result<DeviceState, FarmHubError> {
        sqlx::query(
                "INSERT INTO devices (device_id, irrigation_on, auto_mode, total_water_usage, last_run_duration, last_updated, revision) VALUES (?, ?, ?, ?, ?, ?, 0)",
            )
            .bind(state.device_id.as_str())
            .bind(state.irrigation_on)
            .bind(state.auto_mode)
            .bind(state.total_water_usage)
            .bind(state.last_run_duration)
            .bind(state.last_updated.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(state)
    }

    async fn save(&self, state: DeviceState) -> Result<DeviceState, FarmHubError> {
        let expected = i64::try_from(state.revision)
            .map_err(|err| StorageError::Database(sqlx::Error::Encode(Box::new(err))))?;

        let result = sqlx::query(
                "UPDATE devices SET irrigation_on = ?, auto_mode = ?, total_water_usage = ?, last_run_duration = ?, last_updated = ?, revision = revision + 1 WHERE device_id = ? AND revision = ?",
            )
            .bind(state.irrigation_on)
            .bind(state.auto_mode)
            .bind(state.total_water_usage)
            .bind(state.last_run_duration)
            .bind(state.last_updated.to_rfc3339())
            .bind(state.device_id.as_str())
            .bind(expected)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        if result.rows_affected() == 0 {
            return Err(StateConflictError {
                device_id: state.device_id,
            }
            .into());
        }

        let mut saved = state;
        saved.revision += 1;
        Ok(saved)
    }
}
