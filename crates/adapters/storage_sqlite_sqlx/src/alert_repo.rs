//! `SQLite` implementation of [`AlertRepository`].

use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use farmhub_app::ports::AlertRepository;
use farmhub_domain::alert::{AlertRecord, Severity};
use farmhub_domain::error::{FarmHubError, NotFoundError};
use farmhub_domain::id::AlertId;

use crate::error::StorageError;

struct Wrapper(AlertRecord);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let kind: String = row.try_get("kind")?;
        let message: String = row.try_get("message")?;
        let severity: String = row.try_get("severity")?;
        let threshold: Option<f64> = row.try_get("threshold")?;
        let timestamp_str: String = row.try_get("timestamp")?;
        let viewed: bool = row.try_get("viewed")?;

        let id = AlertId::from_uuid(id);
        let severity =
            Severity::from_str(&severity).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let timestamp = chrono::DateTime::parse_from_rfc3339(&timestamp_str)
            .map(|dt| dt.to_utc())
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(AlertRecord {
            id,
            kind,
            message,
            severity,
            threshold,
            timestamp,
            viewed,
        }))
    }
}

/// `SQLite`-backed alert repository.
pub struct SqliteAlertRepository {
    pool: SqlitePool,
}

impl SqliteAlertRepository {
    /// Create a new repository backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl AlertRepository for SqliteAlertRepository {
    async fn append(&self, alert: AlertRecord) -> Result<AlertRecord, FarmHubError> {
        sqlx::query(
                "INSERT INTO alerts (id, kind, message, severity, threshold, timestamp, viewed) VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(alert.id.as_uuid())
            .bind(&alert.kind)
            .bind(&alert.message)
            .bind(alert.severity.to_string())
            .bind(alert.threshold)
            .bind(alert.timestamp.to_rfc3339())
            .bind(alert.viewed)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(alert)
    }

    async fn get_recent(&self, limit: usize) -> Result<Vec<AlertRecord>, FarmHubError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<Wrapper> =
            sqlx::query_as("SELECT * FROM alerts ORDER BY timestamp DESC LIMIT ?")
                .bind(limit)
                .fetch_all(&self.pool)
                .await
                .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn mark_viewed(&self, id: AlertId) -> Result<AlertRecord, FarmHubError> {
        let result = sqlx::query("UPDATE alerts SET viewed = 1 WHERE id = ?")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        if result.rows_affected() == 0 {
            return Err(NotFoundError {
                entity: "Alert",
                id: id.to_string(),
            }
            .into());
        }

        let row: Wrapper = sqlx::query_as("SELECT * FROM alerts WHERE id = ?")
            .bind(id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(row.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Config;

    async fn setup() -> SqliteAlertRepository {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        SqliteAlertRepository::new(db.pool().clone())
    }

    fn alert(message: &str) -> AlertRecord {
        AlertRecord::new("Low moisture warning", message, Severity::High, Some(20.0))
    }

    #[tokio::test]
    async fn should_append_and_list_alerts() {
        let repo = setup().await;
        repo.append(alert("soil_moisture < 20 (reading 15)"))
            .await
            .unwrap();

        let recent = repo.get_recent(10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].kind, "Low moisture warning");
        assert_eq!(recent[0].severity, Severity::High);
        assert!(!recent[0].viewed);
    }

    #[tokio::test]
    async fn should_read_back_id_written_as_uuid_blob() {
        let repo = setup().await;
        let stored = repo.append(alert("dry")).await.unwrap();

        let recent = repo.get_recent(10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, stored.id);
    }

    #[tokio::test]
    async fn should_allow_duplicate_alerts() {
        let repo = setup().await;
        repo.append(alert("dry")).await.unwrap();
        repo.append(alert("dry")).await.unwrap();

        let recent = repo.get_recent(10).await.unwrap();
        assert_eq!(recent.len(), 2);
    }

    #[tokio::test]
    async fn should_limit_recent_alerts() {
        let repo = setup().await;
        for i in 0..5 {
            repo.append(alert(&format!("alert {i}"))).await.unwrap();
        }

        let recent = repo.get_recent(3).await.unwrap();
        assert_eq!(recent.len(), 3);
    }

    #[tokio::test]
    async fn should_mark_alert_viewed() {
        let repo = setup().await;
        let stored = repo.append(alert("dry")).await.unwrap();

        let viewed = repo.mark_viewed(stored.id).await.unwrap();
        assert!(viewed.viewed);
    }

    #[tokio::test]
    async fn should_return_not_found_for_missing_alert() {
        let repo = setup().await;
        let result = repo.mark_viewed(AlertId::new()).await;
        assert!(matches!(result, Err(FarmHubError::NotFound(_))));
    }
}
