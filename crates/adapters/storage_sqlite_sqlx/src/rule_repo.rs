//! `SQLite` implementation of [`RuleRepository`].

use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use farmhub_app::ports::RuleRepository;
use farmhub_domain::error::FarmHubError;
use farmhub_domain::id::RuleId;
use farmhub_domain::rule::{Operator, Rule, RuleAction, RuleMode, RuleStatus};
use farmhub_domain::telemetry::TelemetryField;

use crate::error::StorageError;

struct Wrapper(Rule);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Rule> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        let field: String = row.try_get("field")?;
        let operator: String = row.try_get("operator")?;
        let threshold: f64 = row.try_get("threshold")?;
        let action_json: String = row.try_get("action")?;
        let duration_minutes: Option<u32> = row.try_get("duration_minutes")?;
        let mode: String = row.try_get("mode")?;
        let status: String = row.try_get("status")?;
        let last_triggered_str: Option<String> = row.try_get("last_triggered")?;

        let id = RuleId::from_uuid(id);
        let field =
            TelemetryField::from_str(&field).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let operator =
            Operator::from_str(&operator).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        // Unrecognised stored action tags decode to `RuleAction::Unknown`,
        // which the dispatcher treats as a logged no-op.
        let action: RuleAction = serde_json::from_str(&action_json)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let mode = RuleMode::from_str(&mode).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let status =
            RuleStatus::from_str(&status).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let last_triggered = last_triggered_str
            .map(|s| {
                chrono::DateTime::parse_from_rfc3339(&s)
                    .map(|dt| dt.to_utc())
                    .map_err(|err| sqlx::Error::Decode(Box::new(err)))
            })
            .transpose()?;

        Ok(Self(Rule {
            id,
            name,
            field,
            operator,
            threshold,
            action,
            duration_minutes,
            mode,
            status,
            last_triggered,
        }))
    }
}

/// `SQLite`-backed rule repository.
pub struct SqliteRuleRepository {
    pool: SqlitePool,
}

impl SqliteRuleRepository {
    /// Create a new repository backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl RuleRepository for SqliteRuleRepository {
    async fn create(&self, rule: Rule) -> Result<Rule, FarmHubError> {
        let id = rule.id.as_uuid();
        let action_json = serde_json::to_string(&rule.action).map_err(StorageError::from)?;
        let last_triggered = rule.last_triggered.map(|ts| ts.to_rfc3339());

        sqlx::query(
                "INSERT INTO rules (id, name, field, operator, threshold, action, duration_minutes, mode, status, last_triggered) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&id)
            .bind(&rule.name)
            .bind(rule.field.as_str())
            .bind(rule.operator.as_str())
            .bind(rule.threshold)
            .bind(&action_json)
            .bind(rule.duration_minutes)
            .bind(rule.mode.as_str())
            .bind(rule.status.as_str())
            .bind(&last_triggered)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rule)
    }

    async fn get_by_id(&self, id: RuleId) -> Result<Option<Rule>, FarmHubError> {
        let row: Option<Wrapper> = sqlx::query_as("SELECT * FROM rules WHERE id = ?")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(Wrapper::maybe(row))
    }

    async fn get_all(&self) -> Result<Vec<Rule>, FarmHubError> {
        let rows: Vec<Wrapper> = sqlx::query_as("SELECT * FROM rules ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn get_active(&self) -> Result<Vec<Rule>, FarmHubError> {
        let rows: Vec<Wrapper> =
            sqlx::query_as("SELECT * FROM rules WHERE status = 'active' ORDER BY name")
                .fetch_all(&self.pool)
                .await
                .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn update(&self, rule: Rule) -> Result<Rule, FarmHubError> {
        let id = rule.id.as_uuid();
        let action_json = serde_json::to_string(&rule.action).map_err(StorageError::from)?;
        let last_triggered = rule.last_triggered.map(|ts| ts.to_rfc3339());

        sqlx::query(
                "UPDATE rules SET name = ?, field = ?, operator = ?, threshold = ?, action = ?, duration_minutes = ?, mode = ?, status = ?, last_triggered = ? WHERE id = ?",
            )
            .bind(&rule.name)
            .bind(rule.field.as_str())
            .bind(rule.operator.as_str())
            .bind(rule.threshold)
            .bind(&action_json)
            .bind(rule.duration_minutes)
            .bind(rule.mode.as_str())
            .bind(rule.status.as_str())
            .bind(&last_triggered)
            .bind(&id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rule)
    }

    async fn delete(&self, id: RuleId) -> Result<(), FarmHubError> {
        sqlx::query("DELETE FROM rules WHERE id = ?")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Config;
    use farmhub_domain::alert::Severity;

    async fn setup() -> SqliteRuleRepository {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        SqliteRuleRepository::new(db.pool().clone())
    }

    fn valid_rule() -> Rule {
        Rule::builder()
            .name("Start irrigation on dry soil")
            .condition(TelemetryField::SoilMoisture, Operator::LessThan, 20.0)
            .action(RuleAction::StartIrrigation)
            .mode(RuleMode::Auto)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn should_create_and_retrieve_rule() {
        let repo = setup().await;
        let rule = valid_rule();
        let id = rule.id;

        repo.create(rule).await.unwrap();
        let fetched = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(fetched.id, id);
        assert_eq!(fetched.name, "Start irrigation on dry soil");
        assert_eq!(fetched.mode, RuleMode::Auto);
        assert_eq!(fetched.status, RuleStatus::Active);
    }

    #[tokio::test]
    async fn should_read_back_id_written_as_uuid_blob() {
        let repo = setup().await;
        let rule = valid_rule();
        let id = rule.id;
        repo.create(rule).await.unwrap();

        let all = repo.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, id);
    }

    #[tokio::test]
    async fn should_return_none_when_rule_not_found() {
        let repo = setup().await;
        let result = repo.get_by_id(RuleId::new()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn should_list_only_active_rules() {
        let repo = setup().await;
        repo.create(valid_rule()).await.unwrap();

        let mut inactive = valid_rule();
        inactive.name = "Paused rule".to_string();
        inactive.status = RuleStatus::Inactive;
        repo.create(inactive).await.unwrap();

        let active = repo.get_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].status, RuleStatus::Active);
    }

    #[tokio::test]
    async fn should_update_rule() {
        let repo = setup().await;
        let rule = valid_rule();
        let id = rule.id;
        repo.create(rule).await.unwrap();

        let mut fetched = repo.get_by_id(id).await.unwrap().unwrap();
        fetched.name = "Updated name".to_string();
        fetched.status = RuleStatus::Inactive;
        fetched.last_triggered = Some(farmhub_domain::time::now());
        repo.update(fetched).await.unwrap();

        let updated = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(updated.name, "Updated name");
        assert_eq!(updated.status, RuleStatus::Inactive);
        assert!(updated.last_triggered.is_some());
    }

    #[tokio::test]
    async fn should_delete_rule() {
        let repo = setup().await;
        let rule = valid_rule();
        let id = rule.id;
        repo.create(rule).await.unwrap();

        repo.delete(id).await.unwrap();
        let result = repo.get_by_id(id).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn should_preserve_action_payload_through_roundtrip() {
        let repo = setup().await;
        let rule = Rule::builder()
            .name("Alert on hot days")
            .condition(TelemetryField::Temperature, Operator::GreaterOrEqual, 35.0)
            .action(RuleAction::RaiseAlert {
                severity: Severity::High,
                message: Some("greenhouse overheating".to_string()),
            })
            .duration_minutes(15)
            .mode(RuleMode::Auto)
            .build()
            .unwrap();
        let id = rule.id;

        repo.create(rule).await.unwrap();
        let fetched = repo.get_by_id(id).await.unwrap().unwrap();

        assert!(matches!(
            fetched.action,
            RuleAction::RaiseAlert { severity: Severity::High, .. }
        ));
        assert_eq!(fetched.duration_minutes, Some(15));
    }

    #[tokio::test]
    async fn should_decode_unrecognised_stored_action_as_unknown() {
        let repo = setup().await;

        sqlx::query(
            "INSERT INTO rules (id, name, field, operator, threshold, action, mode, status) VALUES (?, 'Legacy rule', 'soil_moisture', '<', 20.0, ?, 'auto', 'active')",
        )
        .bind(RuleId::new().as_uuid())
        .bind(r#"{"type":"send_sms"}"#)
        .execute(&repo.pool)
        .await
        .unwrap();

        let rules = repo.get_active().await.unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].action, RuleAction::Unknown);
    }
}
