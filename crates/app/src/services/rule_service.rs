//! Rule service — use-cases for managing automation rules.

use farmhub_domain::error::{FarmHubError, NotFoundError};
use farmhub_domain::id::RuleId;
use farmhub_domain::rule::Rule;

use crate::ports::RuleRepository;

/// Application service for rule CRUD operations.
pub struct RuleService<R> {
    repo: R,
}

impl<R: RuleRepository> RuleService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Create a new rule after validating domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`FarmHubError::Validation`] if invariants fail (empty
    /// name, non-finite threshold, unrecognised action, zero duration),
    /// or a storage error propagated from the repository.
    #[tracing::instrument(skip(self, rule), fields(rule_name = %rule.name))]
    pub async fn create_rule(&self, rule: Rule) -> Result<Rule, FarmHubError> {
        rule.validate()?;
        self.repo.create(rule).await
    }

    /// Look up a rule by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`FarmHubError::NotFound`] when no rule with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_rule(&self, id: RuleId) -> Result<Rule, FarmHubError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Rule",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all rules.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_rules(&self) -> Result<Vec<Rule>, FarmHubError> {
        self.repo.get_all().await
    }

    /// Get all active rules.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_active(&self) -> Result<Vec<Rule>, FarmHubError> {
        self.repo.get_active().await
    }

    /// Update an existing rule.
    ///
    /// # Errors
    ///
    /// Returns [`FarmHubError::Validation`] if invariants fail,
    /// [`FarmHubError::NotFound`] when the rule does not exist, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self, rule))]
    pub async fn update_rule(&self, rule: Rule) -> Result<Rule, FarmHubError> {
        rule.validate()?;
        if self.repo.get_by_id(rule.id).await?.is_none() {
            return Err(NotFoundError {
                entity: "Rule",
                id: rule.id.to_string(),
            }
            .into());
        }
        self.repo.update(rule).await
    }

    /// Delete a rule by id.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_rule(&self, id: RuleId) -> Result<(), FarmHubError> {
        self.repo.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use farmhub_domain::alert::Severity;
    use farmhub_domain::error::ValidationError;
    use farmhub_domain::rule::{Operator, RuleAction, RuleMode, RuleStatus};
    use farmhub_domain::telemetry::TelemetryField;
    use std::collections::HashMap;
    use std::future::Future;
    use std::sync::Mutex;

    struct InMemoryRuleRepo {
        store: Mutex<HashMap<RuleId, Rule>>,
    }

    impl Default for InMemoryRuleRepo {
        fn default() -> Self {
            Self {
                store: Mutex::new(HashMap::new()),
            }
        }
    }

    impl RuleRepository for InMemoryRuleRepo {
        fn create(&self, rule: Rule) -> impl Future<Output = Result<Rule, FarmHubError>> + Send {
            let mut store = self.store.lock().unwrap();
            store.insert(rule.id, rule.clone());
            async { Ok(rule) }
        }

        fn get_by_id(
            &self,
            id: RuleId,
        ) -> impl Future<Output = Result<Option<Rule>, FarmHubError>> + Send {
            let store = self.store.lock().unwrap();
            let result = store.get(&id).cloned();
            async { Ok(result) }
        }

        fn get_all(&self) -> impl Future<Output = Result<Vec<Rule>, FarmHubError>> + Send {
            let store = self.store.lock().unwrap();
            let result: Vec<Rule> = store.values().cloned().collect();
            async { Ok(result) }
        }

        fn get_active(&self) -> impl Future<Output = Result<Vec<Rule>, FarmHubError>> + Send {
            let store = self.store.lock().unwrap();
            let result: Vec<Rule> = store
                .values()
                .filter(|r| r.status == RuleStatus::Active)
                .cloned()
                .collect();
            async { Ok(result) }
        }

        fn update(&self, rule: Rule) -> impl Future<Output = Result<Rule, FarmHubError>> + Send {
            let mut store = self.store.lock().unwrap();
            store.insert(rule.id, rule.clone());
            async { Ok(rule) }
        }

        fn delete(&self, id: RuleId) -> impl Future<Output = Result<(), FarmHubError>> + Send {
            let mut store = self.store.lock().unwrap();
            store.remove(&id);
            async { Ok(()) }
        }
    }

    fn make_service() -> RuleService<InMemoryRuleRepo> {
        RuleService::new(InMemoryRuleRepo::default())
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
    async fn should_create_rule_when_valid() {
        let svc = make_service();
        let rule = valid_rule();
        let id = rule.id;

        let created = svc.create_rule(rule).await.unwrap();
        assert_eq!(created.id, id);

        let fetched = svc.get_rule(id).await.unwrap();
        assert_eq!(fetched.name, "Start irrigation on dry soil");
    }

    #[tokio::test]
    async fn should_reject_create_when_name_is_empty() {
        let svc = make_service();
        let mut rule = valid_rule();
        rule.name = String::new();

        let result = svc.create_rule(rule).await;
        assert!(matches!(
            result,
            Err(FarmHubError::Validation(ValidationError::EmptyName))
        ));
    }

    #[tokio::test]
    async fn should_reject_create_when_threshold_not_finite() {
        let svc = make_service();
        let mut rule = valid_rule();
        rule.threshold = f64::NAN;

        let result = svc.create_rule(rule).await;
        assert!(matches!(
            result,
            Err(FarmHubError::Validation(ValidationError::NonFiniteThreshold))
        ));
    }

    #[tokio::test]
    async fn should_reject_create_when_action_unrecognised() {
        let svc = make_service();
        let mut rule = valid_rule();
        rule.action = RuleAction::Unknown;

        let result = svc.create_rule(rule).await;
        assert!(matches!(
            result,
            Err(FarmHubError::Validation(ValidationError::UnknownAction))
        ));
    }

    #[tokio::test]
    async fn should_reject_create_when_duration_is_zero() {
        let svc = make_service();
        let mut rule = valid_rule();
        rule.duration_minutes = Some(0);

        let result = svc.create_rule(rule).await;
        assert!(matches!(
            result,
            Err(FarmHubError::Validation(ValidationError::ZeroDuration))
        ));
    }

    #[tokio::test]
    async fn should_return_not_found_when_rule_missing() {
        let svc = make_service();
        let result = svc.get_rule(RuleId::new()).await;
        assert!(matches!(result, Err(FarmHubError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_list_only_active_rules() {
        let svc = make_service();
        svc.create_rule(valid_rule()).await.unwrap();

        let mut inactive = valid_rule();
        inactive.name = "Paused rule".to_string();
        inactive.status = RuleStatus::Inactive;
        svc.create_rule(inactive).await.unwrap();

        let active = svc.list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].status, RuleStatus::Active);
    }

    #[tokio::test]
    async fn should_update_rule() {
        let svc = make_service();
        let rule = valid_rule();
        let id = rule.id;
        svc.create_rule(rule).await.unwrap();

        let mut updated = svc.get_rule(id).await.unwrap();
        updated.action = RuleAction::RaiseAlert {
            severity: Severity::High,
            message: None,
        };
        let saved = svc.update_rule(updated).await.unwrap();
        assert!(matches!(saved.action, RuleAction::RaiseAlert { .. }));
    }

    #[tokio::test]
    async fn should_reject_update_of_missing_rule() {
        let svc = make_service();
        let result = svc.update_rule(valid_rule()).await;
        assert!(matches!(result, Err(FarmHubError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_delete_rule() {
        let svc = make_service();
        let rule = valid_rule();
        let id = rule.id;
        svc.create_rule(rule).await.unwrap();

        svc.delete_rule(id).await.unwrap();

        let result = svc.get_rule(id).await;
        assert!(matches!(result, Err(FarmHubError::NotFound(_))));
    }
}
