//! Rule repository port — persistence for rules.

use std::future::Future;

use farmhub_domain::error::FarmHubError;
use farmhub_domain::id::RuleId;
use farmhub_domain::rule::Rule;

/// Repository for persisting and querying [`Rule`]s.
pub trait RuleRepository {
    /// Create a new rule in storage.
    fn create(&self, rule: Rule) -> impl Future<Output = Result<Rule, FarmHubError>> + Send;

    /// Get a rule by its unique identifier.
    fn get_by_id(
        &self,
        id: RuleId,
    ) -> impl Future<Output = Result<Option<Rule>, FarmHubError>> + Send;

    /// Get all rules.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Rule>, FarmHubError>> + Send;

    /// Get all active rules, in the order the evaluation cycle should
    /// consider them (there is no priority model beyond this order).
    fn get_active(&self) -> impl Future<Output = Result<Vec<Rule>, FarmHubError>> + Send;

    /// Update an existing rule.
    fn update(&self, rule: Rule) -> impl Future<Output = Result<Rule, FarmHubError>> + Send;

    /// Delete a rule by its unique identifier.
    fn delete(&self, id: RuleId) -> impl Future<Output = Result<(), FarmHubError>> + Send;
}

impl<T: RuleRepository + Send + Sync> RuleRepository for std::sync::Arc<T> {
    fn create(&self, rule: Rule) -> impl Future<Output = Result<Rule, FarmHubError>> + Send {
        (**self).create(rule)
    }

    fn get_by_id(
        &self,
        id: RuleId,
    ) -> impl Future<Output = Result<Option<Rule>, FarmHubError>> + Send {
        (**self).get_by_id(id)
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Rule>, FarmHubError>> + Send {
        (**self).get_all()
    }

    fn get_active(&self) -> impl Future<Output = Result<Vec<Rule>, FarmHubError>> + Send {
        (**self).get_active()
    }

    fn update(&self, rule: Rule) -> impl Future<Output = Result<Rule, FarmHubError>> + Send {
        (**self).update(rule)
    }

    fn delete(&self, id: RuleId) -> impl Future<Output = Result<(), FarmHubError>> + Send {
        (**self).delete(id)
    }
}
