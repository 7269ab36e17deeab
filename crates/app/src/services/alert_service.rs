//! Alert service — use-cases for reading and acknowledging alerts.

use farmhub_domain::alert::AlertRecord;
use farmhub_domain::error::FarmHubError;
use farmhub_domain::id::AlertId;

use crate::ports::AlertRepository;

/// Application service for the alert log.
pub struct AlertService<R> {
    repo: R,
}

impl<R: AlertRepository> AlertService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// List the most recent alerts, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_recent(&self, limit: usize) -> Result<Vec<AlertRecord>, FarmHubError> {
        self.repo.get_recent(limit).await
    }

    /// Mark an alert as viewed.
    ///
    /// # Errors
    ///
    /// Returns [`FarmHubError::NotFound`] when no alert with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn mark_viewed(&self, id: AlertId) -> Result<AlertRecord, FarmHubError> {
        self.repo.mark_viewed(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use farmhub_domain::alert::Severity;
    use farmhub_domain::error::NotFoundError;
    use std::future::Future;
    use std::sync::Mutex;

    struct InMemoryAlertRepo {
        store: Mutex<Vec<AlertRecord>>,
    }

    impl Default for InMemoryAlertRepo {
        fn default() -> Self {
            Self {
                store: Mutex::new(Vec::new()),
            }
        }
    }

    impl AlertRepository for InMemoryAlertRepo {
        fn append(
            &self,
            alert: AlertRecord,
        ) -> impl Future<Output = Result<AlertRecord, FarmHubError>> + Send {
            self.store.lock().unwrap().push(alert.clone());
            async { Ok(alert) }
        }

        fn get_recent(
            &self,
            limit: usize,
        ) -> impl Future<Output = Result<Vec<AlertRecord>, FarmHubError>> + Send {
            let result: Vec<AlertRecord> = self
                .store
                .lock()
                .unwrap()
                .iter()
                .rev()
                .take(limit)
                .cloned()
                .collect();
            async { Ok(result) }
        }

        fn mark_viewed(
            &self,
            id: AlertId,
        ) -> impl Future<Output = Result<AlertRecord, FarmHubError>> + Send {
            let mut store = self.store.lock().unwrap();
            let result = match store.iter_mut().find(|a| a.id == id) {
                Some(alert) => {
                    alert.mark_viewed();
                    Ok(alert.clone())
                }
                None => Err(NotFoundError {
                    entity: "Alert",
                    id: id.to_string(),
                }
                .into()),
            };
            async { result }
        }
    }

    fn make_service() -> AlertService<InMemoryAlertRepo> {
        AlertService::new(InMemoryAlertRepo::default())
    }

    fn alert(message: &str) -> AlertRecord {
        AlertRecord::new(
            "Low moisture warning".to_string(),
            message.to_string(),
            Severity::High,
            Some(20.0),
        )
    }

    #[tokio::test]
    async fn should_list_recent_alerts_newest_first() {
        let svc = make_service();
        svc.repo.append(alert("first")).await.unwrap();
        svc.repo.append(alert("second")).await.unwrap();

        let recent = svc.list_recent(10).await.unwrap();

        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].message, "second");
    }

    #[tokio::test]
    async fn should_mark_alert_viewed() {
        let svc = make_service();
        let stored = svc.repo.append(alert("dry")).await.unwrap();
        assert!(!stored.viewed);

        let viewed = svc.mark_viewed(stored.id).await.unwrap();

        assert!(viewed.viewed);
    }

    #[tokio::test]
    async fn should_return_not_found_for_missing_alert() {
        let svc = make_service();
        let result = svc.mark_viewed(AlertId::new()).await;
        assert!(matches!(result, Err(FarmHubError::NotFound(_))));
    }
}
