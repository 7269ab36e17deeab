//! Alert repository port — append-only alert sink.

use std::future::Future;

use farmhub_domain::alert::AlertRecord;
use farmhub_domain::error::FarmHubError;
use farmhub_domain::id::AlertId;

/// Sink and query surface for [`AlertRecord`]s.
///
/// Alerts are append-only; the sole mutation is flipping `viewed`.
pub trait AlertRepository {
    /// Append a new alert.
    fn append(
        &self,
        alert: AlertRecord,
    ) -> impl Future<Output = Result<AlertRecord, FarmHubError>> + Send;

    /// Get the most recent alerts, newest first.
    fn get_recent(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<AlertRecord>, FarmHubError>> + Send;

    /// Mark an alert as viewed, returning the updated record.
    ///
    /// Returns [`FarmHubError::NotFound`] when no alert with `id` exists.
    fn mark_viewed(
        &self,
        id: AlertId,
    ) -> impl Future<Output = Result<AlertRecord, FarmHubError>> + Send;
}

impl<T: AlertRepository + Send + Sync> AlertRepository for std::sync::Arc<T> {
    fn append(
        &self,
        alert: AlertRecord,
    ) -> impl Future<Output = Result<AlertRecord, FarmHubError>> + Send {
        (**self).append(alert)
    }

    fn get_recent(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<AlertRecord>, FarmHubError>> + Send {
        (**self).get_recent(limit)
    }

    fn mark_viewed(
        &self,
        id: AlertId,
    ) -> impl Future<Output = Result<AlertRecord, FarmHubError>> + Send {
        (**self).mark_viewed(id)
    }
}
