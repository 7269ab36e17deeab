//! Telemetry store port — append-only sample log.

use std::future::Future;

use farmhub_domain::error::FarmHubError;
use farmhub_domain::telemetry::TelemetrySample;

/// Append-only store of telemetry samples.
pub trait TelemetryStore {
    /// Append a sample.
    fn append(
        &self,
        sample: TelemetrySample,
    ) -> impl Future<Output = Result<TelemetrySample, FarmHubError>> + Send;

    /// Get the most recent samples, newest first.
    fn get_recent(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<TelemetrySample>, FarmHubError>> + Send;
}

impl<T: TelemetryStore + Send + Sync> TelemetryStore for std::sync::Arc<T> {
    fn append(
        &self,
        sample: TelemetrySample,
    ) -> impl Future<Output = Result<TelemetrySample, FarmHubError>> + Send {
        (**self).append(sample)
    }

    fn get_recent(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<TelemetrySample>, FarmHubError>> + Send {
        (**self).get_recent(limit)
    }
}
