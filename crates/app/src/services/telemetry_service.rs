//! Telemetry service — sample ingestion and the evaluation cycle.

use farmhub_domain::error::FarmHubError;
use farmhub_domain::event::{Event, EventType};
use farmhub_domain::id::DeviceId;
use farmhub_domain::telemetry::TelemetrySample;

use crate::ports::{
    AlertRepository, DeviceStateStore, EventPublisher, RuleRepository, TelemetryStore,
};
use crate::rule_engine::{DispatchOutcome, RuleEngine};

/// Bounded retries for evaluation cycles that lose a device-state race.
const MAX_CYCLE_ATTEMPTS: u32 = 3;

/// Application service for telemetry ingestion.
///
/// Every ingested sample is persisted and then run through one rule
/// [`RuleEngine`] evaluation cycle. A cycle that loses the device-state
/// race is retried wholesale against fresh state.
pub struct TelemetryService<TS, RR, DS, AR, P> {
    telemetry_store: TS,
    publisher: P,
    engine: RuleEngine<RR, DS, AR, P>,
}

impl<TS, RR, DS, AR, P> TelemetryService<TS, RR, DS, AR, P>
where
    RR: RuleRepository,
    DS: DeviceStateStore,
    AR: AlertRepository,
    P: EventPublisher + Clone,
{
    /// Create a new service wiring the engine to the given ports.
    pub fn new(telemetry_store: TS, rule_repo: RR, device_store: DS, alert_repo: AR, publisher: P) -> Self {
        Self {
            telemetry_store,
            publisher: publisher.clone(),
            engine: RuleEngine::new(rule_repo, device_store, alert_repo, publisher),
        }
    }
}

impl<TS, RR, DS, AR, P> TelemetryService<TS, RR, DS, AR, P>
where
    TS: TelemetryStore,
    RR: RuleRepository,
    DS: DeviceStateStore,
    AR: AlertRepository,
    P: EventPublisher,
{
    /// Ingest one sample from `device_id` and run an evaluation cycle.
    ///
    /// The sample is stored regardless of how the cycle goes; dropped
    /// readings are worse than an actuation that has to wait for the
    /// next report.
    ///
    /// # Errors
    ///
    /// Returns [`FarmHubError::StateConflict`] when the cycle lost its
    /// device-state race on every attempt, or a storage error from the
    /// underlying ports.
    #[tracing::instrument(skip(self, sample), fields(device_id = %device_id))]
    pub async fn record_sample(
        &self,
        device_id: &DeviceId,
        sample: TelemetrySample,
    ) -> Result<DispatchOutcome, FarmHubError> {
        let sample = self.telemetry_store.append(sample).await?;

        let _ = self
            .publisher
            .publish(Event::new(
                EventType::TelemetryRecorded,
                Some(device_id.clone()),
                serde_json::to_value(&sample).unwrap_or_default(),
            ))
            .await;

        let mut attempt = 0;
        loop {
            match self.engine.process_sample(device_id, &sample).await {
                Ok(outcome) => {
                    if !outcome.triggered.is_empty() {
                        tracing::debug!(
                            device_id = %device_id,
                            triggered = outcome.triggered.len(),
                            "evaluation cycle matched rules"
                        );
                    }
                    return Ok(outcome);
                }
                Err(FarmHubError::StateConflict(conflict)) => {
                    attempt += 1;
                    if attempt >= MAX_CYCLE_ATTEMPTS {
                        return Err(conflict.into());
                    }
                    tracing::debug!(device_id = %device_id, attempt, "retrying evaluation cycle after lost race");
                }
                Err(other) => return Err(other),
            }
        }
    }

    /// List the most recent samples, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn list_recent(&self, limit: usize) -> Result<Vec<TelemetrySample>, FarmHubError> {
        self.telemetry_store.get_recent(limit).await
    }
}
