//! Tokio-timer implementation of the [`StopScheduler`] port.
//!
//! Each accepted commitment spawns a task that sleeps for the rule's
//! duration, then stops the pump through the device service. The stop
//! goes through the same compare-and-set path as every other actuation,
//! so an operator who flipped the device to manual in the meantime keeps
//! control and the stop is dropped.

use std::sync::Arc;
use std::time::Duration;

use farmhub_app::ports::scheduler::ScheduledStop;
use farmhub_app::ports::{DeviceStateStore, EventPublisher, StopScheduler};
use farmhub_app::services::device_service::DeviceService;
use farmhub_domain::error::FarmHubError;

/// Spawns one tokio timer per stop commitment.
pub struct TokioStopScheduler<DS, EP> {
    device_service: Arc<DeviceService<DS, EP>>,
    flow_rate_l_per_min: f64,
}

impl<DS, EP> TokioStopScheduler<DS, EP> {
    /// Create a scheduler that stops pumps through `device_service`.
    ///
    /// `flow_rate_l_per_min` converts a run's duration into liters for
    /// the device's water accounting.
    pub fn new(device_service: Arc<DeviceService<DS, EP>>, flow_rate_l_per_min: f64) -> Self {
        Self {
            device_service,
            flow_rate_l_per_min,
        }
    }
}

impl<DS, EP> StopScheduler for TokioStopScheduler<DS, EP>
where
    DS: DeviceStateStore + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    async fn schedule_stop(&self, stop: ScheduledStop) -> Result<(), FarmHubError> {
        let device_service = Arc::clone(&self.device_service);
        let liters = f64::from(stop.after_minutes) * self.flow_rate_l_per_min;

        tracing::info!(
            device_id = %stop.device_id,
            rule_id = %stop.rule_id,
            after_minutes = stop.after_minutes,
            "scheduling irrigation stop"
        );

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(u64::from(stop.after_minutes) * 60)).await;
            match device_service
                .complete_timed_run(&stop.device_id, stop.after_minutes, liters)
                .await
            {
                Ok(state) if !state.irrigation_on => {
                    tracing::info!(device_id = %stop.device_id, "timed irrigation run finished");
                }
                Ok(_) => {
                    tracing::info!(
                        device_id = %stop.device_id,
                        "timed stop dropped, device under manual control"
                    );
                }
                Err(err) => {
                    tracing::warn!(device_id = %stop.device_id, error = %err, "timed stop failed");
                }
            }
        });

        Ok(())
    }
}
