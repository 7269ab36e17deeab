//! Stop-scheduler port — timer commitments for duration-based auto-stop.
//!
//! The dispatcher emits a [`ScheduledStop`] intent when a timed start
//! rule actually turns the pump on. The core owns no timer threads;
//! honoring the commitment (sleeping, then issuing the stop) belongs to
//! whoever implements this port — in practice the composition root.

use std::future::Future;

use farmhub_domain::error::FarmHubError;
use farmhub_domain::id::{DeviceId, RuleId};

/// A commitment to stop irrigation after a delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledStop {
    /// The device whose pump must be stopped.
    pub device_id: DeviceId,
    /// The timed start rule that created the commitment.
    pub rule_id: RuleId,
    /// Delay before the stop, in minutes.
    pub after_minutes: u32,
}

/// Accepts stop commitments emitted by the dispatcher.
pub trait StopScheduler {
    /// Register a stop commitment. Must not block for the duration.
    fn schedule_stop(
        &self,
        stop: ScheduledStop,
    ) -> impl Future<Output = Result<(), FarmHubError>> + Send;
}

impl<T: StopScheduler + Send + Sync> StopScheduler for std::sync::Arc<T> {
    fn schedule_stop(
        &self,
        stop: ScheduledStop,
    ) -> impl Future<Output = Result<(), FarmHubError>> + Send {
        (**self).schedule_stop(stop)
    }
}
