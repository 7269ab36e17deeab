//! Rule engine — evaluates incoming telemetry against active rules and
//! dispatches the resulting actions.
//!
//! One call to [`RuleEngine::process_sample`] is one *evaluation cycle*:
//! load active rules, select the matches for the sample, then dispatch.
//! Dispatch applies at most one pump transition per cycle per device
//! (re-matching an already-satisfied rule is a no-op), appends alert
//! records without deduplication, and emits a [`ScheduledStop`] intent
//! for timed starts. The engine runs synchronously to completion and
//! owns no background tasks.

use farmhub_domain::alert::AlertRecord;
use farmhub_domain::device::{DeviceState, IrrigationCommand};
use farmhub_domain::error::FarmHubError;
use farmhub_domain::event::{Event, EventType};
use farmhub_domain::id::{DeviceId, RuleId};
use farmhub_domain::rule::{RuleAction, match_rules};
use farmhub_domain::telemetry::TelemetrySample;
use farmhub_domain::time;

use crate::ports::scheduler::ScheduledStop;
use crate::ports::{AlertRepository, DeviceStateStore, EventPublisher, RuleRepository};

/// What one evaluation cycle did.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    /// Rules whose condition held, in evaluation order.
    pub triggered: Vec<RuleId>,
    /// The single pump transition this cycle applied, if any.
    pub applied: Option<IrrigationCommand>,
    /// Alerts appended this cycle.
    pub alerts: Vec<AlertRecord>,
    /// Stop commitments the caller must hand to a scheduler.
    pub scheduled_stops: Vec<ScheduledStop>,
    /// Device state after the cycle.
    pub state: DeviceState,
}

/// Evaluates telemetry samples against the active rule set.
pub struct RuleEngine<RR, DS, AR, P> {
    rule_repo: RR,
    device_store: DS,
    alert_repo: AR,
    publisher: P,
}

impl<RR, DS, AR, P> RuleEngine<RR, DS, AR, P>
where
    RR: RuleRepository,
    DS: DeviceStateStore,
    AR: AlertRepository,
    P: EventPublisher,
{
    /// Create a new engine.
    pub fn new(rule_repo: RR, device_store: DS, alert_repo: AR, publisher: P) -> Self {
        Self {
            rule_repo,
            device_store,
            alert_repo,
            publisher,
        }
    }

    /// Run one evaluation cycle for `device_id` against `sample`.
    ///
    /// The device-state write goes through the store's compare-and-set
    /// save *before* any alert is appended, so a lost race aborts the
    /// cycle without side effects and the caller can retry it wholesale.
    ///
    /// # Errors
    ///
    /// Returns a storage error if loading rules or device state fails,
    /// or [`FarmHubError::StateConflict`] when the actuation write lost
    /// a race (the only error worth retrying).
    #[tracing::instrument(skip(self, sample), fields(device_id = %device_id))]
    pub async fn process_sample(
        &self,
        device_id: &DeviceId,
        sample: &TelemetrySample,
    ) -> Result<DispatchOutcome, FarmHubError> {
        let rules = self.rule_repo.get_active().await?;
        let matched = match_rules(sample, &rules);

        let mut state = match self.device_store.get(device_id).await? {
            Some(state) => state,
            None => {
                self.device_store
                    .create(DeviceState::new(device_id.clone(), time::now()))
                    .await?
            }
        };

        let cycle_time = time::now();
        let mut triggered = Vec::new();
        let mut applied = None;
        let mut pending_alerts = Vec::new();
        let mut scheduled_stops = Vec::new();

        for rule in &matched {
            triggered.push(rule.id);
            match &rule.action {
                RuleAction::StartIrrigation => {
                    if applied.is_none() && state.apply_auto(IrrigationCommand::On, cycle_time) {
                        applied = Some(IrrigationCommand::On);
                        if let Some(minutes) = rule.duration_minutes {
                            scheduled_stops.push(ScheduledStop {
                                device_id: device_id.clone(),
                                rule_id: rule.id,
                                after_minutes: minutes,
                            });
                        }
                    }
                }
                RuleAction::StopIrrigation => {
                    if applied.is_none() && state.apply_auto(IrrigationCommand::Off, cycle_time) {
                        applied = Some(IrrigationCommand::Off);
                    }
                }
                RuleAction::RaiseAlert { severity, message } => {
                    let reading = sample.value_of(rule.field).unwrap_or(f64::NAN);
                    let message = message.clone().unwrap_or_else(|| {
                        format!(
                            "{} {} {} (reading {reading})",
                            rule.field, rule.operator, rule.threshold
                        )
                    });
                    pending_alerts.push(AlertRecord::new(
                        rule.name.clone(),
                        message,
                        *severity,
                        Some(rule.threshold),
                    ));
                }
                RuleAction::Unknown => {
                    tracing::warn!(rule_name = %rule.name, "skipping rule with unrecognised action");
                }
            }
        }

        if applied.is_some() {
            state = self.device_store.save(state).await?;
        }

        let mut alerts = Vec::with_capacity(pending_alerts.len());
        for alert in pending_alerts {
            let alert = self.alert_repo.append(alert).await?;
            let _ = self
                .publisher
                .publish(Event::new(
                    EventType::AlertRaised,
                    Some(device_id.clone()),
                    serde_json::json!({
                        "alert_id": alert.id,
                        "severity": alert.severity,
                    }),
                ))
                .await;
            alerts.push(alert);
        }

        for rule in &matched {
            let mut updated = (*rule).clone();
            updated.last_triggered = Some(cycle_time);
            self.rule_repo.update(updated).await?;

            let _ = self
                .publisher
                .publish(Event::new(
                    EventType::RuleTriggered,
                    Some(device_id.clone()),
                    serde_json::json!({
                        "rule_id": rule.id,
                        "rule_name": rule.name,
                    }),
                ))
                .await;
        }

        if let Some(command) = applied {
            let _ = self
                .publisher
                .publish(Event::new(
                    EventType::IrrigationChanged,
                    Some(device_id.clone()),
                    serde_json::json!({
                        "irrigation_on": state.irrigation_on,
                        "command": command,
                    }),
                ))
                .await;
        }

        Ok(DispatchOutcome {
            triggered,
            applied,
            alerts,
            scheduled_stops,
            state,
        })
    }
}
