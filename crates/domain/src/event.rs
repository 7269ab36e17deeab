//! Event — an in-process record of something that happened.
//!
//! Events are produced when telemetry is recorded, rules fire, the pump
//! changes state, and so on. They flow over the in-process event bus and
//! are not persisted.

use serde::{Deserialize, Serialize};

use crate::id::{DeviceId, EventId};
use crate::time::Timestamp;

/// The kind of occurrence an [`Event`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    TelemetryRecorded,
    RuleTriggered,
    IrrigationChanged,
    ModeChanged,
    AlertRaised,
}

/// An immutable notification of a domain occurrence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub event_type: EventType,
    /// The device concerned, when the event is device-scoped.
    pub device_id: Option<DeviceId>,
    /// Event-type-specific payload.
    pub data: serde_json::Value,
    pub timestamp: Timestamp,
}

impl Event {
    /// Create a new event stamped with the current time.
    #[must_use]
    pub fn new(event_type: EventType, device_id: Option<DeviceId>, data: serde_json::Value) -> Self {
        Self {
            id: EventId::new(),
            event_type,
            device_id,
            data,
            timestamp: crate::time::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_stamp_new_event_with_current_time() {
        let before = crate::time::now();
        let event = Event::new(EventType::RuleTriggered, None, serde_json::json!({}));
        assert!(event.timestamp >= before);
    }

    #[test]
    fn should_carry_device_id_when_scoped() {
        let event = Event::new(
            EventType::IrrigationChanged,
            Some(DeviceId::new("ESP32_MAIN")),
            serde_json::json!({"irrigation_on": true}),
        );
        assert_eq!(event.device_id, Some(DeviceId::new("ESP32_MAIN")));
    }

    #[test]
    fn should_roundtrip_event_through_serde_json() {
        let event = Event::new(
            EventType::AlertRaised,
            None,
            serde_json::json!({"severity": "high"}),
        );
        let json = serde_json::to_string(&event).unwrap();
        let parsed: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, event.id);
        assert_eq!(parsed.event_type, event.event_type);
    }
}
