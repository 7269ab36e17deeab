//! Device state machine — irrigation on/off × auto/manual mode.
//!
//! One [`DeviceState`] exists per physical device, keyed by
//! [`DeviceId`]. The four states are the cross product of `auto_mode`
//! and `irrigation_on`; a device starts in Manual-Off and never
//! terminates. Who may flip the pump depends on the mode:
//!
//! - in **manual** mode, only an explicit operator command;
//! - in **auto** mode, only the rule dispatcher — operator irrigation
//!   commands are rejected with [`ManualOverrideRejected`].
//!
//! Switching modes never touches the pump.

use serde::{Deserialize, Serialize};

use crate::error::ManualOverrideRejected;
use crate::id::DeviceId;
use crate::time::Timestamp;

/// A pump actuation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IrrigationCommand {
    On,
    Off,
}

impl IrrigationCommand {
    /// The `irrigation_on` value this command drives towards.
    #[must_use]
    pub fn target(self) -> bool {
        matches!(self, Self::On)
    }
}

impl std::fmt::Display for IrrigationCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::On => f.write_str("on"),
            Self::Off => f.write_str("off"),
        }
    }
}

/// The long-lived actuation state of one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceState {
    pub device_id: DeviceId,
    /// Whether the irrigation pump is running.
    pub irrigation_on: bool,
    /// Whether the rule dispatcher owns the pump.
    pub auto_mode: bool,
    /// Accumulated water usage, liters.
    pub total_water_usage: f64,
    /// Duration of the most recent completed run, minutes.
    pub last_run_duration: u32,
    pub last_updated: Timestamp,
    /// Monotonic counter for compare-and-set writes; bumped by the store
    /// on every successful save, never by domain code.
    pub revision: u64,
}

impl DeviceState {
    /// A fresh device in the initial Manual-Off state.
    #[must_use]
    pub fn new(device_id: DeviceId, now: Timestamp) -> Self {
        Self {
            device_id,
            irrigation_on: false,
            auto_mode: false,
            total_water_usage: 0.0,
            last_run_duration: 0,
            last_updated: now,
            revision: 0,
        }
    }

    /// Switch between manual and auto mode without touching the pump.
    ///
    /// Returns whether the mode actually changed.
    pub fn set_auto_mode(&mut self, enabled: bool, now: Timestamp) -> bool {
        if self.auto_mode == enabled {
            return false;
        }
        self.auto_mode = enabled;
        self.last_updated = now;
        true
    }

    /// Apply an operator-issued pump command.
    ///
    /// Returns whether the pump state changed; a command that matches the
    /// current state is a no-op, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ManualOverrideRejected`] while `auto_mode` is on; the
    /// state is left untouched.
    pub fn apply_manual(
        &mut self,
        command: IrrigationCommand,
        now: Timestamp,
    ) -> Result<bool, ManualOverrideRejected> {
        if self.auto_mode {
            return Err(ManualOverrideRejected {
                device_id: self.device_id.clone(),
            });
        }
        Ok(self.actuate(command, now))
    }

    /// Apply a dispatcher-issued pump command.
    ///
    /// Only effective in auto mode; in manual mode the dispatcher does
    /// not own the pump and the command is dropped. Returns whether the
    /// pump state changed.
    pub fn apply_auto(&mut self, command: IrrigationCommand, now: Timestamp) -> bool {
        if !self.auto_mode {
            return false;
        }
        self.actuate(command, now)
    }

    /// Account for a completed timed run.
    pub fn record_run(&mut self, duration_minutes: u32, liters: f64, now: Timestamp) {
        self.last_run_duration = duration_minutes;
        self.total_water_usage += liters;
        self.last_updated = now;
    }

    fn actuate(&mut self, command: IrrigationCommand, now: Timestamp) -> bool {
        let target = command.target();
        if self.irrigation_on == target {
            return false;
        }
        self.irrigation_on = target;
        self.last_updated = now;
        true
    }
}
