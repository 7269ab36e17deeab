//! Telemetry — one timestamped reading from the field sensors.
//!
//! Samples are immutable once recorded and produced by an external
//! device (the IoT node posting to the ingestion endpoint). Every
//! reading is optional: a node with a broken or absent sensor still
//! reports the rest, and rules that depend on a missing field are
//! simply skipped during evaluation.

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// The closed set of telemetry attributes a rule condition may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TelemetryField {
    /// Soil moisture, percent.
    SoilMoisture,
    /// Air temperature, degrees Celsius.
    Temperature,
    /// Relative humidity, percent.
    Humidity,
    /// Ambient light, lux.
    Light,
    /// Water tank level, percent.
    WaterLevel,
}

impl TelemetryField {
    /// The wire/storage name of this field.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SoilMoisture => "soil_moisture",
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Light => "light",
            Self::WaterLevel => "water_level",
        }
    }
}

impl std::fmt::Display for TelemetryField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TelemetryField {
    type Err = ParseFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "soil_moisture" => Ok(Self::SoilMoisture),
            "temperature" => Ok(Self::Temperature),
            "humidity" => Ok(Self::Humidity),
            "light" => Ok(Self::Light),
            "water_level" => Ok(Self::WaterLevel),
            other => Err(ParseFieldError {
                token: other.to_string(),
            }),
        }
    }
}

/// A string did not name a known telemetry field.
#[derive(Debug, thiserror::Error)]
#[error("unknown telemetry field `{token}`")]
pub struct ParseFieldError {
    /// The rejected token.
    pub token: String,
}

/// One reading from the sensors, immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    /// Soil moisture, percent.
    pub soil_moisture: Option<f64>,
    /// Air temperature, degrees Celsius.
    pub temperature: Option<f64>,
    /// Relative humidity, percent.
    pub humidity: Option<f64>,
    /// Ambient light, lux.
    pub light: Option<f64>,
    /// Water tank level, percent.
    pub water_level: Option<f64>,
    /// When the reading was taken.
    #[serde(default = "crate::time::now")]
    pub timestamp: Timestamp,
}

impl TelemetrySample {
    /// Create a builder for constructing a [`TelemetrySample`].
    #[must_use]
    pub fn builder() -> TelemetrySampleBuilder {
        TelemetrySampleBuilder::default()
    }

    /// Look up the value of a telemetry attribute, `None` when the
    /// sample omits it.
    #[must_use]
    pub fn value_of(&self, field: TelemetryField) -> Option<f64> {
        match field {
            TelemetryField::SoilMoisture => self.soil_moisture,
            TelemetryField::Temperature => self.temperature,
            TelemetryField::Humidity => self.humidity,
            TelemetryField::Light => self.light,
            TelemetryField::WaterLevel => self.water_level,
        }
    }
}

/// Step-by-step builder for [`TelemetrySample`].
///
/// There are no invariants to enforce; the builder exists so call sites
/// (and tests) name only the readings they have.
#[derive(Debug)]
pub struct TelemetrySampleBuilder {
    soil_moisture: Option<f64>,
    temperature: Option<f64>,
    humidity: Option<f64>,
    light: Option<f64>,
    water_level: Option<f64>,
    timestamp: Option<Timestamp>,
}

impl Default for TelemetrySampleBuilder {
    fn default() -> Self {
        Self {
            soil_moisture: None,
            temperature: None,
            humidity: None,
            light: None,
            water_level: None,
            timestamp: None,
        }
    }
}

impl TelemetrySampleBuilder {
    #[must_use]
    pub fn soil_moisture(mut self, value: f64) -> Self {
        self.soil_moisture = Some(value);
        self
    }

    #[must_use]
    pub fn temperature(mut self, value: f64) -> Self {
        self.temperature = Some(value);
        self
    }

    #[must_use]
    pub fn humidity(mut self, value: f64) -> Self {
        self.humidity = Some(value);
        self
    }

    #[must_use]
    pub fn light(mut self, value: f64) -> Self {
        self.light = Some(value);
        self
    }

    #[must_use]
    pub fn water_level(mut self, value: f64) -> Self {
        self.water_level = Some(value);
        self
    }

    #[must_use]
    pub fn timestamp(mut self, ts: Timestamp) -> Self {
        self.timestamp = Some(ts);
        self
    }

    /// Consume the builder and return a [`TelemetrySample`].
    ///
    /// The timestamp defaults to the current time when not supplied.
    #[must_use]
    pub fn build(self) -> TelemetrySample {
        TelemetrySample {
            soil_moisture: self.soil_moisture,
            temperature: self.temperature,
            humidity: self.humidity,
            light: self.light,
            water_level: self.water_level,
            timestamp: self.timestamp.unwrap_or_else(crate::time::now),
        }
    }
}
