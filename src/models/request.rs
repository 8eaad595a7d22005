use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

use crate::utils::{parse_iso8601, TimestampError};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FixtureError {
    #[error("station_id must not be empty")]
    EmptyStationId,
    #[error("forecasted_demand must be positive, got {0}")]
    NonPositiveDemand(f64),
    #[error("{field} must be within 0-100, got {value}")]
    PercentOutOfRange { field: &'static str, value: f64 },
    #[error("delivery_window.{bound} is not a valid timestamp")]
    InvalidWindowTimestamp {
        bound: &'static str,
        #[source]
        source: TimestampError,
    },
    #[error("delivery_window start {start} is after end {end}")]
    InvertedWindow { start: String, end: String },
    #[error("invalid optimization mode: {0:?}")]
    UnrecognizedMode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemandUnit {
    Liters,
    Gallons,
}

impl DemandUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            DemandUnit::Liters => "liters",
            DemandUnit::Gallons => "gallons",
        }
    }
}

impl fmt::Display for DemandUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strategy the requester asks the API to optimise for.
///
/// Values outside the documented set are kept verbatim in `Unrecognized` so a
/// malformed fixture can be reported instead of failing to deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OptimizationMode {
    Cost,
    Availability,
    Balanced,
    Unrecognized(String),
}

impl OptimizationMode {
    pub fn as_str(&self) -> &str {
        match self {
            OptimizationMode::Cost => "Cost",
            OptimizationMode::Availability => "Availability",
            OptimizationMode::Balanced => "Balanced",
            OptimizationMode::Unrecognized(mode) => mode,
        }
    }
}

impl From<String> for OptimizationMode {
    fn from(mode: String) -> Self {
        match mode.as_str() {
            "Cost" => OptimizationMode::Cost,
            "Availability" => OptimizationMode::Availability,
            "Balanced" => OptimizationMode::Balanced,
            _ => OptimizationMode::Unrecognized(mode),
        }
    }
}

impl From<OptimizationMode> for String {
    fn from(mode: OptimizationMode) -> Self {
        match mode {
            OptimizationMode::Unrecognized(mode) => mode,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for OptimizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive range a delivery may be scheduled in. Bounds are kept as sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryWindow {
    pub start: String,
    pub end: String,
}

impl DeliveryWindow {
    pub fn new(start: &str, end: &str) -> Self {
        Self {
            start: start.to_string(),
            end: end.to_string(),
        }
    }

    pub fn bounds(&self) -> Result<(NaiveDateTime, NaiveDateTime), FixtureError> {
        let start = parse_iso8601(&self.start)
            .map_err(|source| FixtureError::InvalidWindowTimestamp { bound: "start", source })?;
        let end = parse_iso8601(&self.end)
            .map_err(|source| FixtureError::InvalidWindowTimestamp { bound: "end", source })?;
        Ok((start, end))
    }

    pub fn contains(&self, at: NaiveDateTime) -> Result<bool, FixtureError> {
        let (start, end) = self.bounds()?;
        Ok(start <= at && at <= end)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRequest {
    pub station_id: String,
    #[serde(serialize_with = "serialize_number")]
    pub forecasted_demand: f64,
    pub demand_unit: DemandUnit,
    pub delivery_window: DeliveryWindow,
    #[serde(serialize_with = "serialize_number")]
    pub tank_level_percent: f64,
    #[serde(serialize_with = "serialize_number")]
    pub tank_level_threshold: f64,
    pub optimization_mode: OptimizationMode,
}

impl AllocationRequest {
    pub fn with_station(mut self, station_id: &str) -> Self {
        self.station_id = station_id.to_string();
        self
    }

    pub fn with_demand_unit(mut self, unit: DemandUnit) -> Self {
        self.demand_unit = unit;
        self
    }

    pub fn with_optimization_mode(mut self, mode: OptimizationMode) -> Self {
        self.optimization_mode = mode;
        self
    }

    /// Check the request against its own invariants before it is sent.
    pub fn validate(&self) -> Result<(), FixtureError> {
        if self.station_id.trim().is_empty() {
            return Err(FixtureError::EmptyStationId);
        }
        if self.forecasted_demand.is_nan() || self.forecasted_demand <= 0.0 {
            return Err(FixtureError::NonPositiveDemand(self.forecasted_demand));
        }
        for (field, value) in [
            ("tank_level_percent", self.tank_level_percent),
            ("tank_level_threshold", self.tank_level_threshold),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(FixtureError::PercentOutOfRange { field, value });
            }
        }
        let (start, end) = self.delivery_window.bounds()?;
        if start > end {
            return Err(FixtureError::InvertedWindow {
                start: self.delivery_window.start.clone(),
                end: self.delivery_window.end.clone(),
            });
        }
        if let OptimizationMode::Unrecognized(mode) = &self.optimization_mode {
            return Err(FixtureError::UnrecognizedMode(mode.clone()));
        }
        Ok(())
    }
}

// Integral values go out as JSON integers, matching how fixtures are written.
fn serialize_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}
