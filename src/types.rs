//! Core types for the Synheart Lumen engine
//!
//! This module defines the data structures that flow through each stage of a
//! tick: metrics snapshot, normalized signals, circadian baseline, raw and
//! smoothed light targets, and the frame that bundles them.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::LightingError;

/// Seconds in one wall-clock day
pub const SECONDS_PER_DAY: u32 = 86_400;

/// Wall-clock time of day with one-second resolution.
///
/// Stored as seconds since local midnight, always in `0..86_400`. Parses from
/// and serializes to `"HH:MM"` (or `"HH:MM:SS"` when seconds are non-zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeOfDay(u32);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);

    /// Build from hour, minute and second components
    pub fn from_hms(hour: u32, minute: u32, second: u32) -> Result<Self, LightingError> {
        if hour >= 24 || minute >= 60 || second >= 60 {
            return Err(LightingError::InvalidTime(format!(
                "{:02}:{:02}:{:02}",
                hour, minute, second
            )));
        }
        Ok(Self(hour * 3600 + minute * 60 + second))
    }

    /// Build from seconds since midnight, wrapping at 24h
    pub fn from_seconds(seconds: u32) -> Self {
        Self(seconds % SECONDS_PER_DAY)
    }

    /// Build from minutes since midnight, wrapping at 24h
    pub fn from_minutes(minutes: u32) -> Self {
        Self::from_seconds(minutes.wrapping_mul(60))
    }

    /// Current local wall-clock time
    pub fn now_local() -> Self {
        chrono::Local::now().time().into()
    }

    pub fn seconds(&self) -> u32 {
        self.0
    }

    pub fn hour(&self) -> u32 {
        self.0 / 3600
    }

    pub fn minute(&self) -> u32 {
        (self.0 % 3600) / 60
    }

    pub fn second(&self) -> u32 {
        self.0 % 60
    }
}

impl From<NaiveTime> for TimeOfDay {
    fn from(time: NaiveTime) -> Self {
        Self(time.num_seconds_from_midnight())
    }
}

impl FromStr for TimeOfDay {
    type Err = LightingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LightingError::InvalidTime(s.to_string());

        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.len() < 2 || parts.len() > 3 {
            return Err(invalid());
        }

        let mut fields = [0u32; 3];
        for (slot, part) in fields.iter_mut().zip(&parts) {
            if part.is_empty() || part.len() > 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            *slot = part.parse().map_err(|_| invalid())?;
        }

        Self::from_hms(fields[0], fields[1], fields[2]).map_err(|_| invalid())
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.second() == 0 {
            write!(f, "{:02}:{:02}", self.hour(), self.minute())
        } else {
            write!(
                f,
                "{:02}:{:02}:{:02}",
                self.hour(),
                self.minute(),
                self.second()
            )
        }
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Circadian period of the day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Morning,
    Day,
    Evening,
    Night,
}

impl Period {
    /// Periods in clock order, starting from morning
    pub const ALL: [Period; 4] = [Period::Morning, Period::Day, Period::Evening, Period::Night];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Morning => "morning",
            Period::Day => "day",
            Period::Evening => "evening",
            Period::Night => "night",
        }
    }

    /// The period whose start closes this period's window
    pub fn next(&self) -> Period {
        match self {
            Period::Morning => Period::Day,
            Period::Day => Period::Evening,
            Period::Evening => Period::Night,
            Period::Night => Period::Morning,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metric carried by a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricField {
    LatestHr,
    StressAvg,
    SleepScore,
}

impl MetricField {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricField::LatestHr => "latest_hr",
            MetricField::StressAvg => "stress_avg",
            MetricField::SleepScore => "sleep_score",
        }
    }
}

/// Latest biometric snapshot, produced by an external collaborator.
///
/// Every metric is optional: a missing key, a `null`, or a present value that
/// is not a finite number all decode to `None`. Values of the last kind are
/// recorded in `rejected` so callers can report them. `rejected` is computed
/// during decoding and never read from the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSnapshot")]
pub struct MetricsSnapshot {
    /// Most recent heart rate (bpm)
    pub latest_hr: Option<f64>,
    /// Recent average stress (0-100)
    pub stress_avg: Option<f64>,
    /// Vendor sleep score (vendor-defined scale)
    pub sleep_score: Option<f64>,
    /// Producer timestamp, passed through untouched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Metrics that were present but not numeric
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<MetricField>,
}

impl MetricsSnapshot {
    /// Decode a snapshot JSON document.
    ///
    /// Fails only when the document is not a JSON object; individual metric
    /// problems degrade to "no measurement".
    pub fn from_json(json: &str) -> Result<Self, LightingError> {
        serde_json::from_str(json).map_err(|e| LightingError::SnapshotError(e.to_string()))
    }
}

/// Snapshots decode from any JSON object; unknown keys are ignored
type RawSnapshot = serde_json::Map<String, serde_json::Value>;

impl From<RawSnapshot> for MetricsSnapshot {
    fn from(mut raw: RawSnapshot) -> Self {
        // Derived from the metric fields only; an input `rejected` key is ignored
        let mut rejected: Vec<MetricField> = Vec::new();

        let latest_hr = read_metric(raw.remove("latest_hr"), MetricField::LatestHr, &mut rejected);
        let stress_avg =
            read_metric(raw.remove("stress_avg"), MetricField::StressAvg, &mut rejected);
        let sleep_score =
            read_metric(raw.remove("sleep_score"), MetricField::SleepScore, &mut rejected);

        let timestamp = match raw.remove("timestamp") {
            Some(serde_json::Value::String(s)) => Some(s),
            _ => None,
        };

        Self {
            latest_hr,
            stress_avg,
            sleep_score,
            timestamp,
            rejected,
        }
    }
}

fn read_metric(
    value: Option<serde_json::Value>,
    field: MetricField,
    rejected: &mut Vec<MetricField>,
) -> Option<f64> {
    match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::Number(n)) => match n.as_f64() {
            Some(v) if v.is_finite() => Some(v),
            _ => {
                reject(field, rejected);
                None
            }
        },
        Some(other) => {
            tracing::warn!(metric = field.as_str(), value = %other, "ignoring non-numeric metric");
            reject(field, rejected);
            None
        }
    }
}

fn reject(field: MetricField, rejected: &mut Vec<MetricField>) {
    if !rejected.contains(&field) {
        rejected.push(field);
    }
}

/// Quality flag attached to normalized signals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityFlag {
    MissingHeartRate,
    MissingStress,
    MissingSleepScore,
    InvalidHeartRate,
    InvalidStress,
    InvalidSleepScore,
    DegenerateHeartRateBounds,
}

/// Biometric signals scaled to [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSignals {
    /// Physical activity derived from heart rate
    pub activity: f64,
    /// Stress level
    pub stress: f64,
    /// 0 = well rested, 1 = poorly rested
    pub sleep_debt: f64,
    /// Flags for missing or rejected inputs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quality_flags: Vec<QualityFlag>,
}

impl NormalizedSignals {
    /// Signals with no effect on the baseline
    pub fn neutral() -> Self {
        Self {
            activity: 0.0,
            stress: 0.0,
            sleep_debt: 0.0,
            quality_flags: Vec::new(),
        }
    }
}

/// Baseline selected from the circadian schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircadianBaseline {
    pub period: Period,
    pub intensity: f64,
    pub cct_kelvin: f64,
    /// True when no window matched and the night period was used
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub fallback: bool,
}

/// Lighting target: relative intensity plus color temperature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightTarget {
    /// Relative intensity within the configured limits (0-1)
    pub intensity: f64,
    /// Correlated color temperature (Kelvin)
    pub cct_kelvin: f64,
}

impl LightTarget {
    pub fn new(intensity: f64, cct_kelvin: f64) -> Self {
        Self {
            intensity,
            cct_kelvin,
        }
    }
}

/// Composed target before temporal smoothing
pub type RawTarget = LightTarget;

/// Target after dead-band and exponential smoothing
pub type SmoothedTarget = LightTarget;

/// Everything one engine tick computed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightFrame {
    /// Wall-clock time the baseline was selected for
    pub at: TimeOfDay,
    pub baseline: CircadianBaseline,
    pub signals: NormalizedSignals,
    pub raw: RawTarget,
    pub smoothed: SmoothedTarget,
}
