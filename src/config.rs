//! Engine configuration
//!
//! The configuration is loaded once per process and never mutated. Serde
//! enforces that every required key is present; `validate` rejects values the
//! engine cannot work with. Inconsistencies the engine can degrade around
//! (overlapping circadian windows, degenerate thresholds) are reported by
//! `warnings` instead of failing the load.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LightingError;
use crate::types::{Period, TimeOfDay, SECONDS_PER_DAY};

/// Default EWMA coefficient
pub const DEFAULT_ALPHA: f64 = 0.25;

/// Default dead-band width
pub const DEFAULT_HYSTERESIS: f64 = 0.04;

/// Reference configuration, also printed by `lumen schema config`
pub const EXAMPLE_CONFIG_YAML: &str = r#"circadian:
  morning: { start: "06:30", intensity: 0.6, cct: 4500 }
  day: { start: "09:00", intensity: 0.8, cct: 4000 }
  evening: { start: "18:30", intensity: 0.5, cct: 3000 }
  night: { start: "22:00", intensity: 0.2, cct: 2200 }
thresholds:
  hr_rest: 60
  hr_high: 160
  sleep_good: 80
  sleep_poor: 50
weights:
  activity_boost: 0.3
  stress_calm: 0.5
  sleep_debt: 0.3
limits:
  intensity_min: 0.05
  intensity_max: 1.0
  cct_min: 2000
  cct_max: 6500
smoothing:
  alpha: 0.25
  hysteresis: 0.04
"#;

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LightingConfig {
    pub circadian: CircadianConfig,
    pub thresholds: Thresholds,
    pub weights: Weights,
    pub limits: Limits,
    pub smoothing: SmoothingConfig,
    /// Kelvin offsets applied per unit of each signal
    #[serde(default)]
    pub cct_shifts: CctShifts,
}

/// One circadian period: when it starts and what it looks like
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CircadianPeriod {
    pub start: TimeOfDay,
    /// Base intensity (0-1)
    pub intensity: f64,
    /// Base color temperature (Kelvin)
    pub cct: f64,
}

/// Four-period circadian schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CircadianConfig {
    pub morning: CircadianPeriod,
    pub day: CircadianPeriod,
    pub evening: CircadianPeriod,
    pub night: CircadianPeriod,
}

impl CircadianConfig {
    pub fn period(&self, period: Period) -> &CircadianPeriod {
        match period {
            Period::Morning => &self.morning,
            Period::Day => &self.day,
            Period::Evening => &self.evening,
            Period::Night => &self.night,
        }
    }

    /// Window of a period: from its own start to the next period's start
    pub fn window(&self, period: Period) -> (TimeOfDay, TimeOfDay) {
        (
            self.period(period).start,
            self.period(period.next()).start,
        )
    }

    /// Check that the four windows partition the 24-hour clock.
    ///
    /// Each window covers the cyclic distance from its start to the next
    /// start. The windows partition the day exactly when those distances add
    /// up to 24 hours; any other total means overlaps or gaps.
    pub fn check_windows(&self) -> Vec<WindowIssue> {
        let mut issues = Vec::new();
        let mut total: u32 = 0;

        for period in Period::ALL {
            let (start, end) = self.window(period);
            let length = (end.seconds() + SECONDS_PER_DAY - start.seconds()) % SECONDS_PER_DAY;
            if length == 0 {
                issues.push(WindowIssue::EmptyWindow(period));
            }
            total += length;
        }

        if total != SECONDS_PER_DAY {
            issues.insert(0, WindowIssue::Misordered);
        }

        issues
    }
}

/// Problem found in the circadian schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowIssue {
    /// Starts are not in morning → day → evening → night order
    Misordered,
    /// The period starts where the next one starts, so it is never selected
    EmptyWindow(Period),
}

impl fmt::Display for WindowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowIssue::Misordered => write!(
                f,
                "circadian windows overlap or leave gaps; unmatched times fall back to night"
            ),
            WindowIssue::EmptyWindow(period) => {
                write!(f, "circadian period '{}' has an empty window", period)
            }
        }
    }
}

/// Normalization bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Thresholds {
    /// Heart rate mapped to zero activity (bpm)
    pub hr_rest: f64,
    /// Heart rate mapped to full activity (bpm)
    pub hr_high: f64,
    /// Sleep score at or above which there is no sleep debt
    pub sleep_good: f64,
    /// Sleep score at or below which sleep debt is total
    pub sleep_poor: f64,
}

/// Unitless adjustment coefficients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Weights {
    pub activity_boost: f64,
    pub stress_calm: f64,
    pub sleep_debt: f64,
}

/// Output limits applied to every raw target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Limits {
    pub intensity_min: f64,
    pub intensity_max: f64,
    pub cct_min: f64,
    pub cct_max: f64,
}

/// Temporal smoothing parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SmoothingConfig {
    /// EWMA coefficient in (0, 1]; 1 disables smoothing
    pub alpha: f64,
    /// Dead-band width; relative to the previous value for color temperature
    pub hysteresis: f64,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            hysteresis: DEFAULT_HYSTERESIS,
        }
    }
}

/// Kelvin shift per unit of each normalized signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CctShifts {
    /// Cooler with activity
    pub activity: f64,
    /// Warmer with stress
    pub stress: f64,
    /// Warmer with sleep debt
    pub sleep_debt: f64,
}

impl Default for CctShifts {
    fn default() -> Self {
        Self {
            activity: 600.0,
            stress: 800.0,
            sleep_debt: 600.0,
        }
    }
}

/// Degrade-only configuration problem
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigWarning {
    Window(WindowIssue),
    /// `hr_rest == hr_high`: activity is always 0
    DegenerateHeartRateBounds,
    /// `sleep_good < sleep_poor`: sleep debt only ever takes 0 or 1
    InvertedSleepBounds,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::Window(issue) => issue.fmt(f),
            ConfigWarning::DegenerateHeartRateBounds => {
                write!(f, "hr_rest equals hr_high; activity will always be 0")
            }
            ConfigWarning::InvertedSleepBounds => {
                write!(f, "sleep_good is below sleep_poor; sleep debt will not interpolate")
            }
        }
    }
}

impl LightingConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self, LightingError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, LightingError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file; `.json` files are read as JSON, anything else as YAML
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LightingError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_yaml_str(&contents)
        }
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<(), LightingError> {
        let mut problems: Vec<String> = Vec::new();

        let mut finite = |name: String, value: f64| {
            if !value.is_finite() {
                problems.push(format!("{} must be a finite number", name));
            }
        };

        for period in Period::ALL {
            let p = self.circadian.period(period);
            finite(format!("circadian.{}.intensity", period), p.intensity);
            finite(format!("circadian.{}.cct", period), p.cct);
        }
        finite("thresholds.hr_rest".into(), self.thresholds.hr_rest);
        finite("thresholds.hr_high".into(), self.thresholds.hr_high);
        finite("thresholds.sleep_good".into(), self.thresholds.sleep_good);
        finite("thresholds.sleep_poor".into(), self.thresholds.sleep_poor);
        finite("weights.activity_boost".into(), self.weights.activity_boost);
        finite("weights.stress_calm".into(), self.weights.stress_calm);
        finite("weights.sleep_debt".into(), self.weights.sleep_debt);
        finite("cct_shifts.activity".into(), self.cct_shifts.activity);
        finite("cct_shifts.stress".into(), self.cct_shifts.stress);
        finite("cct_shifts.sleep_debt".into(), self.cct_shifts.sleep_debt);

        for period in Period::ALL {
            let p = self.circadian.period(period);
            if p.intensity < 0.0 {
                problems.push(format!("circadian.{}.intensity must not be negative", period));
            }
            if p.cct <= 0.0 {
                problems.push(format!("circadian.{}.cct must be positive", period));
            }
        }

        let limits = &self.limits;
        if !(0.0..=1.0).contains(&limits.intensity_min)
            || !(0.0..=1.0).contains(&limits.intensity_max)
        {
            problems.push("limits.intensity_min and intensity_max must lie in [0, 1]".into());
        }
        if limits.intensity_min > limits.intensity_max {
            problems.push("limits.intensity_min exceeds intensity_max".into());
        }
        if !(limits.cct_min.is_finite() && limits.cct_min > 0.0)
            || !(limits.cct_max.is_finite() && limits.cct_max > 0.0)
        {
            problems.push("limits.cct_min and cct_max must be positive Kelvin values".into());
        }
        if limits.cct_min > limits.cct_max {
            problems.push("limits.cct_min exceeds cct_max".into());
        }

        let smoothing = &self.smoothing;
        if !(smoothing.alpha > 0.0 && smoothing.alpha <= 1.0) {
            problems.push(format!(
                "smoothing.alpha must be in (0, 1], got {}",
                smoothing.alpha
            ));
        }
        if !(smoothing.hysteresis.is_finite() && smoothing.hysteresis >= 0.0) {
            problems.push(format!(
                "smoothing.hysteresis must be a non-negative number, got {}",
                smoothing.hysteresis
            ));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(LightingError::InvalidConfig(problems.join("; ")))
        }
    }

    /// Problems the engine degrades around rather than rejects
    pub fn warnings(&self) -> Vec<ConfigWarning> {
        let mut warnings: Vec<ConfigWarning> = self
            .circadian
            .check_windows()
            .into_iter()
            .map(ConfigWarning::Window)
            .collect();

        if self.thresholds.hr_rest == self.thresholds.hr_high {
            warnings.push(ConfigWarning::DegenerateHeartRateBounds);
        }
        if self.thresholds.sleep_good < self.thresholds.sleep_poor {
            warnings.push(ConfigWarning::InvertedSleepBounds);
        }

        warnings
    }
}
