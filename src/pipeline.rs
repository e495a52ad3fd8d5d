//! Pipeline orchestration
//!
//! This module provides the public API for Synheart Lumen. One tick runs:
//! 1. CircadianSelector - base intensity and color temperature for the time
//! 2. BiometricNormalizer - activity, stress and sleep debt signals
//! 3. TargetComposer - raw target clamped to the configured limits
//! 4. Smoother - dead-band and EWMA over successive raw targets
//!
//! The result is actuator-agnostic; `actuators` encodes it for a device.

use crate::actuators::{ActuatorKind, DeviceCommand};
use crate::circadian::CircadianSelector;
use crate::composer::TargetComposer;
use crate::config::LightingConfig;
use crate::error::LightingError;
use crate::normalizer::BiometricNormalizer;
use crate::smoother::{Smoother, SmootherState};
use crate::types::{
    CircadianBaseline, LightFrame, MetricsSnapshot, NormalizedSignals, RawTarget, TimeOfDay,
};

/// Compute the raw (unsmoothed) target for a snapshot at a time of day.
///
/// Stateless; use `LightingEngine` to smooth across ticks.
pub fn compute_raw_target(
    config: &LightingConfig,
    snapshot: &MetricsSnapshot,
    at: TimeOfDay,
) -> (CircadianBaseline, NormalizedSignals, RawTarget) {
    let baseline = CircadianSelector::baseline(&config.circadian, at);
    let signals = BiometricNormalizer::normalize(snapshot, &config.thresholds);
    let raw = TargetComposer::compose(&baseline, &signals, config);
    (baseline, signals, raw)
}

/// Engine state threaded through the polling loop.
///
/// Owns the immutable configuration and the one smoother whose state carries
/// across ticks. A tick never fails and never performs I/O.
pub struct LightingEngine {
    config: LightingConfig,
    smoother: Smoother,
}

impl LightingEngine {
    /// Create an engine from a configuration, validating it first
    pub fn new(config: LightingConfig) -> Result<Self, LightingError> {
        config.validate()?;
        for warning in config.warnings() {
            tracing::warn!(%warning, "configuration degraded");
        }

        let smoother = Smoother::new(&config.smoothing);
        Ok(Self { config, smoother })
    }

    /// Create an engine from a YAML configuration document
    pub fn from_yaml(yaml: &str) -> Result<Self, LightingError> {
        Self::new(LightingConfig::from_yaml_str(yaml)?)
    }

    pub fn config(&self) -> &LightingConfig {
        &self.config
    }

    pub fn smoother_state(&self) -> SmootherState {
        self.smoother.state()
    }

    /// Drop smoothing history; the next tick emits its raw target directly
    pub fn reset(&mut self) {
        self.smoother.reset();
    }

    /// Run one tick for a snapshot at a given time of day
    pub fn tick(&mut self, snapshot: &MetricsSnapshot, at: TimeOfDay) -> LightFrame {
        let (baseline, signals, raw) = compute_raw_target(&self.config, snapshot, at);
        let smoothed = self.smoother.step(raw);

        tracing::debug!(
            at = %at,
            period = %baseline.period,
            activity = signals.activity,
            stress = signals.stress,
            sleep_debt = signals.sleep_debt,
            raw_intensity = raw.intensity,
            raw_cct = raw.cct_kelvin,
            intensity = smoothed.intensity,
            cct = smoothed.cct_kelvin,
            "tick"
        );

        LightFrame {
            at,
            baseline,
            signals,
            raw,
            smoothed,
        }
    }

    /// Run one tick at the current local time
    pub fn tick_now(&mut self, snapshot: &MetricsSnapshot) -> LightFrame {
        self.tick(snapshot, TimeOfDay::now_local())
    }

    /// Run one tick and encode the smoothed target for an actuator
    pub fn tick_for(
        &mut self,
        snapshot: &MetricsSnapshot,
        at: TimeOfDay,
        actuator: ActuatorKind,
    ) -> (LightFrame, DeviceCommand) {
        let frame = self.tick(snapshot, at);
        let command = actuator.encoder().encode_target(&frame.smoothed);
        (frame, command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuators::{HueLightState, RgbColor};
    use crate::config::EXAMPLE_CONFIG_YAML;
    use crate::types::Period;

    fn engine() -> LightingEngine {
        LightingEngine::from_yaml(EXAMPLE_CONFIG_YAML).unwrap()
    }

    fn noon() -> TimeOfDay {
        "12:00".parse().unwrap()
    }

    fn stressed_snapshot() -> MetricsSnapshot {
        MetricsSnapshot {
            latest_hr: Some(140.0),
            stress_avg: Some(85.0),
            sleep_score: Some(40.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_compute_raw_target() {
        let config = LightingConfig::from_yaml_str(EXAMPLE_CONFIG_YAML).unwrap();
        let (baseline, signals, raw) = compute_raw_target(&config, &stressed_snapshot(), noon());

        assert_eq!(baseline.period, Period::Day);
        assert_eq!(signals.sleep_debt, 1.0);
        assert!((raw.intensity - 0.39928).abs() < 1e-9);
        assert!((raw.cct_kelvin - 3200.0).abs() < 1e-9);
    }

    #[test]
    fn test_first_tick_emits_raw() {
        let mut engine = engine();
        let frame = engine.tick(&stressed_snapshot(), noon());
        assert_eq!(frame.smoothed, frame.raw);
        assert!(matches!(engine.smoother_state(), SmootherState::Steady { .. }));
    }

    #[test]
    fn test_second_tick_is_smoothed() {
        let mut engine = engine();
        let calm = MetricsSnapshot::default();

        let first = engine.tick(&calm, noon());
        assert_eq!(first.smoothed.intensity, 0.8);

        let second = engine.tick(&stressed_snapshot(), noon());
        // 0.8 + 0.25 * (0.39928 - 0.8)
        assert!((second.smoothed.intensity - 0.69982).abs() < 1e-9);
        // 4000 + 0.25 * (3200 - 4000)
        assert!((second.smoothed.cct_kelvin - 3800.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_snapshot_follows_circadian_baseline() {
        let mut engine = engine();
        let frame = engine.tick(&MetricsSnapshot::default(), "23:30".parse().unwrap());
        assert_eq!(frame.baseline.period, Period::Night);
        assert_eq!(frame.smoothed.intensity, 0.2);
        assert_eq!(frame.smoothed.cct_kelvin, 2200.0);
    }

    #[test]
    fn test_reset() {
        let mut engine = engine();
        engine.tick(&MetricsSnapshot::default(), noon());
        engine.reset();
        assert_eq!(engine.smoother_state(), SmootherState::Uninitialized);

        let frame = engine.tick(&stressed_snapshot(), noon());
        assert_eq!(frame.smoothed, frame.raw);
    }

    #[test]
    fn test_tick_for_actuators() {
        let mut engine = engine();
        let (_, command) = engine.tick_for(&MetricsSnapshot::default(), noon(), ActuatorKind::Hue);
        assert_eq!(
            command,
            DeviceCommand::Hue(HueLightState {
                on: true,
                bri: 203,
                ct: 250
            })
        );

        let mut engine = LightingEngine::from_yaml(EXAMPLE_CONFIG_YAML).unwrap();
        let (_, command) =
            engine.tick_for(&MetricsSnapshot::default(), noon(), ActuatorKind::RgbStrip);
        // 4000K at 0.8
        assert_eq!(command, DeviceCommand::RgbStrip(RgbColor::new(204, 164, 132)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = LightingConfig::from_yaml_str(EXAMPLE_CONFIG_YAML).unwrap();
        config.smoothing.alpha = -0.5;
        assert!(LightingEngine::new(config).is_err());
    }
}
