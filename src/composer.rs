//! Target composition
//!
//! Combines the circadian baseline with normalized signals. Intensity effects
//! compound multiplicatively; color temperature effects are linear Kelvin
//! offsets around the baseline. Both channels are clamped to the configured
//! limits.

use crate::config::LightingConfig;
use crate::normalizer::clamp;
use crate::types::{CircadianBaseline, NormalizedSignals, RawTarget};

/// Composer for raw lighting targets
pub struct TargetComposer;

impl TargetComposer {
    pub fn compose(
        baseline: &CircadianBaseline,
        signals: &NormalizedSignals,
        config: &LightingConfig,
    ) -> RawTarget {
        let weights = &config.weights;
        let limits = &config.limits;
        let shifts = &config.cct_shifts;

        let intensity = baseline.intensity
            * (1.0 + weights.activity_boost * signals.activity)
            * (1.0 - weights.stress_calm * signals.stress)
            * (1.0 - weights.sleep_debt * signals.sleep_debt);
        let intensity = clamp(intensity, limits.intensity_min, limits.intensity_max);

        let cct = baseline.cct_kelvin + shifts.activity * signals.activity
            - shifts.stress * signals.stress
            - shifts.sleep_debt * signals.sleep_debt;
        let cct = clamp(cct, limits.cct_min, limits.cct_max);

        RawTarget::new(intensity, cct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EXAMPLE_CONFIG_YAML;
    use crate::types::Period;

    fn config() -> LightingConfig {
        LightingConfig::from_yaml_str(EXAMPLE_CONFIG_YAML).unwrap()
    }

    fn day_baseline() -> CircadianBaseline {
        CircadianBaseline {
            period: Period::Day,
            intensity: 0.8,
            cct_kelvin: 4000.0,
            fallback: false,
        }
    }

    fn signals(activity: f64, stress: f64, sleep_debt: f64) -> NormalizedSignals {
        NormalizedSignals {
            activity,
            stress,
            sleep_debt,
            quality_flags: vec![],
        }
    }

    #[test]
    fn test_neutral_signals_keep_baseline() {
        let target =
            TargetComposer::compose(&day_baseline(), &NormalizedSignals::neutral(), &config());
        assert_eq!(target.intensity, 0.8);
        assert_eq!(target.cct_kelvin, 4000.0);
    }

    #[test]
    fn test_reference_scenario() {
        let target = TargetComposer::compose(&day_baseline(), &signals(0.8, 0.85, 1.0), &config());

        // 0.8 * 1.24 * 0.575 * 0.7
        assert!((target.intensity - 0.39928).abs() < 1e-9);
        assert!((target.cct_kelvin - 3200.0).abs() < 1e-9);
    }

    #[test]
    fn test_activity_cools_and_brightens() {
        let target = TargetComposer::compose(&day_baseline(), &signals(1.0, 0.0, 0.0), &config());
        assert!((target.intensity - 1.0).abs() < 1e-12);
        assert_eq!(target.cct_kelvin, 4600.0);
    }

    #[test]
    fn test_clamped_to_limits() {
        let mut config = config();
        config.limits.intensity_max = 0.9;
        config.limits.cct_max = 4200.0;
        config.weights.activity_boost = 2.0;

        let target = TargetComposer::compose(&day_baseline(), &signals(1.0, 0.0, 0.0), &config);
        assert_eq!(target.intensity, 0.9);
        assert_eq!(target.cct_kelvin, 4200.0);

        // heavy calming weight would go negative without the floor
        config.weights.stress_calm = 3.0;
        let target = TargetComposer::compose(&day_baseline(), &signals(0.0, 1.0, 1.0), &config);
        assert_eq!(target.intensity, config.limits.intensity_min);
        assert_eq!(target.cct_kelvin, 4000.0 - 800.0 - 600.0);
    }

    #[test]
    fn test_custom_shifts() {
        let mut config = config();
        config.cct_shifts.stress = 400.0;
        let target = TargetComposer::compose(&day_baseline(), &signals(0.0, 0.5, 0.0), &config);
        assert_eq!(target.cct_kelvin, 3800.0);
    }
}
