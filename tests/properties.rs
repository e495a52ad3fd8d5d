//! Property-based tests using proptest
//!
//! These tests check the bounds and ordering guarantees of the pipeline
//! stages for arbitrary inputs.

use proptest::prelude::*;
use synheart_lumen::actuators::{
    intensity_to_bri, kelvin_to_mired, kelvin_to_rgb, BRI_MAX, BRI_MIN, MIRED_MAX, MIRED_MIN,
};
use synheart_lumen::circadian::{in_window, CircadianSelector};
use synheart_lumen::composer::TargetComposer;
use synheart_lumen::config::{LightingConfig, SmoothingConfig, EXAMPLE_CONFIG_YAML};
use synheart_lumen::normalizer::{clamp, normalize, sleep_debt};
use synheart_lumen::smoother::Smoother;
use synheart_lumen::types::{CircadianBaseline, NormalizedSignals, Period, TimeOfDay};
use synheart_lumen::LightTarget;

fn example_config() -> LightingConfig {
    LightingConfig::from_yaml_str(EXAMPLE_CONFIG_YAML).unwrap()
}

// ============================================================================
// Normalization
// ============================================================================

proptest! {
    #[test]
    fn test_clamp_stays_in_range(x in -1e6f64..1e6, lo in -100.0f64..0.0, span in 0.0f64..100.0) {
        let hi = lo + span;
        let y = clamp(x, lo, hi);
        prop_assert!(lo <= y && y <= hi, "{} not in [{}, {}]", y, lo, hi);
    }

    #[test]
    fn test_clamp_idempotent(x in -1e6f64..1e6, lo in -100.0f64..0.0, span in 0.0f64..100.0) {
        let hi = lo + span;
        let once = clamp(x, lo, hi);
        prop_assert_eq!(clamp(once, lo, hi), once);
    }

    #[test]
    fn test_normalize_unit_range(x in -1e4f64..1e4, lo in 0.0f64..100.0, span in 1.0f64..200.0) {
        let y = normalize(Some(x), lo, lo + span);
        prop_assert!((0.0..=1.0).contains(&y));
    }

    #[test]
    fn test_normalize_monotonic(
        a in 0.0f64..250.0,
        delta in 0.0f64..250.0,
        lo in 0.0f64..100.0,
        span in 1.0f64..200.0
    ) {
        let hi = lo + span;
        prop_assert!(normalize(Some(a), lo, hi) <= normalize(Some(a + delta), lo, hi));
    }

    #[test]
    fn test_normalize_endpoints(lo in 0.0f64..100.0, span in 1.0f64..200.0) {
        let hi = lo + span;
        prop_assert_eq!(normalize(Some(lo), lo, hi), 0.0);
        prop_assert_eq!(normalize(Some(hi), lo, hi), 1.0);
        prop_assert_eq!(normalize(None, lo, hi), 0.0);
    }

    #[test]
    fn test_sleep_debt_unit_range(score in -50.0f64..150.0, good in 50.0f64..100.0, gap in 0.0f64..50.0) {
        let debt = sleep_debt(Some(score), good, good - gap);
        prop_assert!((0.0..=1.0).contains(&debt));
    }
}

// ============================================================================
// Circadian Selection
// ============================================================================

proptest! {
    #[test]
    fn test_every_minute_in_exactly_one_window(minute in 0u32..1440) {
        let config = example_config();
        let t = TimeOfDay::from_minutes(minute);

        let matching: Vec<Period> = Period::ALL
            .into_iter()
            .filter(|&period| {
                let (start, end) = config.circadian.window(period);
                in_window(t, start, end)
            })
            .collect();

        prop_assert_eq!(matching.len(), 1, "minute {} matched {:?}", minute, matching);
        prop_assert_eq!(CircadianSelector::period_at(&config.circadian, t), Some(matching[0]));
    }
}

// ============================================================================
// Composition and Smoothing
// ============================================================================

proptest! {
    #[test]
    fn test_composed_target_within_limits(
        activity in 0.0f64..=1.0,
        stress in 0.0f64..=1.0,
        debt in 0.0f64..=1.0,
        base_intensity in 0.0f64..=1.0,
        base_cct in 1500.0f64..8000.0
    ) {
        let config = example_config();
        let baseline = CircadianBaseline {
            period: Period::Day,
            intensity: base_intensity,
            cct_kelvin: base_cct,
            fallback: false,
        };
        let signals = NormalizedSignals {
            activity,
            stress,
            sleep_debt: debt,
            quality_flags: Vec::new(),
        };

        let raw = TargetComposer::compose(&baseline, &signals, &config);
        let limits = &config.limits;
        prop_assert!(limits.intensity_min <= raw.intensity && raw.intensity <= limits.intensity_max);
        prop_assert!(limits.cct_min <= raw.cct_kelvin && raw.cct_kelvin <= limits.cct_max);
    }

    #[test]
    fn test_smoothed_between_previous_and_raw(
        prev_i in 0.05f64..=1.0,
        prev_k in 2000.0f64..6500.0,
        raw_i in 0.05f64..=1.0,
        raw_k in 2000.0f64..6500.0,
        alpha in 0.01f64..=1.0
    ) {
        let mut smoother = Smoother::new(&SmoothingConfig { alpha, hysteresis: 0.04 });
        smoother.step(LightTarget::new(prev_i, prev_k));
        let out = smoother.step(LightTarget::new(raw_i, raw_k));

        let eps = 1e-9;
        prop_assert!(out.intensity >= prev_i.min(raw_i) - eps);
        prop_assert!(out.intensity <= prev_i.max(raw_i) + eps);
        prop_assert!(out.cct_kelvin >= prev_k.min(raw_k) - eps);
        prop_assert!(out.cct_kelvin <= prev_k.max(raw_k) + eps);
    }

    #[test]
    fn test_jitter_inside_band_is_held(
        prev_i in 0.1f64..0.9,
        jitter in -0.039f64..0.039
    ) {
        let mut smoother = Smoother::new(&SmoothingConfig { alpha: 0.25, hysteresis: 0.04 });
        smoother.step(LightTarget::new(prev_i, 4000.0));
        let out = smoother.step(LightTarget::new(prev_i + jitter, 4000.0));
        prop_assert_eq!(out.intensity, prev_i);
    }
}

// ============================================================================
// Actuator Encoding
// ============================================================================

proptest! {
    #[test]
    fn test_mired_in_bridge_range(kelvin in 1.0f64..100_000.0) {
        let mired = kelvin_to_mired(kelvin);
        prop_assert!((MIRED_MIN..=MIRED_MAX).contains(&mired));
    }

    #[test]
    fn test_mired_decreases_with_kelvin(kelvin in 1000.0f64..10_000.0, delta in 0.0f64..5000.0) {
        prop_assert!(kelvin_to_mired(kelvin + delta) <= kelvin_to_mired(kelvin));
    }

    #[test]
    fn test_bri_in_bridge_range(intensity in -1.0f64..2.0) {
        let bri = intensity_to_bri(intensity);
        prop_assert!((BRI_MIN..=BRI_MAX).contains(&bri));
    }

    #[test]
    fn test_warm_light_saturates_red(kelvin in 1000.0f64..6600.0) {
        prop_assert_eq!(kelvin_to_rgb(kelvin).r, 255);
    }

    #[test]
    fn test_scaling_never_brightens(kelvin in 1000.0f64..40_000.0, intensity in -1.0f64..2.0) {
        let full = kelvin_to_rgb(kelvin);
        let scaled = full.scaled(intensity);
        prop_assert!(scaled.r <= full.r && scaled.g <= full.g && scaled.b <= full.b);
    }
}
