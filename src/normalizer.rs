//! Biometric normalization
//!
//! This module turns a raw metrics snapshot into three signals on a 0-1 scale:
//! - Activity from heart rate between resting and high bounds
//! - Stress from the 0-100 stress average
//! - Sleep debt from the sleep score between good and poor bounds
//!
//! Every path is total. Missing metrics, rejected metrics and degenerate
//! bounds all produce a neutral 0 and a quality flag.

use crate::config::Thresholds;
use crate::types::{MetricField, MetricsSnapshot, NormalizedSignals, QualityFlag};

/// Upper bound of the vendor stress scale
pub const STRESS_SCALE_MAX: f64 = 100.0;

/// Clamp `x` into `[lo, hi]`.
///
/// Unlike `f64::clamp` this never panics: a NaN input yields `lo`, and an
/// inverted range yields `hi`.
pub fn clamp(x: f64, lo: f64, hi: f64) -> f64 {
    x.max(lo).min(hi)
}

/// Linear map of `x` from `[lo, hi]` onto `[0, 1]`, clamped.
///
/// Absent input and a zero-width range (`hi == lo`) both map to 0.
pub fn normalize(x: Option<f64>, lo: f64, hi: f64) -> f64 {
    match x {
        Some(x) if hi != lo => clamp((x - lo) / (hi - lo), 0.0, 1.0),
        _ => 0.0,
    }
}

/// Piecewise sleep debt: 0 when rested, 1 when poorly rested, linear between
pub fn sleep_debt(sleep_score: Option<f64>, sleep_good: f64, sleep_poor: f64) -> f64 {
    match sleep_score {
        None => 0.0,
        Some(score) if score >= sleep_good => 0.0,
        Some(score) if score <= sleep_poor => 1.0,
        Some(score) => normalize(Some(sleep_good - score), 0.0, sleep_good - sleep_poor),
    }
}

/// Normalizer for converting a metrics snapshot into normalized signals
pub struct BiometricNormalizer;

impl BiometricNormalizer {
    /// Normalize a snapshot against the configured thresholds
    pub fn normalize(snapshot: &MetricsSnapshot, thresholds: &Thresholds) -> NormalizedSignals {
        let mut quality_flags = Vec::new();

        // Activity from heart rate
        let activity = normalize(snapshot.latest_hr, thresholds.hr_rest, thresholds.hr_high);
        if snapshot.latest_hr.is_none() {
            quality_flags.push(missing_or_invalid(
                snapshot,
                MetricField::LatestHr,
                QualityFlag::MissingHeartRate,
                QualityFlag::InvalidHeartRate,
            ));
        } else if thresholds.hr_rest == thresholds.hr_high {
            quality_flags.push(QualityFlag::DegenerateHeartRateBounds);
        }

        // Stress is already on a 0-100 scale
        let stress = normalize(snapshot.stress_avg, 0.0, STRESS_SCALE_MAX);
        if snapshot.stress_avg.is_none() {
            quality_flags.push(missing_or_invalid(
                snapshot,
                MetricField::StressAvg,
                QualityFlag::MissingStress,
                QualityFlag::InvalidStress,
            ));
        }

        // Missing sleep score assumes a rested user
        let sleep_debt = sleep_debt(
            snapshot.sleep_score,
            thresholds.sleep_good,
            thresholds.sleep_poor,
        );
        if snapshot.sleep_score.is_none() {
            quality_flags.push(missing_or_invalid(
                snapshot,
                MetricField::SleepScore,
                QualityFlag::MissingSleepScore,
                QualityFlag::InvalidSleepScore,
            ));
        }

        NormalizedSignals {
            activity,
            stress,
            sleep_debt,
            quality_flags,
        }
    }
}

fn missing_or_invalid(
    snapshot: &MetricsSnapshot,
    field: MetricField,
    missing: QualityFlag,
    invalid: QualityFlag,
) -> QualityFlag {
    if snapshot.rejected.contains(&field) {
        invalid
    } else {
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn thresholds() -> Thresholds {
        Thresholds {
            hr_rest: 60.0,
            hr_high: 160.0,
            sleep_good: 80.0,
            sleep_poor: 50.0,
        }
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(-1.0, 0.0, 1.0), 0.0);
        assert_eq!(clamp(0.3, 0.0, 1.0), 0.3);
        assert_eq!(clamp(7.0, 0.0, 1.0), 1.0);
        assert_eq!(clamp(f64::NAN, 0.0, 1.0), 0.0);
    }

    #[test]
    fn test_normalize_bounds() {
        assert_eq!(normalize(Some(60.0), 60.0, 160.0), 0.0);
        assert_eq!(normalize(Some(160.0), 60.0, 160.0), 1.0);
        assert!((normalize(Some(140.0), 60.0, 160.0) - 0.8).abs() < 1e-12);
        assert_eq!(normalize(Some(40.0), 60.0, 160.0), 0.0);
        assert_eq!(normalize(Some(200.0), 60.0, 160.0), 1.0);
    }

    #[test]
    fn test_normalize_absent_and_degenerate() {
        assert_eq!(normalize(None, 60.0, 160.0), 0.0);
        assert_eq!(normalize(Some(100.0), 70.0, 70.0), 0.0);
    }

    #[test]
    fn test_sleep_debt_piecewise() {
        assert_eq!(sleep_debt(None, 80.0, 50.0), 0.0);
        assert_eq!(sleep_debt(Some(90.0), 80.0, 50.0), 0.0);
        assert_eq!(sleep_debt(Some(80.0), 80.0, 50.0), 0.0);
        assert_eq!(sleep_debt(Some(50.0), 80.0, 50.0), 1.0);
        assert_eq!(sleep_debt(Some(40.0), 80.0, 50.0), 1.0);
        assert!((sleep_debt(Some(65.0), 80.0, 50.0) - 0.5).abs() < 1e-12);
        assert!((sleep_debt(Some(71.0), 80.0, 50.0) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_full_snapshot() {
        let snapshot = MetricsSnapshot {
            latest_hr: Some(140.0),
            stress_avg: Some(85.0),
            sleep_score: Some(40.0),
            ..Default::default()
        };
        let signals = BiometricNormalizer::normalize(&snapshot, &thresholds());

        assert!((signals.activity - 0.8).abs() < 1e-12);
        assert!((signals.stress - 0.85).abs() < 1e-12);
        assert_eq!(signals.sleep_debt, 1.0);
        assert!(signals.quality_flags.is_empty());
    }

    #[test]
    fn test_empty_snapshot_is_neutral() {
        let signals = BiometricNormalizer::normalize(&MetricsSnapshot::default(), &thresholds());

        assert_eq!(signals.activity, 0.0);
        assert_eq!(signals.stress, 0.0);
        assert_eq!(signals.sleep_debt, 0.0);
        assert_eq!(
            signals.quality_flags,
            vec![
                QualityFlag::MissingHeartRate,
                QualityFlag::MissingStress,
                QualityFlag::MissingSleepScore,
            ]
        );
    }

    #[test]
    fn test_rejected_metric_flagged_as_invalid() {
        let snapshot = MetricsSnapshot::from_json(
            r#"{"latest_hr": 100, "stress_avg": "high", "sleep_score": 85}"#,
        )
        .unwrap();
        let signals = BiometricNormalizer::normalize(&snapshot, &thresholds());

        assert_eq!(signals.stress, 0.0);
        assert_eq!(signals.quality_flags, vec![QualityFlag::InvalidStress]);
    }

    #[test]
    fn test_degenerate_heart_rate_bounds() {
        let mut thresholds = thresholds();
        thresholds.hr_high = thresholds.hr_rest;

        let snapshot = MetricsSnapshot {
            latest_hr: Some(150.0),
            ..Default::default()
        };
        let signals = BiometricNormalizer::normalize(&snapshot, &thresholds);

        assert_eq!(signals.activity, 0.0);
        assert!(signals
            .quality_flags
            .contains(&QualityFlag::DegenerateHeartRateBounds));
    }
}
