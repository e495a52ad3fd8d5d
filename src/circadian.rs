//! Circadian baseline selection
//!
//! Maps a wall-clock time to the base intensity and color temperature of the
//! circadian period whose window contains it. A window runs from a period's
//! start up to (not including) the next period's start and may wrap past
//! midnight.

use crate::config::CircadianConfig;
use crate::types::{CircadianBaseline, Period, TimeOfDay};

/// Whether `t` falls in the half-open window `[start, end)`, wrapping at midnight
pub fn in_window(t: TimeOfDay, start: TimeOfDay, end: TimeOfDay) -> bool {
    if start <= end {
        start <= t && t < end
    } else {
        t >= start || t < end
    }
}

/// Selector for the circadian baseline
pub struct CircadianSelector;

impl CircadianSelector {
    /// Period whose window contains `t`, if any.
    ///
    /// Periods are tested in clock order from morning; with overlapping
    /// windows the first match wins.
    pub fn period_at(config: &CircadianConfig, t: TimeOfDay) -> Option<Period> {
        Period::ALL.into_iter().find(|&period| {
            let (start, end) = config.window(period);
            in_window(t, start, end)
        })
    }

    /// Baseline for `t`. Falls back to night when no window matches.
    pub fn baseline(config: &CircadianConfig, t: TimeOfDay) -> CircadianBaseline {
        let (period, fallback) = match Self::period_at(config, t) {
            Some(period) => (period, false),
            None => {
                tracing::warn!(time = %t, "no circadian window matches; using night baseline");
                (Period::Night, true)
            }
        };

        let entry = config.period(period);
        CircadianBaseline {
            period,
            intensity: entry.intensity,
            cct_kelvin: entry.cct,
            fallback,
        }
    }
}
