//! Temporal smoothing
//!
//! A dead-band followed by an exponential moving average, applied per channel.
//! The dead-band holds the previous value when the new raw value is within the
//! hysteresis band, so noise-level metric jitter never reaches the light. The
//! band is absolute for intensity and proportional to the previous value for
//! color temperature.

use serde::{Deserialize, Serialize};

use crate::config::SmoothingConfig;
use crate::types::{RawTarget, SmoothedTarget};

/// Smoother state: nothing emitted yet, or the last emitted target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SmootherState {
    Uninitialized,
    Steady { intensity: f64, cct_kelvin: f64 },
}

/// Stateful dead-band + EWMA filter over light targets
#[derive(Debug, Clone)]
pub struct Smoother {
    alpha: f64,
    hysteresis: f64,
    state: SmootherState,
}

impl Default for Smoother {
    fn default() -> Self {
        Self::new(&SmoothingConfig::default())
    }
}

impl Smoother {
    pub fn new(config: &SmoothingConfig) -> Self {
        Self {
            alpha: config.alpha,
            hysteresis: config.hysteresis,
            state: SmootherState::Uninitialized,
        }
    }

    pub fn state(&self) -> SmootherState {
        self.state
    }

    /// Forget the last output; the next step passes its input through
    pub fn reset(&mut self) {
        self.state = SmootherState::Uninitialized;
    }

    /// Feed one raw target and return the smoothed target
    pub fn step(&mut self, raw: RawTarget) -> SmoothedTarget {
        let (intensity, cct_kelvin) = match self.state {
            SmootherState::Uninitialized => {
                tracing::debug!(
                    intensity = raw.intensity,
                    cct_kelvin = raw.cct_kelvin,
                    "smoother initialized"
                );
                (raw.intensity, raw.cct_kelvin)
            }
            SmootherState::Steady {
                intensity: prev_intensity,
                cct_kelvin: prev_cct,
            } => {
                let target_intensity = if (raw.intensity - prev_intensity).abs() < self.hysteresis {
                    prev_intensity
                } else {
                    raw.intensity
                };
                let target_cct = if (raw.cct_kelvin - prev_cct).abs() < prev_cct * self.hysteresis {
                    prev_cct
                } else {
                    raw.cct_kelvin
                };

                (
                    self.ewma(target_intensity, prev_intensity),
                    self.ewma(target_cct, prev_cct),
                )
            }
        };

        self.state = SmootherState::Steady {
            intensity,
            cct_kelvin,
        };
        SmoothedTarget::new(intensity, cct_kelvin)
    }

    /// `alpha * value + (1 - alpha) * previous`, exact when the two are equal
    fn ewma(&self, value: f64, previous: f64) -> f64 {
        previous + self.alpha * (value - previous)
    }
}
