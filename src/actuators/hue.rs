//! Mired-based bridge encoder
//!
//! Smart-bulb bridges address color temperature in mireds (`10^6 / Kelvin`)
//! and brightness on an 8-bit 1-254 scale.

use serde::{Deserialize, Serialize};

use super::{ActuatorEncoder, ActuatorKind, DeviceCommand};
use crate::normalizer::clamp;

/// Coolest supported code (6500K)
pub const MIRED_MIN: u16 = 153;
/// Warmest supported code (2000K)
pub const MIRED_MAX: u16 = 500;
pub const BRI_MIN: u8 = 1;
pub const BRI_MAX: u8 = 254;

/// Light state command understood by the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HueLightState {
    pub on: bool,
    /// Brightness (1-254)
    pub bri: u8,
    /// Color temperature in mireds (153-500)
    pub ct: u16,
}

/// Convert Kelvin to a bridge mired code.
///
/// Halves round to even, so 3200 K (312.5 mired) maps to 312.
pub fn kelvin_to_mired(kelvin: f64) -> u16 {
    clamp(
        (1_000_000.0 / kelvin).round_ties_even(),
        MIRED_MIN as f64,
        MIRED_MAX as f64,
    ) as u16
}

/// Convert relative intensity (0-1) to bridge brightness, halves to even
pub fn intensity_to_bri(intensity: f64) -> u8 {
    clamp(
        (intensity * 254.0).round_ties_even(),
        BRI_MIN as f64,
        BRI_MAX as f64,
    ) as u8
}

/// Encoder for mired-based bridges
pub struct HueEncoder;

impl ActuatorEncoder for HueEncoder {
    fn kind(&self) -> ActuatorKind {
        ActuatorKind::Hue
    }

    fn encode(&self, kelvin: f64, intensity: f64) -> DeviceCommand {
        DeviceCommand::Hue(HueLightState {
            on: true,
            bri: intensity_to_bri(intensity),
            ct: kelvin_to_mired(kelvin),
        })
    }
}
