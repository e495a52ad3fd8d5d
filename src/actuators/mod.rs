//! Actuator output encoders
//!
//! The engine produces a Kelvin color temperature and a relative intensity.
//! Encoders turn that pair into the payload a particular actuator expects;
//! they are pure and hold no state.

mod hue;
mod rgb_strip;

pub use hue::{
    intensity_to_bri, kelvin_to_mired, HueEncoder, HueLightState, BRI_MAX, BRI_MIN, MIRED_MAX,
    MIRED_MIN,
};
pub use rgb_strip::{kelvin_to_rgb, RgbColor, RgbStripEncoder};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LightingError;
use crate::types::SmoothedTarget;

/// Trait for actuator output encoders
pub trait ActuatorEncoder {
    fn kind(&self) -> ActuatorKind;

    /// Encode a color temperature and intensity into a device command
    fn encode(&self, kelvin: f64, intensity: f64) -> DeviceCommand;

    /// Encode a smoothed engine target
    fn encode_target(&self, target: &SmoothedTarget) -> DeviceCommand {
        self.encode(target.cct_kelvin, target.intensity)
    }
}

/// Supported actuator variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActuatorKind {
    /// Smart-bulb bridge addressed with mired codes
    Hue,
    /// RGB strip controller on a serial line
    RgbStrip,
}

impl ActuatorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActuatorKind::Hue => "hue",
            ActuatorKind::RgbStrip => "rgb_strip",
        }
    }

    pub fn encoder(&self) -> &'static dyn ActuatorEncoder {
        match self {
            ActuatorKind::Hue => &HueEncoder,
            ActuatorKind::RgbStrip => &RgbStripEncoder,
        }
    }
}

impl fmt::Display for ActuatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActuatorKind {
    type Err = LightingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hue" | "mired" => Ok(ActuatorKind::Hue),
            "rgb" | "rgb_strip" | "rgb-strip" | "serial" => Ok(ActuatorKind::RgbStrip),
            other => Err(LightingError::UnknownActuator(other.to_string())),
        }
    }
}

/// Device-ready command for one actuator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "actuator", rename_all = "snake_case")]
pub enum DeviceCommand {
    Hue(HueLightState),
    RgbStrip(RgbColor),
}

impl DeviceCommand {
    pub fn kind(&self) -> ActuatorKind {
        match self {
            DeviceCommand::Hue(_) => ActuatorKind::Hue,
            DeviceCommand::RgbStrip(_) => ActuatorKind::RgbStrip,
        }
    }

    /// Newline-terminated wire form: JSON light state for bridges,
    /// `RGB,r,g,b` for strips
    pub fn to_wire_line(&self) -> Result<String, LightingError> {
        match self {
            DeviceCommand::Hue(state) => Ok(serde_json::to_string(state)? + "\n"),
            DeviceCommand::RgbStrip(color) => Ok(color.to_serial_line()),
        }
    }
}
