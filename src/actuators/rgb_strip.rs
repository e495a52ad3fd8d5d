//! RGB strip encoder
//!
//! Approximates the color of a black-body radiator with an empirical piecewise
//! fit over temperature in hundreds of Kelvin, then scales each channel by
//! intensity. The strip controller reads `RGB,<r>,<g>,<b>` lines on a serial
//! link.

use serde::{Deserialize, Serialize};

use super::{ActuatorEncoder, ActuatorKind, DeviceCommand};
use crate::normalizer::clamp;

/// 8-bit RGB triplet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Scale every channel by intensity (clamped to 0-1), truncating
    pub fn scaled(&self, intensity: f64) -> Self {
        let factor = clamp(intensity, 0.0, 1.0);
        let scale = |channel: u8| (channel as f64 * factor) as u8;
        Self::new(scale(self.r), scale(self.g), scale(self.b))
    }

    /// Newline-terminated line for the strip controller
    pub fn to_serial_line(&self) -> String {
        format!("RGB,{},{},{}\n", self.r, self.g, self.b)
    }
}

/// Approximate RGB color of a color temperature, at full intensity
pub fn kelvin_to_rgb(kelvin: f64) -> RgbColor {
    let t = kelvin / 100.0;

    let red = if t <= 66.0 {
        255.0
    } else {
        clamp(329.698727446 * (t - 60.0).powf(-0.1332047592), 0.0, 255.0)
    };

    let green = if t <= 66.0 {
        clamp(99.4708025861 * t.ln() - 161.1195681661, 0.0, 255.0)
    } else {
        clamp(288.1221695283 * (t - 60.0).powf(-0.0755148492), 0.0, 255.0)
    };

    let blue = if t >= 66.0 {
        255.0
    } else if t <= 19.0 {
        0.0
    } else {
        clamp(138.5177312231 * (t - 10.0).ln() - 305.0447927307, 0.0, 255.0)
    };

    // float-to-int casts truncate
    RgbColor::new(red as u8, green as u8, blue as u8)
}

/// Encoder for serial RGB strips
pub struct RgbStripEncoder;

impl ActuatorEncoder for RgbStripEncoder {
    fn kind(&self) -> ActuatorKind {
        ActuatorKind::RgbStrip
    }

    fn encode(&self, kelvin: f64, intensity: f64) -> DeviceCommand {
        DeviceCommand::RgbStrip(kelvin_to_rgb(kelvin).scaled(intensity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_branch_boundary_at_6600k() {
        let color = kelvin_to_rgb(6600.0);
        assert_eq!(color.r, 255);
        assert_eq!(color.b, 255);
        assert_eq!(color.g, 255);
    }

    #[test]
    fn test_reference_colors() {
        assert_eq!(kelvin_to_rgb(2000.0), RgbColor::new(255, 136, 13));
        assert_eq!(kelvin_to_rgb(3200.0), RgbColor::new(255, 183, 123));
        assert_eq!(kelvin_to_rgb(4000.0), RgbColor::new(255, 205, 166));
        assert_eq!(kelvin_to_rgb(6500.0), RgbColor::new(255, 254, 250));
        assert_eq!(kelvin_to_rgb(10_000.0), RgbColor::new(201, 218, 255));
    }

    #[test]
    fn test_blue_cutoff() {
        assert_eq!(kelvin_to_rgb(1900.0).b, 0);
        assert_eq!(kelvin_to_rgb(1000.0), RgbColor::new(255, 67, 0));
    }

    #[test]
    fn test_scaled_truncates() {
        let color = kelvin_to_rgb(3200.0).scaled(0.5);
        assert_eq!(color, RgbColor::new(127, 91, 61));
        assert_eq!(kelvin_to_rgb(3200.0).scaled(0.0), RgbColor::new(0, 0, 0));
        assert_eq!(kelvin_to_rgb(3200.0).scaled(2.0), kelvin_to_rgb(3200.0));
    }

    #[test]
    fn test_serial_line() {
        assert_eq!(RgbColor::new(101, 73, 49).to_serial_line(), "RGB,101,73,49\n");
    }

    #[test]
    fn test_encode() {
        assert_eq!(
            RgbStripEncoder.encode(6600.0, 1.0),
            DeviceCommand::RgbStrip(RgbColor::new(255, 255, 255))
        );
    }
}
