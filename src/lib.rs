//! Synheart Lumen - On-device adaptive lighting engine
//!
//! Lumen turns a periodic biometric snapshot (heart rate, stress, sleep score)
//! into a smoothly varying lighting target through a deterministic pipeline:
//! circadian baseline → biometric normalization → target composition →
//! temporal smoothing → actuator encoding.
//!
//! The engine performs no I/O. Callers read snapshots, drive ticks, and hand
//! the encoded command to a bridge or strip controller.

pub mod actuators;
pub mod circadian;
pub mod composer;
pub mod config;
pub mod encoder;
pub mod error;
pub mod normalizer;
pub mod pipeline;
pub mod smoother;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use actuators::{ActuatorEncoder, ActuatorKind, DeviceCommand};
pub use config::LightingConfig;
pub use error::LightingError;
pub use pipeline::{compute_raw_target, LightingEngine};
pub use types::{LightFrame, LightTarget, MetricsSnapshot, TimeOfDay};

/// Lumen version embedded in all frame records
pub const LUMEN_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for frame records
pub const PRODUCER_NAME: &str = "synheart-lumen";
