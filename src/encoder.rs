//! Frame record encoding
//!
//! Wraps an engine frame and its device command in a self-describing JSON
//! record with producer metadata, for logging pipelines and downstream
//! collaborators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::actuators::DeviceCommand;
use crate::error::LightingError;
use crate::types::LightFrame;
use crate::{LUMEN_VERSION, PRODUCER_NAME};

/// Current frame record schema version
pub const FRAME_SCHEMA_VERSION: &str = "lumen.frame.v1";

/// Producer metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// One encoded tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightFrameRecord {
    pub schema_version: String,
    pub producer: FrameProducer,
    pub computed_at_utc: DateTime<Utc>,
    /// Producer timestamp of the snapshot the frame was computed from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_timestamp: Option<String>,
    pub frame: LightFrame,
    pub command: DeviceCommand,
}

/// Encoder for frame records
pub struct FrameEncoder {
    instance_id: String,
}

impl Default for FrameEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn encode(
        &self,
        frame: LightFrame,
        command: DeviceCommand,
        snapshot_timestamp: Option<String>,
    ) -> LightFrameRecord {
        LightFrameRecord {
            schema_version: FRAME_SCHEMA_VERSION.to_string(),
            producer: FrameProducer {
                name: PRODUCER_NAME.to_string(),
                version: LUMEN_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now(),
            snapshot_timestamp,
            frame,
            command,
        }
    }

    /// Encode to a single-line JSON string
    pub fn encode_to_json(
        &self,
        frame: LightFrame,
        command: DeviceCommand,
        snapshot_timestamp: Option<String>,
    ) -> Result<String, LightingError> {
        let record = self.encode(frame, command, snapshot_timestamp);
        serde_json::to_string(&record).map_err(LightingError::JsonError)
    }
}
