use serde::{Deserialize, Serialize};

/// Maximum request head size read from a client (8KB)
pub const MAX_REQUEST_HEAD: usize = 8 * 1024;

/// A hardware subtree as served to clients.
///
/// Only child-ward fields exist here; the owning node is implied by
/// nesting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HardwareNode {
    pub name: String,
    pub identifier: String,
    pub hardware_type: String,
    pub sub_hardware: Vec<HardwareNode>,
    pub sensors: Vec<SensorNode>,
}

impl HardwareNode {
    /// Nesting depth of this subtree, counting this node as 1
    pub fn depth(&self) -> usize {
        1 + self
            .sub_hardware
            .iter()
            .map(HardwareNode::depth)
            .max()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SensorNode {
    pub name: String,
    pub identifier: String,
    pub sensor_type: String,
    pub index: usize,
    pub value: Option<f32>,
    pub min: Option<f32>,
    pub max: Option<f32>,
}

/// Body of a 500 response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorBody {
    pub error: String,
    pub status: u16,
}

impl ErrorBody {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            error: msg.into(),
            status: 500,
        }
    }
}

/// Serialize a snapshot (list of top-level hardware) to compact JSON
pub fn encode_snapshot(nodes: &[HardwareNode]) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(nodes)
}

pub fn decode_snapshot(bytes: &[u8]) -> Result<Vec<HardwareNode>, serde_json::Error> {
    serde_json::from_slice(bytes)
}

pub fn encode_error(body: &ErrorBody) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(body)
}
