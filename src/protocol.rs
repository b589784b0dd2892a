//! Shared Wire Records
//!
//! Records every service speaks regardless of its role. Role-specific requests and responses
//! live in `directory::protocol` and `storage::protocol`.

use serde::{Deserialize, Serialize};

use crate::block::types::NodeId;
use crate::error::ErrorKind;

/// Liveness probe endpoint, served by the directory and by every storage node.
pub const ENDPOINT_HEALTH: &str = "/";

/// Body of every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// `"directory"` or `"storage_node"`.
    pub service: String,
    /// Set by storage nodes only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<NodeId>,
}

impl HealthResponse {
    pub fn healthy(service: &str, node_id: Option<NodeId>) -> Self {
        Self {
            status: "healthy".to_string(),
            service: service.to_string(),
            node_id,
        }
    }
}

/// Error half of every handler's return type.
pub type ApiError = (axum::http::StatusCode, axum::Json<ErrorResponse>);
