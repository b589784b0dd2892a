//! Directory Network Protocol
//!
//! Endpoints and request/response records of the directory service. Write and read plans
//! travel as `directory::types::WritePlan` / `ReadPlan` directly.

use serde::{Deserialize, Serialize};

use crate::block::types::{BlockAssignment, NodeEntry};

// --- API Endpoints ---

/// Request a placement for a new write.
pub const ENDPOINT_WRITE_PLAN: &str = "/write_plan";
/// Record a completed write.
pub const ENDPOINT_COMMIT_WRITE: &str = "/commit_write";
/// Look up a committed file's blocks (`?file_name=`).
pub const ENDPOINT_READ_PLAN: &str = "/read_plan";
/// Names of all committed files.
pub const ENDPOINT_LIST_FILES: &str = "/files";
/// The storage node registry.
pub const ENDPOINT_LIST_NODES: &str = "/nodes";

// --- Data Transfer Objects ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WritePlanRequest {
    pub file_name: String,
    pub total_size: u64,
}

/// Sent by the client once every block of the plan has been stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRequest {
    pub file_name: String,
    pub total_size: u64,
    /// Normally the `blocks` of the write plan, unchanged.
    pub blocks: Vec<BlockAssignment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitResponse {
    pub file_name: String,
    pub block_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadPlanParams {
    pub file_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileListResponse {
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeListResponse {
    pub nodes: Vec<NodeEntry>,
}
