//! Storage Node Network Protocol
//!
//! Block payloads travel as raw `application/octet-stream` bodies with the block identifier as
//! a percent-encoded path segment; acknowledgements and listings are JSON records.

use serde::{Deserialize, Serialize};

use crate::block::types::{BlockId, NodeId};

// --- API Endpoints ---

/// `PUT {ENDPOINT_BLOCKS}/{block_id}` stores a block, `GET` fetches it, and a plain
/// `GET {ENDPOINT_BLOCKS}` lists the stored identifiers.
pub const ENDPOINT_BLOCKS: &str = "/blocks";

pub const OCTET_STREAM: &str = "application/octet-stream";

// --- Data Transfer Objects ---

/// Acknowledgement of a stored block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreBlockResponse {
    pub block_id: BlockId,
    pub size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockListResponse {
    pub node_id: NodeId,
    pub blocks: Vec<BlockId>,
}
