use serde::{Deserialize, Serialize};

use crate::block::types::BlockAssignment;

/// The committed layout of one file. Owned by the directory's file table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileRecord {
    pub file_name: String,
    /// Exact byte length; reassembly truncates to it.
    pub total_size: u64,
    /// Block size the file was cut with.
    pub block_size: u64,
    /// Assignments in byte order.
    pub blocks: Vec<BlockAssignment>,
}

/// Block placement proposed for a write. Becomes a `FileRecord` only once committed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WritePlan {
    pub file_name: String,
    pub total_size: u64,
    /// The client cuts its blocks at this size.
    pub block_size: u64,
    pub blocks: Vec<BlockAssignment>,
}

/// Where to fetch each block of a committed file, in byte order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReadPlan {
    pub file_name: String,
    pub total_size: u64,
    pub block_size: u64,
    pub blocks: Vec<BlockAssignment>,
}

impl From<&FileRecord> for ReadPlan {
    fn from(record: &FileRecord) -> Self {
        Self {
            file_name: record.file_name.clone(),
            total_size: record.total_size,
            block_size: record.block_size,
            blocks: record.blocks.clone(),
        }
    }
}
