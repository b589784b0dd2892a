use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::ops::Range;

const BLOCK_SEPARATOR: &str = "_block_";

/// Identifier of a storage node as listed in the directory registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A storage node the directory knows about.
///
/// The registry is fixed at directory start-up, so an entry is just an identity
/// plus the address its HTTP server listens on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeEntry {
    pub id: NodeId,
    pub addr: SocketAddr,
}

impl NodeEntry {
    pub fn new(id: impl Into<String>, addr: SocketAddr) -> Self {
        Self {
            id: NodeId::new(id),
            addr,
        }
    }

    /// Base URL of the node's HTTP API.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// Unique key of one block of one file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct BlockId(pub String);

impl BlockId {
    /// Derives the identifier of block `index` of `file_name`.
    pub fn for_block(file_name: &str, index: u64) -> Self {
        Self(format!("{}{}{}", file_name, BLOCK_SEPARATOR, index))
    }

    /// Splits an identifier back into `(file_name, index)`.
    ///
    /// Returns `None` for identifiers that were not produced by [`BlockId::for_block`].
    pub fn parse(&self) -> Option<(&str, u64)> {
        let (file_name, index) = self.0.rsplit_once(BLOCK_SEPARATOR)?;
        if file_name.is_empty() || index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        if index.len() > 1 && index.starts_with('0') {
            return None;
        }
        Some((file_name, index.parse().ok()?))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry of a write plan, read plan, or file record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockAssignment {
    pub block_id: BlockId,
    pub node: NodeEntry,
}

/// Number of blocks needed to hold `total_size` bytes. Zero bytes need zero blocks.
pub fn block_count(total_size: u64, block_size: u64) -> u64 {
    if block_size == 0 {
        return 0;
    }
    total_size.div_ceil(block_size)
}

/// Byte range covered by block `index` of a file of `total_size` bytes.
///
/// The last block is clamped to the end of the file.
pub fn block_range(index: u64, block_size: u64, total_size: u64) -> Range<u64> {
    let start = index.saturating_mul(block_size).min(total_size);
    let end = start.saturating_add(block_size).min(total_size);
    start..end
}
