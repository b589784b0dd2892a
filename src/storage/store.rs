use async_trait::async_trait;
use bytes::Bytes;

use crate::block::types::BlockId;
use crate::error::ClusterResult;

/// Local block storage of one storage node.
#[async_trait]
pub trait BlockStore: Send + Sync {
    /// Stores `payload` under `block_id`, replacing any earlier payload.
    /// Fails with `WriteFailure` if the payload could not be persisted.
    async fn write_block(&self, block_id: &BlockId, payload: Bytes) -> ClusterResult<()>;

    /// Fails with `BlockNotFound` if `block_id` was never written here.
    async fn read_block(&self, block_id: &BlockId) -> ClusterResult<Bytes>;

    /// Identifiers of every stored block, sorted.
    async fn list_blocks(&self) -> ClusterResult<Vec<BlockId>>;
}
