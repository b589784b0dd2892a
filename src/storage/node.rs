use bytes::Bytes;
use std::sync::Arc;

use super::store::BlockStore;
use crate::block::types::{BlockId, NodeId};
use crate::error::ClusterResult;

/// One storage node: its registry identity plus its local block store.
pub struct StorageNode {
    pub id: NodeId,
    store: Arc<dyn BlockStore>,
}

impl StorageNode {
    pub fn new(id: NodeId, store: Arc<dyn BlockStore>) -> Arc<Self> {
        Arc::new(Self { id, store })
    }

    pub async fn write_block(&self, block_id: &BlockId, payload: Bytes) -> ClusterResult<usize> {
        let size = payload.len();
        self.store.write_block(block_id, payload).await?;
        tracing::info!("[{}] Stored block {} ({} bytes)", self.id, block_id, size);
        Ok(size)
    }

    pub async fn read_block(&self, block_id: &BlockId) -> ClusterResult<Bytes> {
        let payload = self.store.read_block(block_id).await?;
        tracing::debug!("[{}] Serving block {} ({} bytes)", self.id, block_id, payload.len());
        Ok(payload)
    }

    pub async fn list_blocks(&self) -> ClusterResult<Vec<BlockId>> {
        self.store.list_blocks().await
    }
}
