use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use super::store::BlockStore;
use crate::block::types::BlockId;
use crate::error::{ClusterError, ClusterResult};

/// Block store that lives in process memory. Used by tests and throwaway nodes.
#[derive(Default)]
pub struct MemoryBlockStore {
    blocks: DashMap<BlockId, Bytes>,
}

impl MemoryBlockStore {
    pub fn new() -> Self {
        Self {
            blocks: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn stored_bytes(&self) -> usize {
        self.blocks.iter().map(|entry| entry.value().len()).sum()
    }
}

#[async_trait]
impl BlockStore for MemoryBlockStore {
    async fn write_block(&self, block_id: &BlockId, payload: Bytes) -> ClusterResult<()> {
        self.blocks.insert(block_id.clone(), payload);
        Ok(())
    }

    async fn read_block(&self, block_id: &BlockId) -> ClusterResult<Bytes> {
        self.blocks
            .get(block_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ClusterError::BlockNotFound(block_id.to_string()))
    }

    async fn list_blocks(&self) -> ClusterResult<Vec<BlockId>> {
        let mut ids: Vec<BlockId> = self.blocks.iter().map(|entry| entry.key().clone()).collect();
        ids.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(ids)
    }
}
