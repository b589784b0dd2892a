use super::registry::NodeRegistry;
use crate::block::types::{BlockAssignment, BlockId, block_count};

/// Registry index that stores block `block_index` when `node_count` nodes are registered.
pub fn round_robin(block_index: u64, node_count: usize) -> usize {
    (block_index % node_count as u64) as usize
}

/// Assigns every block of a `total_size` byte file to a node, in block order.
pub fn place_blocks(
    file_name: &str,
    total_size: u64,
    block_size: u64,
    registry: &NodeRegistry,
) -> Vec<BlockAssignment> {
    if registry.is_empty() {
        return Vec::new();
    }

    (0..block_count(total_size, block_size))
        .filter_map(|index| {
            let node = registry.get(round_robin(index, registry.len()))?;
            Some(BlockAssignment {
                block_id: BlockId::for_block(file_name, index),
                node: node.clone(),
            })
        })
        .collect()
}
