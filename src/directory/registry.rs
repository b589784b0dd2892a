use std::collections::HashSet;

use crate::block::types::NodeEntry;
use crate::error::{ClusterError, ClusterResult};

/// The fixed set of storage nodes, in placement order.
///
/// Built once when the directory starts; there is no join or leave protocol.
#[derive(Debug, Clone)]
pub struct NodeRegistry {
    nodes: Vec<NodeEntry>,
}

impl NodeRegistry {
    /// Rejects an empty node list and duplicate node ids.
    pub fn new(nodes: Vec<NodeEntry>) -> ClusterResult<Self> {
        if nodes.is_empty() {
            return Err(ClusterError::InvalidRequest(
                "registry needs at least one storage node".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for node in &nodes {
            if !seen.insert(&node.id) {
                return Err(ClusterError::InvalidRequest(format!(
                    "duplicate storage node id: {}",
                    node.id
                )));
            }
        }

        Ok(Self { nodes })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&NodeEntry> {
        self.nodes.get(index)
    }

    pub fn nodes(&self) -> &[NodeEntry] {
        &self.nodes
    }

    /// True if `node` is registered under the same id and address.
    pub fn contains(&self, node: &NodeEntry) -> bool {
        self.nodes.iter().any(|entry| entry == node)
    }
}
