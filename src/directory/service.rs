use std::sync::Arc;

use super::placement::place_blocks;
use super::registry::NodeRegistry;
use super::table::FileTable;
use super::types::{FileRecord, ReadPlan, WritePlan};
use crate::block::types::{BlockAssignment, BlockId, NodeEntry, block_count};
use crate::error::{ClusterError, ClusterResult};

/// The directory's operation interface: write plans, commits, read plans, inventory.
///
/// Owns the node registry and the file table; handlers receive it as an explicit
/// `Arc<DirectoryService>` dependency.
pub struct DirectoryService {
    registry: NodeRegistry,
    table: FileTable,
    block_size: u64,
}

impl DirectoryService {
    pub fn new(registry: NodeRegistry, block_size: u64) -> ClusterResult<Arc<Self>> {
        if block_size == 0 {
            return Err(ClusterError::InvalidRequest(
                "block size must be greater than zero".to_string(),
            ));
        }

        tracing::info!(
            "Directory initialized with {} storage nodes, block size {} bytes",
            registry.len(),
            block_size
        );

        Ok(Arc::new(Self {
            registry,
            table: FileTable::new(),
            block_size,
        }))
    }

    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    pub fn nodes(&self) -> &[NodeEntry] {
        self.registry.nodes()
    }

    /// Proposes a placement for `total_size` bytes of `file_name`. Does not touch the table.
    pub fn get_write_plan(&self, file_name: &str, total_size: u64) -> ClusterResult<WritePlan> {
        check_file_name(file_name)?;

        let blocks = place_blocks(file_name, total_size, self.block_size, &self.registry);
        tracing::info!(
            "Write plan for '{}': {} bytes in {} blocks",
            file_name,
            total_size,
            blocks.len()
        );

        Ok(WritePlan {
            file_name: file_name.to_string(),
            total_size,
            block_size: self.block_size,
            blocks,
        })
    }

    /// Records `blocks` as the layout of `file_name`, replacing any earlier record whole.
    ///
    /// Fails with `CommitMismatch` when the assignments could not have come from a write plan
    /// of this directory: wrong block count for `total_size`, an identifier out of position,
    /// or a node that is not registered.
    pub fn commit_write(
        &self,
        file_name: &str,
        blocks: Vec<BlockAssignment>,
        total_size: u64,
    ) -> ClusterResult<()> {
        check_file_name(file_name)?;

        let expected = block_count(total_size, self.block_size);
        if blocks.len() as u64 != expected {
            return Err(ClusterError::CommitMismatch(format!(
                "'{}' has {} bytes and needs {} blocks, commit lists {}",
                file_name,
                total_size,
                expected,
                blocks.len()
            )));
        }

        for (index, assignment) in blocks.iter().enumerate() {
            match assignment.block_id.parse() {
                Some((name, position)) if name == file_name && position == index as u64 => {}
                _ => {
                    return Err(ClusterError::CommitMismatch(format!(
                        "block {} of '{}' must be {}, got {}",
                        index,
                        file_name,
                        BlockId::for_block(file_name, index as u64),
                        assignment.block_id
                    )));
                }
            }
            if !self.registry.contains(&assignment.node) {
                return Err(ClusterError::CommitMismatch(format!(
                    "block {} is assigned to unregistered node {} ({})",
                    assignment.block_id, assignment.node.id, assignment.node.addr
                )));
            }
        }

        let block_total = blocks.len();
        let replaced = self.table.replace(FileRecord {
            file_name: file_name.to_string(),
            total_size,
            block_size: self.block_size,
            blocks,
        });

        if replaced.is_some() {
            tracing::info!(
                "Committed '{}' ({} blocks), replacing previous record",
                file_name,
                block_total
            );
        } else {
            tracing::info!("Committed '{}' ({} blocks)", file_name, block_total);
        }
        Ok(())
    }

    pub fn get_read_plan(&self, file_name: &str) -> ClusterResult<ReadPlan> {
        match self.table.get(file_name) {
            Some(record) => {
                tracing::debug!(
                    "Read plan for '{}': {} blocks",
                    file_name,
                    record.blocks.len()
                );
                Ok(ReadPlan::from(record.as_ref()))
            }
            None => Err(ClusterError::FileNotFound(file_name.to_string())),
        }
    }

    pub fn list_files(&self) -> Vec<String> {
        self.table.names()
    }

    pub fn file_count(&self) -> usize {
        self.table.len()
    }
}

fn check_file_name(file_name: &str) -> ClusterResult<()> {
    if file_name.is_empty() {
        return Err(ClusterError::InvalidRequest(
            "file name must not be empty".to_string(),
        ));
    }
    Ok(())
}
