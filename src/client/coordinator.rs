use bytes::Bytes;
use rand::RngCore;
use std::collections::BTreeMap;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::task::JoinSet;

use super::transport::{DirectoryClient, StorageClient, http_client};
use crate::block::types::{BlockAssignment, BlockId, NodeEntry, NodeId, block_range};
use crate::config::ClusterConfig;
use crate::directory::types::{ReadPlan, WritePlan};
use crate::error::{ClusterError, ClusterResult};

const TEST_FILE_CHUNK: usize = 1024 * 1024;

/// Where the bytes of a file being written come from.
#[derive(Debug, Clone)]
pub enum BlockSource {
    Memory(Bytes),
    File(Arc<PathBuf>),
}

impl BlockSource {
    /// Reads block `index` of a `total_size` byte source cut at `block_size`.
    pub async fn read_block(&self, index: u64, block_size: u64, total_size: u64) -> ClusterResult<Bytes> {
        let range = block_range(index, block_size, total_size);
        match self {
            BlockSource::Memory(data) => {
                if range.end > data.len() as u64 {
                    return Err(ClusterError::Corrupt(format!(
                        "block {} ends at byte {} but source has {} bytes",
                        index,
                        range.end,
                        data.len()
                    )));
                }
                Ok(data.slice(range.start as usize..range.end as usize))
            }
            BlockSource::File(path) => {
                let mut file = tokio::fs::File::open(path.as_path()).await?;
                file.seek(SeekFrom::Start(range.start)).await?;
                let mut buf = vec![0u8; (range.end - range.start) as usize];
                file.read_exact(&mut buf).await?;
                Ok(Bytes::from(buf))
            }
        }
    }
}

/// Reachability of one service, as seen from the client.
#[derive(Debug, Clone)]
pub struct NodeStatus {
    pub node: NodeEntry,
    pub healthy: bool,
}

#[derive(Debug, Clone)]
pub struct ClusterStatus {
    pub directory_healthy: bool,
    pub nodes: Vec<NodeStatus>,
}

/// Drives the write and read protocols on behalf of a user.
pub struct ClientCoordinator {
    directory: DirectoryClient,
    storage: StorageClient,
}

impl ClientCoordinator {
    pub fn new(directory_addr: std::net::SocketAddr, request_timeout: Duration) -> ClusterResult<Self> {
        let http = http_client(request_timeout)?;
        Ok(Self {
            directory: DirectoryClient::new(http.clone(), directory_addr),
            storage: StorageClient::new(http),
        })
    }

    pub fn from_config(config: &ClusterConfig) -> ClusterResult<Self> {
        Self::new(config.directory_addr, config.request_timeout)
    }

    pub fn directory(&self) -> &DirectoryClient {
        &self.directory
    }

    // ============================================================
    // WRITE PATH
    // ============================================================

    /// Stores `path` under its file name.
    pub async fn write_file(&self, path: &Path) -> ClusterResult<WritePlan> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                ClusterError::InvalidRequest(format!("{} has no usable file name", path.display()))
            })?
            .to_string();
        self.write_file_as(path, &file_name).await
    }

    pub async fn write_file_as(&self, path: &Path, file_name: &str) -> ClusterResult<WritePlan> {
        let total_size = tokio::fs::metadata(path).await?.len();
        let source = BlockSource::File(Arc::new(path.to_path_buf()));
        self.write_from(file_name, source, total_size).await
    }

    pub async fn write_bytes(&self, file_name: &str, data: impl Into<Bytes>) -> ClusterResult<WritePlan> {
        let data = data.into();
        let total_size = data.len() as u64;
        self.write_from(file_name, BlockSource::Memory(data), total_size).await
    }

    /// Plan, push every block, then commit. Nothing is committed unless every push succeeded.
    pub async fn write_from(
        &self,
        file_name: &str,
        source: BlockSource,
        total_size: u64,
    ) -> ClusterResult<WritePlan> {
        let plan = self.directory.get_write_plan(file_name, total_size).await?;
        if plan.total_size != total_size || plan.block_size == 0 {
            return Err(ClusterError::Protocol(format!(
                "write plan for '{}' does not match the request ({} bytes, block size {})",
                file_name, plan.total_size, plan.block_size
            )));
        }

        tracing::info!(
            "Writing '{}': {} bytes in {} blocks",
            file_name,
            total_size,
            plan.blocks.len()
        );

        if let Err(e) = self.push_blocks(&plan, &source).await {
            tracing::error!("Aborting write of '{}', nothing committed: {}", file_name, e);
            return Err(e);
        }

        self.directory.commit_write(&plan).await?;
        tracing::info!("Committed '{}'", file_name);
        Ok(plan)
    }

    async fn push_blocks(&self, plan: &WritePlan, source: &BlockSource) -> ClusterResult<()> {
        let mut transfers = JoinSet::new();

        for (_, (node, blocks)) in group_by_node(&plan.blocks) {
            let storage = self.storage.clone();
            let source = source.clone();
            let (block_size, total_size) = (plan.block_size, plan.total_size);

            transfers.spawn(async move {
                for (index, block_id) in blocks {
                    let payload = source.read_block(index as u64, block_size, total_size).await?;
                    tracing::debug!("Sending {} ({} bytes) to {}", block_id, payload.len(), node.id);
                    storage.store_block(&node, &block_id, payload).await?;
                }
                Ok::<(), ClusterError>(())
            });
        }

        while let Some(joined) = transfers.join_next().await {
            let result = joined
                .map_err(|e| ClusterError::WriteFailure(format!("block transfer task failed: {}", e)))
                .and_then(|result| result);
            if let Err(e) = result {
                transfers.abort_all();
                return Err(e);
            }
        }
        Ok(())
    }

    // ============================================================
    // READ PATH
    // ============================================================

    /// Fetches `file_name` into memory.
    pub async fn read_bytes(&self, file_name: &str) -> ClusterResult<Vec<u8>> {
        let plan = self.directory.get_read_plan(file_name).await?;
        tracing::info!(
            "Reading '{}': {} bytes in {} blocks",
            file_name,
            plan.total_size,
            plan.blocks.len()
        );
        self.fetch_blocks(&plan).await
    }

    /// Fetches `file_name` into `output`. The file only appears once every block was read.
    pub async fn read_file(&self, file_name: &str, output: &Path) -> ClusterResult<u64> {
        let data = self.read_bytes(file_name).await?;

        let staging = staging_path(output);
        let result = async {
            let mut file = tokio::fs::File::create(&staging).await?;
            file.write_all(&data).await?;
            file.sync_all().await?;
            tokio::fs::rename(&staging, output).await?;
            Ok::<(), std::io::Error>(())
        }
        .await;

        if let Err(e) = result {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e.into());
        }

        tracing::info!("Reassembled '{}' at {}", file_name, output.display());
        Ok(data.len() as u64)
    }

    async fn fetch_blocks(&self, plan: &ReadPlan) -> ClusterResult<Vec<u8>> {
        let mut fetches = JoinSet::new();

        for (_, (node, blocks)) in group_by_node(&plan.blocks) {
            let storage = self.storage.clone();
            fetches.spawn(async move {
                let mut fetched = Vec::with_capacity(blocks.len());
                for (index, block_id) in blocks {
                    let payload = storage.fetch_block(&node, &block_id).await?;
                    tracing::debug!("Fetched {} ({} bytes) from {}", block_id, payload.len(), node.id);
                    fetched.push((index, payload));
                }
                Ok::<_, ClusterError>(fetched)
            });
        }

        let mut slots: Vec<Option<Bytes>> = vec![None; plan.blocks.len()];
        while let Some(joined) = fetches.join_next().await {
            let result = joined
                .map_err(|e| ClusterError::Protocol(format!("block fetch task failed: {}", e)))
                .and_then(|result| result);
            match result {
                Ok(fetched) => {
                    for (index, payload) in fetched {
                        slots[index] = Some(payload);
                    }
                }
                Err(e) => {
                    fetches.abort_all();
                    tracing::error!("Aborting read of '{}': {}", plan.file_name, e);
                    return Err(e);
                }
            }
        }

        assemble(plan, slots)
    }

    // ============================================================
    // INVENTORY
    // ============================================================

    pub async fn list_files(&self) -> ClusterResult<Vec<String>> {
        self.directory.list_files().await
    }

    /// Probes the directory and every storage node. Nodes come from the directory's registry,
    /// or from `fallback_nodes` when the directory is down.
    pub async fn cluster_status(&self, fallback_nodes: &[NodeEntry]) -> ClusterStatus {
        let directory_healthy = self.directory.health().await.is_ok();
        let nodes = match self.directory.list_nodes().await {
            Ok(nodes) => nodes,
            Err(_) => fallback_nodes.to_vec(),
        };

        let mut statuses = Vec::with_capacity(nodes.len());
        for node in nodes {
            let healthy = self.storage.health(&node).await.is_ok();
            statuses.push(NodeStatus { node, healthy });
        }

        ClusterStatus {
            directory_healthy,
            nodes: statuses,
        }
    }
}

/// Blocks per node, keeping plan order within each node. Each entry becomes one sequential
/// transfer task, so a node never has more than one block in flight from this client.
fn group_by_node(blocks: &[BlockAssignment]) -> BTreeMap<NodeId, (NodeEntry, Vec<(usize, BlockId)>)> {
    let mut groups: BTreeMap<NodeId, (NodeEntry, Vec<(usize, BlockId)>)> = BTreeMap::new();
    for (index, assignment) in blocks.iter().enumerate() {
        groups
            .entry(assignment.node.id.clone())
            .or_insert_with(|| (assignment.node.clone(), Vec::new()))
            .1
            .push((index, assignment.block_id.clone()));
    }
    groups
}

/// Concatenates fetched blocks in plan order and trims to the recorded size.
fn assemble(plan: &ReadPlan, slots: Vec<Option<Bytes>>) -> ClusterResult<Vec<u8>> {
    let mut data = Vec::with_capacity(plan.total_size as usize);
    for (index, slot) in slots.into_iter().enumerate() {
        let payload = slot.ok_or_else(|| {
            ClusterError::Corrupt(format!("block {} of '{}' was never fetched", index, plan.file_name))
        })?;
        let is_last = index + 1 == plan.blocks.len();
        if !is_last && payload.len() as u64 != plan.block_size {
            return Err(ClusterError::Corrupt(format!(
                "block {} of '{}' holds {} bytes, expected {}",
                index,
                plan.file_name,
                payload.len(),
                plan.block_size
            )));
        }
        data.extend_from_slice(&payload);
    }

    if (data.len() as u64) < plan.total_size {
        return Err(ClusterError::Corrupt(format!(
            "'{}' should have {} bytes, blocks hold {}",
            plan.file_name,
            plan.total_size,
            data.len()
        )));
    }
    data.truncate(plan.total_size as usize);
    Ok(data)
}

fn staging_path(output: &Path) -> PathBuf {
    let name = output
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    output.with_file_name(format!(".{}.{}.partial", name, uuid::Uuid::new_v4()))
}

/// Writes `size` random bytes to `path`, for demos and manual testing.
pub async fn create_test_file(path: &Path, size: u64) -> ClusterResult<()> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut remaining = size;

    while remaining > 0 {
        let len = remaining.min(TEST_FILE_CHUNK as u64) as usize;
        let chunk = {
            let mut buf = vec![0u8; len];
            rand::thread_rng().fill_bytes(&mut buf);
            buf
        };
        file.write_all(&chunk).await?;
        remaining -= len as u64;
    }

    file.flush().await?;
    tracing::info!("Created test file {} ({} bytes)", path.display(), size);
    Ok(())
}
