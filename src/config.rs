//! Cluster Configuration
//!
//! Topology and policy constants shared by every process of the cluster. Defaults describe a
//! local demo cluster (one directory, four storage nodes on consecutive ports); each value can
//! be overridden from the environment so the same binary runs any topology.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::time::Duration;

use crate::block::types::NodeEntry;

pub const ENV_DIRECTORY: &str = "BLOCK_CLUSTER_DIRECTORY";
pub const ENV_NODES: &str = "BLOCK_CLUSTER_NODES";
pub const ENV_BLOCK_SIZE: &str = "BLOCK_CLUSTER_BLOCK_SIZE";
pub const ENV_TIMEOUT_MS: &str = "BLOCK_CLUSTER_TIMEOUT_MS";

/// 32 MiB.
pub const DEFAULT_BLOCK_SIZE: u64 = 32 * 1024 * 1024;
pub const DEFAULT_DIRECTORY_ADDR: &str = "127.0.0.1:5000";
pub const DEFAULT_NODES: &str =
    "node-1=127.0.0.1:5001,node-2=127.0.0.1:5002,node-3=127.0.0.1:5003,node-4=127.0.0.1:5004";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ClusterConfig {
    /// Where the directory service listens.
    pub directory_addr: SocketAddr,
    /// Storage node registry, in placement order.
    pub storage_nodes: Vec<NodeEntry>,
    /// Maximum block size in bytes.
    pub block_size: u64,
    /// Per-request timeout of the HTTP client.
    pub request_timeout: Duration,
}

impl ClusterConfig {
    /// Defaults overridden by any `BLOCK_CLUSTER_*` variable that is set.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default_topology()?;

        if let Ok(addr) = std::env::var(ENV_DIRECTORY) {
            config.directory_addr = addr
                .parse()
                .with_context(|| format!("{} is not a socket address: {}", ENV_DIRECTORY, addr))?;
        }
        if let Ok(nodes) = std::env::var(ENV_NODES) {
            config.storage_nodes = parse_nodes(&nodes)?;
        }
        if let Ok(size) = std::env::var(ENV_BLOCK_SIZE) {
            config.block_size = size
                .parse()
                .with_context(|| format!("{} is not an integer: {}", ENV_BLOCK_SIZE, size))?;
        }
        if let Ok(ms) = std::env::var(ENV_TIMEOUT_MS) {
            let ms: u64 = ms
                .parse()
                .with_context(|| format!("{} is not an integer: {}", ENV_TIMEOUT_MS, ms))?;
            config.request_timeout = Duration::from_millis(ms);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn default_topology() -> Result<Self> {
        Ok(Self {
            directory_addr: DEFAULT_DIRECTORY_ADDR.parse()?,
            storage_nodes: parse_nodes(DEFAULT_NODES)?,
            block_size: DEFAULT_BLOCK_SIZE,
            request_timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            anyhow::bail!("block size must be greater than zero");
        }
        if self.storage_nodes.is_empty() {
            anyhow::bail!("at least one storage node must be configured");
        }
        Ok(())
    }

    pub fn directory_url(&self) -> String {
        format!("http://{}", self.directory_addr)
    }

    pub fn find_node(&self, id: &str) -> Option<&NodeEntry> {
        self.storage_nodes.iter().find(|node| node.id.0 == id)
    }
}

/// Parses a comma-separated `id=host:port` list, keeping the given order.
pub fn parse_nodes(list: &str) -> Result<Vec<NodeEntry>> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            let (id, addr) = item
                .split_once('=')
                .with_context(|| format!("node entry must look like id=host:port, got {}", item))?;
            let addr: SocketAddr = addr
                .trim()
                .parse()
                .with_context(|| format!("bad address for node {}: {}", id, addr))?;
            Ok(NodeEntry::new(id.trim(), addr))
        })
        .collect()
}
