use async_trait::async_trait;
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::store::BlockStore;
use crate::block::types::BlockId;
use crate::error::{ClusterError, ClusterResult};

const TEMP_PREFIX: char = '.';
/// Longest file name most filesystems accept (NAME_MAX).
const MAX_FILE_NAME: usize = 255;
/// Holds blocks whose escaped id is too long for a file name. `+` never survives escaping, so
/// no escaped block name can collide with it.
const HASHED_DIR: &str = "+hashed";
const ID_SUFFIX: &str = ".id";

/// Block store keeping one file per block under a root directory.
///
/// Block identifiers embed client-chosen file names, so they are percent-escaped into flat file
/// names before touching the filesystem. Ids whose escaped form exceeds the file name limit are
/// stored under their SHA-256 digest in a side directory, next to a `.id` file holding the raw id.
/// A write lands in a temp file first and is renamed over the block file, so readers see the old
/// payload or the new one, never a partial file.
pub struct DiskBlockStore {
    root: PathBuf,
}

impl DiskBlockStore {
    /// Opens (and creates if needed) the storage directory.
    pub async fn open(root: impl Into<PathBuf>) -> ClusterResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(root.join(HASHED_DIR)).await.map_err(|e| {
            ClusterError::WriteFailure(format!(
                "cannot create storage directory {}: {}",
                root.display(),
                e
            ))
        })?;
        tracing::info!("Block store opened at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn block_path(&self, block_id: &BlockId) -> PathBuf {
        match block_file_name(block_id.as_str()) {
            BlockFileName::Escaped(name) => self.root.join(name),
            BlockFileName::Hashed(digest) => self.root.join(HASHED_DIR).join(digest),
        }
    }

    fn temp_path(&self) -> PathBuf {
        self.root.join(format!("{}{}.tmp", TEMP_PREFIX, Uuid::new_v4()))
    }

    /// Writes `data` to `path` through a temp file and a rename.
    async fn publish(&self, path: &Path, data: &[u8]) -> std::io::Result<()> {
        let temp = self.temp_path();
        if let Err(e) = tokio::fs::write(&temp, data).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e);
        }
        if let Err(e) = tokio::fs::rename(&temp, path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e);
        }
        Ok(())
    }

    async fn list_hashed(&self, ids: &mut Vec<BlockId>) -> ClusterResult<()> {
        let dir = self.root.join(HASHED_DIR);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(digest) = name.to_str().and_then(|n| n.strip_suffix(ID_SUFFIX)) else {
                continue;
            };
            if !tokio::fs::try_exists(dir.join(digest)).await? {
                continue;
            }
            let id = tokio::fs::read_to_string(entry.path()).await?;
            ids.push(BlockId(id));
        }
        Ok(())
    }
}

#[async_trait]
impl BlockStore for DiskBlockStore {
    async fn write_block(&self, block_id: &BlockId, payload: Bytes) -> ClusterResult<()> {
        let path = self.block_path(block_id);

        self.publish(&path, &payload).await.map_err(|e| {
            ClusterError::WriteFailure(format!("writing block {}: {}", block_id, e))
        })?;
        if let BlockFileName::Hashed(digest) = block_file_name(block_id.as_str()) {
            let id_path = self.root.join(HASHED_DIR).join(format!("{}{}", digest, ID_SUFFIX));
            self.publish(&id_path, block_id.as_str().as_bytes())
                .await
                .map_err(|e| {
                    ClusterError::WriteFailure(format!("recording id of block {}: {}", block_id, e))
                })?;
        }

        tracing::debug!("Wrote block {} ({} bytes) to {}", block_id, payload.len(), path.display());
        Ok(())
    }

    async fn read_block(&self, block_id: &BlockId) -> ClusterResult<Bytes> {
        match tokio::fs::read(self.block_path(block_id)).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(ClusterError::BlockNotFound(block_id.to_string()))
            }
            Err(e) => Err(ClusterError::Io(e)),
        }
    }

    async fn list_blocks(&self) -> ClusterResult<Vec<BlockId>> {
        let mut ids = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if name.starts_with(TEMP_PREFIX) || name == HASHED_DIR {
                continue;
            }
            match urlencoding::decode(name) {
                Ok(id) => ids.push(BlockId(id.into_owned())),
                Err(_) => tracing::warn!("Ignoring unexpected file in block store: {}", name),
            }
        }
        self.list_hashed(&mut ids).await?;

        ids.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(ids)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum BlockFileName {
    Escaped(String),
    Hashed(String),
}

/// Maps a block id onto a single path component.
///
/// Escaping keeps ASCII alphanumerics and `-_.~`; a leading `.` is escaped too so block files
/// never look like temp files.
pub fn block_file_name(block_id: &str) -> BlockFileName {
    let mut name = urlencoding::encode(block_id).into_owned();
    if name.starts_with(TEMP_PREFIX) {
        name.replace_range(..1, "%2E");
    }
    if name.len() > MAX_FILE_NAME {
        let digest = Sha256::digest(block_id.as_bytes());
        return BlockFileName::Hashed(format!("{:x}", digest));
    }
    BlockFileName::Escaped(name)
}
