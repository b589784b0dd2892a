use dashmap::DashMap;
use std::sync::Arc;

use super::types::FileRecord;

/// In-memory file record table.
///
/// Records are immutable once inserted; a commit swaps in a new `Arc` under the shard write
/// lock and a lookup clones the `Arc` under the shard read lock, so a reader holds either the
/// old record or the new one in full. Lives for the process lifetime only.
#[derive(Default)]
pub struct FileTable {
    records: DashMap<String, Arc<FileRecord>>,
}

impl FileTable {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Stores `record`, replacing any previous record of the same file. Returns the replaced one.
    pub fn replace(&self, record: FileRecord) -> Option<Arc<FileRecord>> {
        self.records
            .insert(record.file_name.clone(), Arc::new(record))
    }

    pub fn get(&self, file_name: &str) -> Option<Arc<FileRecord>> {
        self.records.get(file_name).map(|entry| entry.value().clone())
    }

    /// File names in sorted order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .records
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}
