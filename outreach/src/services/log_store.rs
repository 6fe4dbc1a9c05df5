//! Campaign log store implementations
//!
//! `FileLogStore` keeps the whole history in one JSON document. Counters and
//! records are written together through a temporary file that is renamed over
//! the previous version, so a reader sees either the old or the new state and
//! never a record without its count.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use shared::{process_debug, OutreachRecord, ProcessId};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::core::RateWindowCounters;
use crate::error::{OutreachError, OutreachResult};
use crate::traits::{CampaignLogStore, LogSnapshot};

/// File name used inside the data directory
pub const LOG_FILE_NAME: &str = "campaign_log.json";

/// JSON file backed log store
pub struct FileLogStore {
    path: PathBuf,
    /// Serialises read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl FileLogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Store at the default file name inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(LOG_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn read_snapshot(&self) -> OutreachResult<LogSnapshot> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                process_debug!(
                    ProcessId::current(),
                    "📂 No campaign log at {}, starting with empty history",
                    self.path.display()
                );
                return Ok(LogSnapshot::default());
            }
            Err(e) => return Err(OutreachError::storage(format!("read {}", self.path.display()), e)),
        };

        if content.trim().is_empty() {
            return Ok(LogSnapshot::default());
        }

        let mut snapshot: LogSnapshot = serde_json::from_str(&content)
            .map_err(|e| OutreachError::storage(format!("parse {}", self.path.display()), e))?;
        snapshot.reconcile();
        Ok(snapshot)
    }

    async fn write_snapshot(&self, snapshot: &LogSnapshot) -> OutreachResult<()> {
        let operation = || format!("write {}", self.path.display());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| OutreachError::storage(operation(), e))?;
        }

        let content = serde_json::to_vec_pretty(snapshot).map_err(|e| OutreachError::storage(operation(), e))?;

        let temp_path = self.temp_path();
        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| OutreachError::storage(operation(), e))?;
        file.write_all(&content)
            .await
            .map_err(|e| OutreachError::storage(operation(), e))?;
        file.sync_all().await.map_err(|e| OutreachError::storage(operation(), e))?;
        drop(file);

        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| OutreachError::storage(operation(), e))?;
        Ok(())
    }
}

#[async_trait]
impl CampaignLogStore for FileLogStore {
    async fn load(&self) -> OutreachResult<LogSnapshot> {
        self.read_snapshot().await
    }

    async fn counters(&self) -> OutreachResult<RateWindowCounters> {
        Ok(self.read_snapshot().await?.counters)
    }

    async fn append(&self, record: OutreachRecord) -> OutreachResult<RateWindowCounters> {
        let _guard = self.write_lock.lock().await;

        // Re-read under the lock so appends made by other instances are kept
        let mut snapshot = self.read_snapshot().await?;
        snapshot.counters.apply(&record);
        snapshot.records.push(record);
        self.write_snapshot(&snapshot).await?;

        Ok(snapshot.counters)
    }
}

/// In-memory log store for tests and dry runs
#[derive(Default)]
pub struct MemoryLogStore {
    snapshot: Mutex<LogSnapshot>,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing history; counters are reconciled against the records
    pub fn with_snapshot(mut snapshot: LogSnapshot) -> Self {
        snapshot.reconcile();
        Self {
            snapshot: Mutex::new(snapshot),
        }
    }

    pub async fn records(&self) -> Vec<OutreachRecord> {
        self.snapshot.lock().await.records.clone()
    }
}

#[async_trait]
impl CampaignLogStore for MemoryLogStore {
    async fn load(&self) -> OutreachResult<LogSnapshot> {
        Ok(self.snapshot.lock().await.clone())
    }

    async fn counters(&self) -> OutreachResult<RateWindowCounters> {
        Ok(self.snapshot.lock().await.counters.clone())
    }

    async fn append(&self, record: OutreachRecord) -> OutreachResult<RateWindowCounters> {
        let mut snapshot = self.snapshot.lock().await;
        snapshot.counters.apply(&record);
        snapshot.records.push(record);
        Ok(snapshot.counters.clone())
    }
}
