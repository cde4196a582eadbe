//! Durable welcome counter.
//!
//! A single JSON record (`{"count": N}`) on disk. Writes go through a
//! temp-file-then-rename replace so a crash mid-write can never leave a
//! value other than the last fully written one. The read-modify-write of
//! `increment` is serialized behind a mutex so two invocations completing
//! at the same instant cannot lose an update.

use crate::error::DoormanError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::info;

#[derive(Debug, Serialize, Deserialize)]
struct CounterRecord {
    count: u64,
}

/// Owns the on-disk welcome counter.
pub struct CounterStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl CounterStore {
    /// Counter backed by `<data_dir>/welcome_count.json`.
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join("welcome_count.json"),
            lock: Mutex::new(()),
        }
    }

    /// Read the persisted count, initializing the record to 0 on first
    /// access. Initialization is idempotent: a second read also returns 0.
    pub async fn read(&self) -> Result<u64, DoormanError> {
        let _guard = self.lock.lock().await;
        self.read_or_init()
    }

    /// Add one to the persisted count and return the new value.
    pub async fn increment(&self) -> Result<u64, DoormanError> {
        let _guard = self.lock.lock().await;
        let next = self.read_or_init()? + 1;
        self.persist(next)?;
        Ok(next)
    }

    fn read_or_init(&self) -> Result<u64, DoormanError> {
        if !self.path.exists() {
            info!("counter file not found at {}, initializing to 0", self.path.display());
            self.persist(0)?;
            return Ok(0);
        }
        let data = std::fs::read_to_string(&self.path)?;
        let record: CounterRecord = serde_json::from_str(&data)?;
        Ok(record.count)
    }

    /// Atomic-replace write: temp file in the same directory, then rename.
    fn persist(&self, count: u64) -> Result<(), DoormanError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string(&CounterRecord { count })?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
