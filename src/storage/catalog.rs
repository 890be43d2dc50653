use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::error::CatalogError;

/// Catalog entry for one finalized recording
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    /// Location of the finalized file
    pub path: PathBuf,

    /// Display title (the file name)
    pub title: String,

    /// File size after finalize, in bytes
    pub size_bytes: u64,

    pub mime_type: String,

    /// Wall-clock creation time, seconds since the Unix epoch
    pub created_at_epoch_secs: i64,

    /// Artist tag (the recording application's name)
    pub artist: String,

    /// Elapsed recording time measured on the monotonic clock
    pub duration_ms: u64,

    pub is_podcast: bool,
}

/// Shared storage metadata index
#[async_trait]
pub trait ArtifactCatalog: Send + Sync {
    /// Insert one record; only called after the device finalized the file
    async fn insert(&self, record: &ArtifactRecord) -> Result<(), CatalogError>;
}

/// Catalog held in process memory
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    records: Mutex<Vec<ArtifactRecord>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every inserted record, oldest first
    pub fn records(&self) -> Vec<ArtifactRecord> {
        self.records.lock().clone()
    }
}

#[async_trait]
impl ArtifactCatalog for MemoryCatalog {
    async fn insert(&self, record: &ArtifactRecord) -> Result<(), CatalogError> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}

/// Catalog appended to a file, one JSON object per line
#[derive(Debug, Clone)]
pub struct JsonLinesCatalog {
    path: PathBuf,
}

impl JsonLinesCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Read every record back from disk
    pub async fn load(&self) -> Result<Vec<ArtifactRecord>, CatalogError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(CatalogError::from))
            .collect()
    }
}

#[async_trait]
impl ArtifactCatalog for JsonLinesCatalog {
    async fn insert(&self, record: &ArtifactRecord) -> Result<(), CatalogError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;

        info!("Cataloged {} in {}", record.title, self.path.display());

        Ok(())
    }
}
