use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::BatchResult;

/// Durable sink for batch progress snapshots. Every save replaces the
/// previous snapshot with the full result collection.
pub trait CheckpointStore: Send + Sync {
    fn save(&self, results: &[BatchResult]) -> Result<(), CheckpointError>;
}

/// JSON checkpoint file, replaced via write-to-temp-then-rename.
#[derive(Debug, Clone)]
pub struct JsonFileCheckpoint {
    path: PathBuf,
}

impl JsonFileCheckpoint {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        PathBuf::from(staging)
    }
}

impl CheckpointStore for JsonFileCheckpoint {
    fn save(&self, results: &[BatchResult]) -> Result<(), CheckpointError> {
        let payload = serde_json::to_vec_pretty(results)?;
        let staging = self.staging_path();
        fs::write(&staging, payload).map_err(|source| CheckpointError::Io {
            path: staging.display().to_string(),
            source,
        })?;
        fs::rename(&staging, &self.path).map_err(|source| CheckpointError::Io {
            path: self.path.display().to_string(),
            source,
        })
    }
}

/// Reads a checkpoint written by [`JsonFileCheckpoint`].
pub fn load_checkpoint(path: impl AsRef<Path>) -> Result<Vec<BatchResult>, CheckpointError> {
    let path = path.as_ref();
    let raw = fs::read(path).map_err(|source| CheckpointError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_slice(&raw)?)
}

/// In-memory store that keeps the size of every snapshot it receives.
#[derive(Debug, Default)]
pub struct MemoryCheckpoint {
    snapshots: Mutex<Vec<usize>>,
    latest: Mutex<Vec<BatchResult>>,
}

impl MemoryCheckpoint {
    pub fn snapshot_sizes(&self) -> Vec<usize> {
        self.snapshots
            .lock()
            .map(|sizes| sizes.clone())
            .unwrap_or_default()
    }

    pub fn latest(&self) -> Vec<BatchResult> {
        self.latest
            .lock()
            .map(|latest| latest.clone())
            .unwrap_or_default()
    }
}

impl CheckpointStore for MemoryCheckpoint {
    fn save(&self, results: &[BatchResult]) -> Result<(), CheckpointError> {
        let mut sizes = self.snapshots.lock().map_err(|_| CheckpointError::Poisoned)?;
        let mut latest = self.latest.lock().map_err(|_| CheckpointError::Poisoned)?;
        sizes.push(results.len());
        *latest = results.to_vec();
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("checkpoint io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("checkpoint serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("checkpoint store lock poisoned")]
    Poisoned,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::leads::batch::LeadStatus;
    use crate::workflows::leads::domain::{Lead, LeadId};

    fn failed(position: usize) -> BatchResult {
        let lead = Lead::new(LeadId::positional(position), format!("Company {position}"))
            .expect("lead");
        BatchResult::failed(lead, None, "boom".to_string())
    }

    #[test]
    fn file_checkpoint_replaces_previous_snapshot() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("progress.json");
        let store = JsonFileCheckpoint::new(&path);

        store.save(&[failed(0), failed(1)]).expect("first save");
        store.save(&[failed(0)]).expect("second save");

        let restored = load_checkpoint(&path).expect("load");
        assert_eq!(restored.len(), 1);
        assert_eq!(restored[0].lead.id().0, "lead_1");
        assert_eq!(restored[0].status, LeadStatus::Error);
        assert!(!store.staging_path().exists());
    }

    #[test]
    fn load_reports_missing_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let error = load_checkpoint(dir.path().join("absent.json")).expect_err("missing");
        assert!(matches!(error, CheckpointError::Io { .. }));
    }

    #[test]
    fn memory_checkpoint_tracks_snapshot_sizes() {
        let store = MemoryCheckpoint::default();
        store.save(&[failed(0)]).expect("save");
        store.save(&[failed(0), failed(1)]).expect("save");
        assert_eq!(store.snapshot_sizes(), vec![1, 2]);
        assert_eq!(store.latest().len(), 2);
    }
}
