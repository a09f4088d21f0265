use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::Task;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializeError(#[from] serde_json::Error),
    #[error("Failed to create storage directory: {0}")]
    DirectoryError(String),
}

/// JSON-file persistence for the task collection. The whole collection is
/// one array in one file, replaced wholesale on every save.
pub struct TaskStore {
    path: PathBuf,
}

impl TaskStore {
    /// Open a store at the given path, creating the parent directory if
    /// needed. The file itself appears on first save.
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let store_path = PathBuf::from(path);

        if let Some(parent) = store_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)
                    .map_err(|e| StoreError::DirectoryError(e.to_string()))?;
            }
        }

        Ok(TaskStore { path: store_path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored collection. A missing file is an empty collection. A
    /// file that fails to parse as the expected schema is corrupt: it is
    /// deleted, a warning goes to stderr, and an empty collection comes
    /// back. Corruption is never surfaced as an error to the caller.
    pub fn load(&self) -> Result<Vec<Task>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::IoError(e)),
        };

        match serde_json::from_str::<Vec<Task>>(&raw) {
            Ok(tasks) => Ok(tasks),
            Err(e) => {
                eprintln!(
                    "Warning: discarding corrupt task data at {}: {}",
                    self.path.display(),
                    e
                );
                if let Err(e) = fs::remove_file(&self.path) {
                    eprintln!("Warning: failed to remove corrupt task data: {}", e);
                }
                Ok(Vec::new())
            }
        }
    }

    /// Replace the stored collection. Writes to a temp file in the same
    /// directory, then renames over the target, so a crash mid-write never
    /// leaves a half-written blob.
    pub fn save(&self, tasks: &[Task]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(tasks)?;

        let temp_path = self.temp_path();
        if let Err(e) = write_synced(&temp_path, json.as_bytes())
            .and_then(|()| fs::rename(&temp_path, &self.path))
        {
            // An aborted save must not leave its temp file behind.
            let _ = fs::remove_file(&temp_path);
            return Err(StoreError::IoError(e));
        }
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("tasks.json");
        self.path
            .with_file_name(format!("{}.tmp.{}", name, std::process::id()))
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
