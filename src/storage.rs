use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::store::{Observer, State};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("state file I/O: {0}")]
    Io(#[from] io::Error),
    #[error("state file parse: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read the full state from disk. A missing or empty file is a fresh start,
/// not an error; a corrupt file is.
pub fn load(path: &Path) -> Result<State, StorageError> {
    if !path.exists() {
        return Ok(State::default());
    }
    let raw = fs::read_to_string(path)?;
    if raw.trim().is_empty() {
        return Ok(State::default());
    }
    Ok(serde_json::from_str(&raw)?)
}

/// Serialize the full state to disk. Write-then-rename so a crash mid-write
/// leaves the previous snapshot intact.
pub fn save(path: &Path, state: &State) -> Result<(), StorageError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(state)?;
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Store observer that persists every published snapshot. A failed save is
/// logged and dropped; the in-memory state stays authoritative for the
/// session.
pub struct Autosave {
    path: PathBuf,
}

impl Autosave {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Observer for Autosave {
    fn state_changed(&self, state: &State) {
        if let Err(e) = save(&self.path, state) {
            log::error!("Failed to persist state to {}: {}", self.path.display(), e);
        }
    }
}
