//! Load/save collaborators for the prompt history snapshot.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use directories::ProjectDirs;
use mediadeck_shared::PromptEntry;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{Result, StoreError};

/// Current on-disk snapshot format.
pub const SNAPSHOT_VERSION: u32 = 1;

const SNAPSHOT_FILE_NAME: &str = "prompt_history.json";

/// Serialized form of the history, newest entry first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySnapshot {
    pub version: u32,
    /// RFC 3339 timestamp of when the snapshot was written.
    pub saved_at: String,
    pub entries: Vec<PromptEntry>,
}

/// Where the prompt history is persisted between runs.
pub trait HistorySnapshotStore: Send + Sync {
    /// Read the last saved history, newest first. An absent snapshot is an
    /// empty history, not an error.
    fn load(&self) -> Result<Vec<PromptEntry>>;

    /// Replace the saved history with `entries`.
    fn save(&self, entries: &[PromptEntry]) -> Result<()>;
}

// ---------------------------------------------------------------------------
// JSON file
// ---------------------------------------------------------------------------

/// Stores the snapshot as a JSON file, replaced atomically on every save.
#[derive(Debug, Clone)]
pub struct JsonFileHistoryStore {
    path: PathBuf,
}

impl JsonFileHistoryStore {
    /// Use an explicit file path. Useful for tests and custom layouts.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Use the platform-appropriate data directory:
    /// - Linux:   `~/.local/share/mediadeck/prompt_history.json`
    /// - macOS:   `~/Library/Application Support/com.mediadeck.mediadeck/prompt_history.json`
    /// - Windows: `{FOLDERID_RoamingAppData}\mediadeck\mediadeck\data\prompt_history.json`
    pub fn default_location() -> Result<Self> {
        let project_dirs =
            ProjectDirs::from("com", "mediadeck", "mediadeck").ok_or(StoreError::NoDataDir)?;
        let path = project_dirs.data_dir().join(SNAPSHOT_FILE_NAME);

        info!(path = %path.display(), "using default history snapshot location");
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl HistorySnapshotStore for JsonFileHistoryStore {
    fn load(&self) -> Result<Vec<PromptEntry>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no history snapshot yet");
            return Ok(Vec::new());
        }

        let raw = std::fs::read_to_string(&self.path)?;
        let snapshot: HistorySnapshot = serde_json::from_str(&raw)?;

        if snapshot.version > SNAPSHOT_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }

        debug!(
            path = %self.path.display(),
            entries = snapshot.entries.len(),
            "loaded history snapshot"
        );
        Ok(snapshot.entries)
    }

    fn save(&self, entries: &[PromptEntry]) -> Result<()> {
        let dir = self.parent_dir();
        std::fs::create_dir_all(dir)?;

        let snapshot = HistorySnapshot {
            version: SNAPSHOT_VERSION,
            saved_at: chrono::Utc::now().to_rfc3339(),
            entries: entries.to_vec(),
        };

        // Write beside the target, then rename over it, so a crash never
        // leaves a half-written snapshot.
        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, &snapshot)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;

        debug!(path = %self.path.display(), entries = entries.len(), "saved history snapshot");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In memory
// ---------------------------------------------------------------------------

/// Keeps the snapshot in process memory. For tests and hosts without disk.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    entries: Mutex<Vec<PromptEntry>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<PromptEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }
}

impl HistorySnapshotStore for MemoryHistoryStore {
    fn load(&self) -> Result<Vec<PromptEntry>> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.clone())
    }

    fn save(&self, entries: &[PromptEntry]) -> Result<()> {
        let mut stored = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        *stored = entries.to_vec();
        Ok(())
    }
}
