use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use vpiano_ports::storage::{SettingsDto, StorageError, StoragePort};

const SETTINGS_FILE: &str = "settings.json";

/// Settings persisted as JSON under one base directory.
pub struct FsStorage {
    base_dir: PathBuf,
}

impl FsStorage {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// `<config dir>/VirtualPiano`.
    pub fn default_base_dir() -> Result<PathBuf, StorageError> {
        dirs_next::config_dir()
            .map(|base| base.join("VirtualPiano"))
            .ok_or_else(|| StorageError::Io("config dir not found".to_string()))
    }

    pub fn settings_path(&self) -> PathBuf {
        self.base_dir.join(SETTINGS_FILE)
    }
}

impl Default for FsStorage {
    fn default() -> Self {
        let base_dir = Self::default_base_dir().unwrap_or_else(|err| {
            warn!(%err, "falling back to the working directory for settings");
            PathBuf::from(".")
        });
        Self { base_dir }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    let data = fs::read(path).map_err(|e| StorageError::Io(e.to_string()))?;
    serde_json::from_slice(&data).map_err(|e| StorageError::Serde(e.to_string()))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StorageError::Io(e.to_string()))?;
    }
    let data = serde_json::to_vec_pretty(value).map_err(|e| StorageError::Serde(e.to_string()))?;
    fs::write(path, data).map_err(|e| StorageError::Io(e.to_string()))
}

impl StoragePort for FsStorage {
    fn load_settings(&self) -> Result<SettingsDto, StorageError> {
        let path = self.settings_path();
        if !path.exists() {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(SettingsDto::default());
        }
        read_json(&path)
    }

    fn save_settings(&self, s: &SettingsDto) -> Result<(), StorageError> {
        let path = self.settings_path();
        write_json(&path, s)?;
        debug!(path = %path.display(), "settings saved");
        Ok(())
    }
}
