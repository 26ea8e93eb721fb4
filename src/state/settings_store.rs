//! JSON-file backed key-value settings with explicit read/commit

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::{PluginError, Result};

/// Key holding the subtle notification preference
pub const KEY_SUBTLE_MODE: &str = "subtle_mode";
/// Key holding the recent timer durations, newest first
pub const KEY_RECENT_TIMERS: &str = "recent_timers_seconds";

/// File name used inside the settings directory
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Settings store with an in-memory working copy.
///
/// `set` only touches the working copy; nothing reaches disk until `commit`.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl SettingsStore {
    /// Create an empty store persisting to `settings.json` under `dir`
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self::at_path(dir.as_ref().join(SETTINGS_FILE_NAME))
    }

    /// Create an empty store persisting to an explicit file path
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            values: Map::new(),
        }
    }

    /// Load the persisted file into the working copy.
    ///
    /// A missing file leaves the store empty.
    pub fn read(&mut self) -> Result<()> {
        info!("Reading settings from {}", self.path.display());

        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No settings file yet, starting empty");
                self.values.clear();
                return Ok(());
            }
            Err(e) => return Err(PluginError::io(&self.path, e)),
        };

        self.values = if contents.trim().is_empty() {
            Map::new()
        } else {
            serde_json::from_str(&contents)?
        };
        Ok(())
    }

    /// Write the working copy to disk
    pub fn commit(&self) -> Result<()> {
        info!("Saving settings to {}", self.path.display());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| PluginError::io(parent, e))?;
            }
        }

        let contents = serde_json::to_string_pretty(&self.values)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, contents).map_err(|e| PluginError::io(&tmp_path, e))?;
        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            if let Err(cleanup) = fs::remove_file(&tmp_path) {
                warn!("Failed to remove {}: {}", tmp_path.display(), cleanup);
            }
            return Err(PluginError::io(&self.path, e));
        }
        Ok(())
    }

    /// Get a typed value, falling back to `default` when absent or mistyped
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        debug!("Get {}", key);
        match self.values.get(key) {
            Some(value) => match T::deserialize(value) {
                Ok(v) => v,
                Err(e) => {
                    warn!("Ignoring invalid value for {}: {}", key, e);
                    default
                }
            },
            None => default,
        }
    }

    /// Get the raw JSON value stored under `key`
    pub fn get_raw(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Update the working copy. Call `commit` to persist.
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        debug!("Set {}: {}", key, value);
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let mut store = SettingsStore::new(dir.path());
        store.read().unwrap();
        assert!(!store.get(KEY_SUBTLE_MODE, false));
        assert!(store.get_raw(KEY_RECENT_TIMERS).is_none());
    }

    #[test]
    fn test_set_is_visible_before_commit_but_not_persisted() {
        let dir = tempdir().unwrap();
        let mut store = SettingsStore::new(dir.path());
        store.set(KEY_SUBTLE_MODE, true).unwrap();
        assert!(store.get(KEY_SUBTLE_MODE, false));

        let mut fresh = SettingsStore::new(dir.path());
        fresh.read().unwrap();
        assert!(!fresh.get(KEY_SUBTLE_MODE, false));
    }

    #[test]
    fn test_commit_then_fresh_read() {
        let dir = tempdir().unwrap();
        let mut store = SettingsStore::new(dir.path().join("nested"));
        store.set(KEY_SUBTLE_MODE, true).unwrap();
        store.set(KEY_RECENT_TIMERS, vec![300u64, 60]).unwrap();
        store.commit().unwrap();

        let mut fresh = SettingsStore::new(dir.path().join("nested"));
        fresh.read().unwrap();
        assert!(fresh.get(KEY_SUBTLE_MODE, false));
        assert_eq!(fresh.get(KEY_RECENT_TIMERS, Vec::<u64>::new()), vec![300, 60]);
    }

    #[test]
    fn test_wrong_type_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let mut store = SettingsStore::new(dir.path());
        store.set(KEY_SUBTLE_MODE, "yes").unwrap();
        assert!(!store.get(KEY_SUBTLE_MODE, false));
        assert_eq!(store.get_raw(KEY_SUBTLE_MODE), Some(&Value::from("yes")));
    }

    #[test]
    fn test_failed_rename_removes_temporary_file() {
        let dir = tempdir().unwrap();
        // A directory in place of the settings file makes the rename fail
        fs::create_dir_all(dir.path().join(SETTINGS_FILE_NAME).join("occupied")).unwrap();

        let mut store = SettingsStore::new(dir.path());
        store.set(KEY_SUBTLE_MODE, true).unwrap();
        assert!(matches!(store.commit(), Err(PluginError::Io { .. })));
        assert!(!dir.path().join("settings.json.tmp").exists());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE_NAME), "{not json").unwrap();
        let mut store = SettingsStore::new(dir.path());
        assert!(matches!(store.read(), Err(PluginError::Json(_))));
    }
}
