//! Durable preference store.
//!
//! The controller persists its user-facing preferences under a handful of
//! string keys whose values are JSON documents. Every read tolerates absent
//! or malformed data by falling back to defaults; every write failure is
//! logged and swallowed so persistence never breaks the controller.

use crate::catalog::FilterMode;
use crate::error::{Result, ShowcaseError};
use crate::ports::ScrollMode;
use crate::preview::PreviewMode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, error, warn};

/// Key for [`AutopilotSettings`].
pub const SETTINGS_KEY: &str = "autopilotSettings";
/// Key for the favorite id list.
pub const FAVORITES_KEY: &str = "autopilotFavorites";
/// Key for the viewed id list.
pub const VIEWED_KEY: &str = "autopilotViewed";
/// Key for [`SessionStats`].
pub const STATS_KEY: &str = "autopilotStats";
/// Key for [`PanelPosition`].
pub const POSITION_KEY: &str = "autopilotPosition";

/// Key/value storage that survives restarts.
pub trait PreferenceStore: Send + Sync {
    /// Stored value for `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ShowcaseError::Store`] or an I/O error if the value cannot
    /// be made durable.
    fn set(&self, key: &str, value: String) -> Result<()>;
}

/// Persisted autopilot preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AutopilotSettings {
    /// Advance interval in milliseconds.
    pub speed: u64,
    /// Preview presentation.
    pub preview_mode: PreviewMode,
    /// Wrap around at the end of the active view.
    #[serde(rename = "loop")]
    pub loop_enabled: bool,
    /// Open the embedded preview automatically for each new entry.
    pub auto_open: bool,
    /// Shuffle the active view.
    pub shuffle: bool,
    /// How the current entry is scrolled into view.
    pub scroll_mode: ScrollMode,
    /// Active filter.
    pub filter_category: FilterMode,
}

impl Default for AutopilotSettings {
    fn default() -> Self {
        Self {
            speed: 5_000,
            preview_mode: PreviewMode::None,
            loop_enabled: true,
            auto_open: false,
            shuffle: false,
            scroll_mode: ScrollMode::Center,
            filter_category: FilterMode::All,
        }
    }
}

/// Lifetime session counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionStats {
    /// Sessions started.
    pub started: u32,
    /// Sessions that ran to the end of the active view.
    pub completed: u32,
}

/// Saved control panel position, in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PanelPosition {
    /// Distance from the left edge.
    pub left: f64,
    /// Distance from the top edge.
    pub top: f64,
}

/// Read and decode the JSON value under `key`.
///
/// Returns `None` when absent. Malformed data is logged and treated as
/// absent.
pub fn load_json<T: DeserializeOwned>(store: &dyn PreferenceStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, "ignoring malformed stored preference: {e}");
            None
        }
    }
}

/// Like [`load_json`] but falls back to `T::default()`.
pub fn load_or_default<T: DeserializeOwned + Default>(store: &dyn PreferenceStore, key: &str) -> T {
    load_json(store, key).unwrap_or_default()
}

/// Encode `value` as JSON and store it under `key`. Failures are logged.
pub fn store_json<T: Serialize>(store: &dyn PreferenceStore, key: &str, value: &T) {
    let result = serde_json::to_string(value)
        .map_err(ShowcaseError::from)
        .and_then(|json| store.set(key, json));
    if let Err(e) = result {
        error!(key, "cannot persist preference: {e}");
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Volatile store for tests and hosts without durable storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value.
    pub fn with(self, key: &str, value: &str) -> Self {
        lock(&self.values).insert(key.to_owned(), value.to_owned());
        self
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.values).get(key).cloned()
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        lock(&self.values).insert(key.to_owned(), value);
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default = "default_store_version")]
    version: u8,
    #[serde(default)]
    values: BTreeMap<String, String>,
}

fn default_store_version() -> u8 {
    1
}

/// Store backed by one JSON file, rewritten on every `set`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file starts empty; an unreadable
    /// or corrupt file is logged and also starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<StoreFile>(&bytes) {
                Ok(file) => file.values,
                Err(e) => {
                    warn!(path = %path.display(), "cannot parse preference file: {e}");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!(path = %path.display(), "cannot read preference file: {e}");
                BTreeMap::new()
            }
        };
        debug!(path = %path.display(), keys = values.len(), "preference store opened");
        Self {
            path,
            values: Mutex::new(values),
        }
    }

    /// `<data dir>/cosmic-autopilot/preferences.json`.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join("cosmic-autopilot")
            .join("preferences.json")
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, values: &BTreeMap<String, String>) -> Result<()> {
        let file = StoreFile {
            version: default_store_version(),
            values: values.clone(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ShowcaseError::Store(format!("cannot create {}: {e}", parent.display()))
            })?;
        }
        std::fs::write(&self.path, json).map_err(|e| {
            ShowcaseError::Store(format!("cannot write {}: {e}", self.path.display()))
        })
    }
}

impl PreferenceStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.values).get(key).cloned()
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        let mut values = lock(&self.values);
        values.insert(key.to_owned(), value);
        self.write(&values)
    }
}
