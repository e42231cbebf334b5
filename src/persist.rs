//! Persisted state storage
//!
//! Writes the store's persisted subset to a JSON file so the last fetched
//! snapshot, location and recent searches survive restarts. The file lives
//! in the platform data directory and wraps the state in a versioned
//! envelope; a version mismatch discards the stored state rather than
//! attempting migration. Only the composition root touches this module —
//! the store itself stays storage-free.

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::data::{Location, WeatherSnapshot};

/// Storage key; also the file stem of the JSON file on disk
const STORAGE_KEY: &str = "weather-storage";

/// Current envelope version
const STORAGE_VERSION: u32 = 1;

/// The subset of store state that survives restarts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    /// Last successfully fetched snapshot
    pub weather: Option<WeatherSnapshot>,
    /// Location the snapshot was fetched for
    pub last_location: Option<Location>,
    /// When the snapshot was fetched
    pub last_updated: Option<DateTime<Utc>>,
    /// Up to 5 most recently selected locations, newest first
    pub recent_searches: Vec<Location>,
}

/// On-disk envelope around the persisted state
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    state: PersistedState,
    version: u32,
}

/// Reads and writes the persisted state file
#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    /// Creates a store in the platform data directory
    /// (`~/.local/share/weatherly/` on Linux). Returns `None` when no home
    /// directory can be determined.
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "weatherly")?;
        Some(Self {
            dir: project_dirs.data_local_dir().to_path_buf(),
        })
    }

    /// Creates a store over a custom directory (for tests)
    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path(&self) -> PathBuf {
        self.dir.join(format!("{STORAGE_KEY}.json"))
    }

    /// Writes the persisted subset, creating the directory if needed.
    pub fn save(&self, state: &PersistedState) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;

        let envelope = Envelope {
            state: state.clone(),
            version: STORAGE_VERSION,
        };
        let json = serde_json::to_string_pretty(&envelope)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        fs::write(self.path(), json)
    }

    /// Reads the persisted subset back.
    ///
    /// Returns `None` when the file is missing, unparseable, or written by
    /// a different envelope version.
    pub fn load(&self) -> Option<PersistedState> {
        let content = fs::read_to_string(self.path()).ok()?;
        let envelope: Envelope = serde_json::from_str(&content).ok()?;

        if envelope.version != STORAGE_VERSION {
            return None;
        }

        Some(envelope.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_location() -> Location {
        Location {
            id: 2643743,
            name: "London".to_string(),
            country: "United Kingdom".to_string(),
            latitude: 51.5074,
            longitude: -0.1278,
        }
    }

    fn create_test_store() -> (StateStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = StateStore::with_dir(temp_dir.path().to_path_buf());
        (store, temp_dir)
    }

    #[test]
    fn test_load_returns_none_when_file_missing() {
        let (store, _temp_dir) = create_test_store();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let (store, _temp_dir) = create_test_store();

        let state = PersistedState {
            weather: None,
            last_location: Some(sample_location()),
            last_updated: Some(Utc::now()),
            recent_searches: vec![sample_location()],
        };

        store.save(&state).expect("save should succeed");
        let loaded = store.load().expect("load should succeed");

        assert_eq!(loaded, state);
    }

    #[test]
    fn test_save_creates_directory_if_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested = temp_dir.path().join("deeply").join("nested");
        let store = StateStore::with_dir(nested.clone());

        store
            .save(&PersistedState::default())
            .expect("save should succeed");

        assert!(nested.join("weather-storage.json").exists());
    }

    #[test]
    fn test_envelope_uses_documented_shape() {
        let (store, temp_dir) = create_test_store();

        let state = PersistedState {
            last_location: Some(sample_location()),
            ..Default::default()
        };
        store.save(&state).expect("save should succeed");

        let raw = std::fs::read_to_string(temp_dir.path().join("weather-storage.json"))
            .expect("file should exist");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("valid JSON");

        assert_eq!(value["version"], 1);
        assert!(value["state"]["lastLocation"].is_object());
        assert!(value["state"]["recentSearches"].is_array());
    }

    #[test]
    fn test_version_mismatch_discards_state() {
        let (store, temp_dir) = create_test_store();
        store
            .save(&PersistedState::default())
            .expect("save should succeed");

        // rewrite the envelope with a future version
        let path = temp_dir.path().join("weather-storage.json");
        let raw = std::fs::read_to_string(&path).expect("file should exist");
        let bumped = raw.replace("\"version\": 1", "\"version\": 2");
        std::fs::write(&path, bumped).expect("rewrite should succeed");

        assert!(store.load().is_none());
    }

    #[test]
    fn test_corrupt_file_loads_as_none() {
        let (store, temp_dir) = create_test_store();
        std::fs::create_dir_all(temp_dir.path()).expect("dir exists");
        std::fs::write(temp_dir.path().join("weather-storage.json"), "{ nope")
            .expect("write should succeed");

        assert!(store.load().is_none());
    }
}
