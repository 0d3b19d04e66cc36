//! Durable user preferences.
//!
//! One serialized JSON record per namespace key. The file-backed store
//! lives under the user config directory; reads and writes never fail
//! outward. A broken record degrades to "nothing persisted" and the
//! failure is logged.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use parking_lot::Mutex;
use tracing::warn;

/// Key-value persistence seam for serialized preference records.
///
/// Writes are fire-and-forget: last write wins and no acknowledgement is
/// reported back to the caller.
pub trait PreferenceStore: Send + Sync {
    /// Read the serialized record for `key`, if one exists and is readable.
    fn read(&self, key: &str) -> Option<String>;

    /// Replace the serialized record for `key`.
    fn write(&self, key: &str, value: &str);
}

/// Preference store persisted as `<config_dir>/topcharts/<key>.json`.
pub struct FilePreferenceStore {
    dir: PathBuf,
}

impl FilePreferenceStore {
    /// Store under the platform config directory, falling back to the
    /// working directory when none is available.
    pub fn new() -> Self {
        let dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("topcharts");
        Self { dir }
    }

    /// Store under an explicit directory.
    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Default for FilePreferenceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn read(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.record_path(key)) {
            Ok(contents) => Some(contents),
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => {
                warn!(key, %err, "failed to read preference record");
                None
            }
        }
    }

    fn write(&self, key: &str, value: &str) {
        let result = fs::create_dir_all(&self.dir)
            .and_then(|()| fs::write(self.record_path(key), value));
        if let Err(err) = result {
            warn!(key, %err, "failed to write preference record");
        }
    }
}

/// In-memory store for tests and environments without a config directory.
#[derive(Default)]
pub struct MemoryPreferenceStore {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn read(&self, key: &str) -> Option<String> {
        self.records.lock().get(key).cloned()
    }

    fn write(&self, key: &str, value: &str) {
        self.records.lock().insert(key.to_string(), value.to_string());
    }
}
