//! String key/value persistence.
//!
//! Values are stored pre-serialized, one JSON object per data directory:
//! `{"pomodoroSettings": "{...}", "pomodoroProgress": "{...}"}`.

use std::{
    collections::BTreeMap,
    env, fs, io,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{progress::DailyProgress, settings::Settings};

pub const SETTINGS_KEY: &str = "pomodoroSettings";
pub const PROGRESS_KEY: &str = "pomodoroProgress";
const STORAGE_FILE: &str = "storage.json";
const APP_DIR: &str = env!("CARGO_PKG_NAME");

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("malformed stored value: {0}")]
    Json(#[from] serde_json::Error),
}

pub trait Store {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

// ============================================================================
// File-backed store
// ============================================================================

pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens the store in `dir`. A missing or unreadable file starts empty.
    pub fn open(dir: &Path) -> Self {
        let path = dir.join(STORAGE_FILE);
        let entries = match read_entries(&path) {
            Ok(entries) => entries,
            Err(StoreError::Io(e)) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable storage file");
                BTreeMap::new()
            }
        };
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        // a crash mid-write must not leave a truncated storage file behind
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&self.entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn read_entries(path: &Path) -> Result<BTreeMap<String, String>, StoreError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_owned(), value);
        self.flush()
    }
}

/// `$XDG_DATA_HOME/pomo`, then `$HOME/.local/share/pomo`, then `./pomo`.
pub fn default_data_dir() -> PathBuf {
    if let Ok(path) = env::var("XDG_DATA_HOME") {
        PathBuf::from(path).join(APP_DIR)
    } else if let Ok(path) = env::var("HOME") {
        PathBuf::from(path).join(".local").join("share").join(APP_DIR)
    } else {
        PathBuf::from(".").join(APP_DIR)
    }
}

// ============================================================================
// Typed access
// ============================================================================

fn load_value<T: for<'de> Deserialize<'de>>(store: &dyn Store, key: &str) -> Result<Option<T>, StoreError> {
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

fn save_value<T: Serialize>(store: &mut dyn Store, key: &str, value: &T) {
    let result = serde_json::to_string(value)
        .map_err(StoreError::from)
        .and_then(|raw| store.set(key, raw));
    if let Err(e) = result {
        tracing::warn!(key, error = %e, "failed to persist value");
    }
}

/// Saved settings, or the defaults when absent or unparsable.
pub fn load_settings(store: &dyn Store) -> Settings {
    match load_value::<Settings>(store, SETTINGS_KEY) {
        Ok(Some(settings)) => settings.sanitized(),
        Ok(None) => Settings::default(),
        Err(e) => {
            tracing::warn!(error = %e, "falling back to default settings");
            Settings::default()
        }
    }
}

pub fn save_settings(store: &mut dyn Store, settings: &Settings) {
    save_value(store, SETTINGS_KEY, settings);
}

/// Today's progress. A record from another day counts as zero.
pub fn load_progress(store: &dyn Store, today: NaiveDate) -> DailyProgress {
    match load_value::<DailyProgress>(store, PROGRESS_KEY) {
        Ok(Some(progress)) => progress.for_day(today),
        Ok(None) => DailyProgress::new(today),
        Err(e) => {
            tracing::warn!(error = %e, "falling back to empty daily progress");
            DailyProgress::new(today)
        }
    }
}

pub fn save_progress(store: &mut dyn Store, progress: &DailyProgress) {
    save_value(store, PROGRESS_KEY, progress);
}


#[cfg(test)]
mod tests {
    use super::memory::MemoryStore;
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_missing_settings_fall_back_to_default() {
        let store = MemoryStore::default();

        assert_eq!(load_settings(&store), Settings::default());
    }

    #[test]
    fn test_corrupt_settings_fall_back_to_default() {
        let mut store = MemoryStore::default();
        store.entries.insert(SETTINGS_KEY.into(), "{not json".into());

        assert_eq!(load_settings(&store), Settings::default());
    }

    #[test]
    fn test_settings_round_trip_through_store() {
        let mut store = MemoryStore::default();
        let mut settings = Settings::default();
        settings.durations.focus = 50 * 60;
        settings.long_break_interval = 2;
        save_settings(&mut store, &settings);

        assert_eq!(load_settings(&store), settings);
    }

    #[test]
    fn test_progress_same_day_is_kept() {
        let mut store = MemoryStore::default();
        store
            .entries
            .insert(PROGRESS_KEY.into(), r#"{"date":"Mon Jan 01 2024","count":2}"#.into());

        assert_eq!(load_progress(&store, day(2024, 1, 1)).count, 2);
    }

    #[test]
    fn test_progress_other_day_is_reset() {
        let mut store = MemoryStore::default();
        store
            .entries
            .insert(PROGRESS_KEY.into(), r#"{"date":"Mon Jan 01 2024","count":2}"#.into());

        let progress = load_progress(&store, day(2024, 1, 2));
        assert_eq!(progress.count, 0);
        assert_eq!(progress.date, day(2024, 1, 2));
    }

    #[test]
    fn test_corrupt_progress_is_zero() {
        let mut store = MemoryStore::default();
        store.entries.insert(PROGRESS_KEY.into(), r#"{"date":"yesterday","count":2}"#.into());

        assert_eq!(load_progress(&store, day(2024, 1, 1)).count, 0);
    }

    #[test]
    fn test_failed_write_is_swallowed() {
        let mut store = MemoryStore {
            fail_writes: true,
            ..Default::default()
        };
        save_settings(&mut store, &Settings::default());

        assert!(store.entries.is_empty());
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path());
        store.set(SETTINGS_KEY, "{\"a\":1}".into()).unwrap();

        let reopened = FileStore::open(dir.path());
        assert_eq!(reopened.get(SETTINGS_KEY).unwrap().as_deref(), Some("{\"a\":1}"));
        assert_eq!(reopened.get(PROGRESS_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_store_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let mut store = FileStore::open(&nested);
        store.set(PROGRESS_KEY, "{}".into()).unwrap();

        assert!(store.path().exists());
    }

    #[test]
    fn test_file_store_replaces_file_whole() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path());
        store.set(SETTINGS_KEY, "{}".into()).unwrap();
        store.set(PROGRESS_KEY, "{}".into()).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec![STORAGE_FILE.to_string()]);

        let raw = fs::read_to_string(store.path()).unwrap();
        let entries: BTreeMap<String, String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_leftover_temp_file_does_not_shadow_storage() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path());
        store.set(SETTINGS_KEY, "{\"a\":1}".into()).unwrap();
        fs::write(dir.path().join("storage.json.tmp"), "trunc").unwrap();

        let reopened = FileStore::open(dir.path());
        assert_eq!(reopened.get(SETTINGS_KEY).unwrap().as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn test_file_store_ignores_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(STORAGE_FILE), "garbage").unwrap();

        let store = FileStore::open(dir.path());
        assert_eq!(store.get(SETTINGS_KEY).unwrap(), None);
        assert_eq!(load_settings(&store), Settings::default());
    }
}
