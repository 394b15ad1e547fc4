//! JSON persistence of settings and history for the command-line host.
//!
//! The scheduler never reads from here. The host loads settings before
//! creating a scheduler and appends the session's history when it exits.
//!
//! Layout of the data directory (`~/.pomodoro` by default):
//!
//! ```text
//! ~/.pomodoro/
//! ├── settings.json   # Settings, camelCase fields
//! ├── history.json    # Array of completed session records
//! └── tasks.json      # Array of tasks
//! ```

mod error;

pub use error::{Result, StoreError};

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::scheduler::HistoryLog;
use crate::tasks::TaskList;
use crate::types::{CompletedSessionRecord, Settings};

// ============================================================================
// Constants
// ============================================================================

/// Data directory name under the home directory
pub const DATA_DIR_NAME: &str = ".pomodoro";

/// Settings file name
pub const SETTINGS_FILE: &str = "settings.json";

/// History file name
pub const HISTORY_FILE: &str = "history.json";

/// Task list file name
pub const TASKS_FILE: &str = "tasks.json";

// ============================================================================
// Store
// ============================================================================

/// File-backed store rooted at a data directory.
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    /// Opens a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::DirectoryCreation {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// Returns the default data directory, `~/.pomodoro`.
    pub fn default_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(StoreError::HomeDirectoryNotFound)?;
        Ok(home.join(DATA_DIR_NAME))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn settings_path(&self) -> PathBuf {
        self.dir.join(SETTINGS_FILE)
    }

    pub fn history_path(&self) -> PathBuf {
        self.dir.join(HISTORY_FILE)
    }

    pub fn tasks_path(&self) -> PathBuf {
        self.dir.join(TASKS_FILE)
    }

    /// Loads the stored settings, or the defaults if none were saved.
    pub fn load_settings(&self) -> Result<Settings> {
        let settings: Settings = self.read_json(&self.settings_path())?.unwrap_or_default();
        settings.validate().map_err(StoreError::InvalidSettings)?;
        Ok(settings)
    }

    /// Saves the settings after validating them.
    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        settings.validate().map_err(StoreError::InvalidSettings)?;
        self.write_json(&self.settings_path(), settings)
    }

    /// Loads the stored history, or an empty log if none was saved.
    pub fn load_history(&self) -> Result<HistoryLog> {
        Ok(self.read_json(&self.history_path())?.unwrap_or_default())
    }

    /// Appends records to the stored history, keeping their order.
    pub fn append_history(&self, records: &[CompletedSessionRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let mut history = self.load_history()?;
        for record in records {
            history.append(record.clone());
        }
        self.write_json(&self.history_path(), &history)?;

        debug!(appended = records.len(), total = history.len(), "History saved");
        Ok(())
    }

    /// Loads the stored tasks, or an empty list if none were saved.
    pub fn load_tasks(&self) -> Result<TaskList> {
        Ok(self.read_json(&self.tasks_path())?.unwrap_or_default())
    }

    /// Replaces the stored tasks.
    pub fn save_tasks(&self, tasks: &TaskList) -> Result<()> {
        self.write_json(&self.tasks_path(), tasks)
    }

    fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| StoreError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(StoreError::Serialize)?;
        fs::write(path, json).map_err(|source| StoreError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use crate::tasks::TaskCategory;
    use crate::types::SessionKind;

    fn temp_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("data")).unwrap();
        (dir, store)
    }

    fn record(kind: SessionKind, minute: u32) -> CompletedSessionRecord {
        CompletedSessionRecord {
            kind,
            completed_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, minute, 0).unwrap(),
            duration_seconds: 60,
        }
    }

    #[test]
    fn test_open_creates_directory() {
        let (_dir, store) = temp_store();
        assert!(store.dir().is_dir());
    }

    #[test]
    fn test_missing_files_yield_defaults() {
        let (_dir, store) = temp_store();
        assert_eq!(store.load_settings().unwrap(), Settings::default());
        assert!(store.load_history().unwrap().is_empty());
    }

    #[test]
    fn test_settings_persist() {
        let (_dir, store) = temp_store();
        let settings = Settings::default()
            .with_work_minutes(50)
            .with_auto_start(true, false);

        store.save_settings(&settings).unwrap();

        assert_eq!(store.load_settings().unwrap(), settings);
        let raw = fs::read_to_string(store.settings_path()).unwrap();
        assert!(raw.contains("\"workMinutes\": 50"));
    }

    #[test]
    fn test_save_rejects_invalid_settings() {
        let (_dir, store) = temp_store();
        let result = store.save_settings(&Settings::default().with_work_minutes(0));

        assert!(matches!(result, Err(StoreError::InvalidSettings(_))));
        assert!(!store.settings_path().exists());
    }

    #[test]
    fn test_load_rejects_invalid_stored_settings() {
        let (_dir, store) = temp_store();
        fs::write(store.settings_path(), r#"{"shortBreakMinutes": 90}"#).unwrap();

        assert!(matches!(
            store.load_settings(),
            Err(StoreError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_load_reports_malformed_json() {
        let (_dir, store) = temp_store();
        fs::write(store.history_path(), "not json").unwrap();

        let err = store.load_history().unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
        assert!(err.to_string().contains(HISTORY_FILE));
    }

    #[test]
    fn test_append_history_keeps_order() {
        let (_dir, store) = temp_store();
        store
            .append_history(&[record(SessionKind::Work, 0), record(SessionKind::ShortBreak, 1)])
            .unwrap();
        store.append_history(&[record(SessionKind::Work, 2)]).unwrap();

        let history = store.load_history().unwrap();
        let minutes: Vec<_> = history
            .records()
            .iter()
            .map(|r| r.completed_at.format("%M").to_string())
            .collect();
        assert_eq!(minutes, vec!["00", "01", "02"]);
        assert_eq!(history.work_sessions(), 2);
    }

    #[test]
    fn test_tasks_persist() {
        let (_dir, store) = temp_store();
        assert!(store.load_tasks().unwrap().is_empty());

        let mut tasks = TaskList::new();
        tasks
            .add("Write report", TaskCategory::Work, 2, Utc::now())
            .unwrap();
        tasks.record_pomodoro(1).unwrap();
        store.save_tasks(&tasks).unwrap();

        assert_eq!(store.load_tasks().unwrap(), tasks);
        let raw = fs::read_to_string(store.tasks_path()).unwrap();
        assert!(raw.contains("\"pomodoroCount\": 1"));
    }

    #[test]
    fn test_append_nothing_does_not_create_file() {
        let (_dir, store) = temp_store();
        store.append_history(&[]).unwrap();
        assert!(!store.history_path().exists());
    }
}
