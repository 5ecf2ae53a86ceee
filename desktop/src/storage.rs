use crate::config;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use tt_core::error::Result;
use tt_core::{PersistedState, Store, StoreError};

const SAVE_FILE: &str = "practice.json";

fn get_data_dir() -> Option<PathBuf> {
    config::project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
}

/// Keeps the whole practice record in one pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(SAVE_FILE),
        }
    }

    /// Uses `data_dir` when given, otherwise the platform data directory.
    pub fn locate(data_dir: Option<&Path>) -> Result<Self> {
        match data_dir {
            Some(dir) => Ok(Self::in_dir(dir)),
            None => get_data_dir()
                .map(|dir| Self::in_dir(&dir))
                .ok_or(StoreError::NoDataDir),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where an unreadable save file is kept so the next save cannot clobber it.
    fn backup_path(&self) -> PathBuf {
        self.path.with_extension("json.bak")
    }

    fn move_aside(&self) {
        let backup = self.backup_path();
        match fs::rename(&self.path, &backup) {
            Ok(()) => warn!(path = %backup.display(), "kept unreadable practice data"),
            Err(e) => warn!(error = %e, "could not move unreadable practice data aside"),
        }
    }

    fn io_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl Store for JsonFileStore {
    fn load(&self) -> Result<Option<PersistedState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path).map_err(|e| self.io_err(e))?;
        match serde_json::from_str(&content) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                self.move_aside();
                Err(e.into())
            }
        }
    }

    fn save(&self, data: &PersistedState) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| self.io_err(e))?;
        }
        let json = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, json).map_err(|e| self.io_err(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tt_core::persist;

    #[test]
    fn test_missing_file_is_not_an_error() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_creates_dir_and_loads_back() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::in_dir(&dir.path().join("a").join("b"));

        let mut session = tt_core::PracticeSession::new();
        session.update_settings(session.settings().toggle_excluded(5));
        session.generate_problem();
        session.submit_answer(10);

        store.save(&session.snapshot()).unwrap();
        assert_eq!(store.load().unwrap(), Some(session.snapshot()));
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        fs::write(store.path(), "{ not json").unwrap();

        assert!(matches!(store.load(), Err(StoreError::Json(_))));
        assert_eq!(persist::load_or_default(&store), PersistedState::default());
    }

    #[test]
    fn test_corrupt_file_survives_next_save() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        fs::write(store.path(), "{ not json").unwrap();

        let state = persist::load_or_default(&store);
        store.save(&state).unwrap();

        assert_eq!(fs::read_to_string(store.backup_path()).unwrap(), "{ not json");
        assert_eq!(store.load().unwrap(), Some(PersistedState::default()));
    }

    #[test]
    fn test_reads_timestamp_style_ids() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        fs::write(
            store.path(),
            r#"{
                "attempts": [
                    { "id": "1700000000000", "firstNumber": 6, "secondNumber": 7,
                      "userAnswer": 42, "correctAnswer": 42, "timeMs": 2100,
                      "timestamp": 1700000000000, "isCorrect": true },
                    { "id": "1699999990000", "firstNumber": 8, "secondNumber": 9,
                      "userAnswer": 70, "correctAnswer": 72, "timeMs": 4300,
                      "timestamp": 1699999990000, "isCorrect": false }
                ],
                "settings": { "mode": "bucket", "includedBuckets": [],
                              "excludedBuckets": [], "minNumber": 2, "maxNumber": 20 }
            }"#,
        )
        .unwrap();

        let state = persist::load_or_default(&store);
        assert_eq!(state.attempts.len(), 2);
        assert_eq!(state.attempts[0].id, "1700000000000");
        assert!(!store.backup_path().exists());
    }

    #[test]
    fn test_reads_camel_case_record() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        fs::write(
            store.path(),
            r#"{
                "attempts": [{
                    "id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
                    "firstNumber": 3, "secondNumber": 4,
                    "userAnswer": 12, "correctAnswer": 12,
                    "timeMs": 1800, "timestamp": 1700000000000,
                    "isCorrect": true
                }],
                "settings": { "mode": "bucket", "includedBuckets": [3, 4],
                              "excludedBuckets": [], "minNumber": 2, "maxNumber": 20 }
            }"#,
        )
        .unwrap();

        let state = store.load().unwrap().unwrap();
        assert_eq!(state.attempts.len(), 1);
        assert_eq!(state.attempts[0].time_ms, 1800);
        assert!(state.settings.is_included(4));
    }

    #[test]
    fn test_locate_with_override() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::locate(Some(dir.path())).unwrap();
        assert_eq!(store.path(), dir.path().join(SAVE_FILE));
    }
}
