use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::HighScoreError;

/// Persistence port for the session high score.
///
/// The backing format belongs to the adapter; the engine only reads and
/// writes a single best score and treats failures as non-fatal.
pub trait HighScoreStore {
    /// # Errors
    ///
    /// Returns `HighScoreError` when the backing storage is unavailable.
    fn load(&self) -> Result<u32, HighScoreError>;

    /// # Errors
    ///
    /// Returns `HighScoreError` when the backing storage is unavailable.
    fn save(&self, score: u32) -> Result<(), HighScoreError>;
}

//
// ─── IN-MEMORY ADAPTER ─────────────────────────────────────────────────────────
//

/// Volatile store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct InMemoryHighScore {
    best: Mutex<u32>,
}

impl InMemoryHighScore {
    #[must_use]
    pub fn new(initial: u32) -> Self {
        Self {
            best: Mutex::new(initial),
        }
    }
}

impl HighScoreStore for InMemoryHighScore {
    fn load(&self) -> Result<u32, HighScoreError> {
        Ok(*self.best.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn save(&self, score: u32) -> Result<(), HighScoreError> {
        *self.best.lock().unwrap_or_else(PoisonError::into_inner) = score;
        Ok(())
    }
}

//
// ─── JSON FILE ADAPTER ─────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize, Deserialize)]
struct HighScoreRecord {
    best: u32,
    saved_at: DateTime<Utc>,
}

/// Stores the best score as a small JSON document on disk.
///
/// A missing file reads as zero, so first runs need no setup.
#[derive(Debug, Clone)]
pub struct JsonFileHighScore {
    path: PathBuf,
}

impl JsonFileHighScore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HighScoreStore for JsonFileHighScore {
    fn load(&self) -> Result<u32, HighScoreError> {
        if !self.path.exists() {
            return Ok(0);
        }
        let raw = fs::read_to_string(&self.path)?;
        let record: HighScoreRecord = serde_json::from_str(&raw)?;
        Ok(record.best)
    }

    fn save(&self, score: u32) -> Result<(), HighScoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let record = HighScoreRecord {
            best: score,
            saved_at: Utc::now(),
        };
        fs::write(&self.path, serde_json::to_string_pretty(&record)?)?;
        Ok(())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> JsonFileHighScore {
        let path = std::env::temp_dir().join(format!(
            "geoquiz-{name}-{}.json",
            std::process::id()
        ));
        let _ = fs::remove_file(&path);
        JsonFileHighScore::new(path)
    }

    #[test]
    fn in_memory_store_round_trips() {
        let store = InMemoryHighScore::default();
        assert_eq!(store.load().unwrap(), 0);
        store.save(85).unwrap();
        assert_eq!(store.load().unwrap(), 85);
    }

    #[test]
    fn missing_file_reads_as_zero() {
        let store = temp_store("missing");
        assert_eq!(store.load().unwrap(), 0);
    }

    #[test]
    fn file_store_round_trips() {
        let store = temp_store("roundtrip");
        store.save(145).unwrap();
        assert_eq!(store.load().unwrap(), 145);
        let _ = fs::remove_file(store.path());
    }

    #[test]
    fn corrupt_file_surfaces_a_format_error() {
        let store = temp_store("corrupt");
        fs::write(store.path(), "not json").unwrap();
        let err = store.load().unwrap_err();
        assert!(matches!(err, HighScoreError::Format(_)));
        let _ = fs::remove_file(store.path());
    }
}
