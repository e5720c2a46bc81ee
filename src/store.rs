use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::StoreError;

pub const DEFAULT_BEST_SCORE_FILE: &str = "best_score.txt";

// ============================================================================
// Store Trait
// ============================================================================

pub trait BestScoreStore {
    fn load(&self) -> Result<u32, StoreError>;
    fn save(&mut self, score: u32) -> Result<(), StoreError>;
}

/// Keeps the best score as a plain decimal integer in a text file.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new(DEFAULT_BEST_SCORE_FILE)
    }
}

impl BestScoreStore for FileStore {
    fn load(&self) -> Result<u32, StoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        let trimmed = contents.trim();
        trimmed
            .parse()
            .map_err(|_| StoreError::Corrupt(trimmed.to_string()))
    }

    fn save(&mut self, score: u32) -> Result<(), StoreError> {
        std::fs::write(&self.path, score.to_string())?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    score: Option<u32>,
    pub saves: u32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_score(score: u32) -> Self {
        Self {
            score: Some(score),
            saves: 0,
        }
    }

    pub fn stored(&self) -> Option<u32> {
        self.score
    }
}

impl BestScoreStore for MemoryStore {
    fn load(&self) -> Result<u32, StoreError> {
        Ok(self.score.unwrap_or(0))
    }

    fn save(&mut self, score: u32) -> Result<(), StoreError> {
        self.score = Some(score);
        self.saves += 1;
        Ok(())
    }
}

// ============================================================================
// Best Score
// ============================================================================

/// In-memory best score backed by a store. Never decreases.
pub struct BestScore<S: BestScoreStore> {
    store: S,
    value: u32,
}

impl<S: BestScoreStore> BestScore<S> {
    pub fn load(store: S) -> Self {
        let value = store.load().unwrap_or_else(|e| {
            warn!("could not load best score, starting from 0: {e}");
            0
        });
        Self { store, value }
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Records a finished game's score. Returns true when it is a new best.
    pub fn record(&mut self, score: u32) -> bool {
        if score <= self.value {
            return false;
        }
        self.value = score;
        info!("new best score {score}");
        if let Err(e) = self.store.save(score) {
            warn!("could not save best score {score}: {e}");
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingStore;

    impl BestScoreStore for FailingStore {
        fn load(&self) -> Result<u32, StoreError> {
            Err(StoreError::Corrupt("garbage".to_string()))
        }

        fn save(&mut self, _score: u32) -> Result<(), StoreError> {
            Err(std::io::Error::new(ErrorKind::PermissionDenied, "read-only").into())
        }
    }

    #[test]
    fn load_failure_falls_back_to_zero() {
        let best = BestScore::load(FailingStore);
        assert_eq!(best.value(), 0);
    }

    #[test]
    fn save_failure_still_raises_in_memory_best() {
        let mut best = BestScore::load(FailingStore);
        assert!(best.record(7));
        assert_eq!(best.value(), 7);
        assert!(!best.record(5));
        assert_eq!(best.value(), 7);
    }

    #[test]
    fn memory_store_counts_saves() {
        let mut store = MemoryStore::new();
        store.save(3).unwrap();
        store.save(4).unwrap();
        assert_eq!(store.saves, 2);
        assert_eq!(store.load().unwrap(), 4);
    }
}
