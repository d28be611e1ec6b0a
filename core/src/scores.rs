use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::*;

/// Best completion time in seconds per score key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BestScores(BTreeMap<String, u32>);

impl BestScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored best, a zero entry counts as no record.
    pub fn best(&self, key: &str) -> Option<u32> {
        self.0.get(key).copied().filter(|&secs| secs > 0)
    }

    /// Record a finishing time, returns whether it became the new best. A zero time counts as one second.
    pub fn record(&mut self, key: &str, secs: u32) -> bool {
        let secs = secs.max(1);
        match self.best(key) {
            Some(best) if best <= secs => false,
            _ => {
                self.0.insert(key.to_owned(), secs);
                true
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Entries sorted by key.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(key, &secs)| (key.as_str(), secs))
    }
}

impl FromIterator<(String, u32)> for BestScores {
    fn from_iter<T: IntoIterator<Item = (String, u32)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Durable home of the best scores.
///
/// Loading never fails, missing or unreadable data yields an empty table. Saving reports its failure so the caller
/// can log it, but the game never depends on it succeeding.
pub trait ScoreStore {
    fn load(&self) -> BestScores;
    fn save(&mut self, scores: &BestScores) -> core::result::Result<(), StoreError>;
}

/// Scores kept as a pretty-printed JSON object on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub const FILE_NAME: &'static str = "scores.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn try_load(&self) -> core::result::Result<BestScores, StoreError> {
        let data = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

impl ScoreStore for JsonFileStore {
    fn load(&self) -> BestScores {
        match self.try_load() {
            Ok(scores) => {
                log::debug!("Loaded {} best scores from {:?}", scores.len(), self.path);
                scores
            }
            Err(StoreError::Io(err)) if err.kind() == ErrorKind::NotFound => {
                log::debug!("No score file at {:?}", self.path);
                BestScores::new()
            }
            Err(err) => {
                log::warn!("Ignoring score file {:?}: {}", self.path, err);
                BestScores::new()
            }
        }
    }

    fn save(&mut self, scores: &BestScores) -> core::result::Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(scores)?;
        fs::write(&self.path, data)?;
        log::debug!("Saved {} best scores to {:?}", scores.len(), self.path);
        Ok(())
    }
}

/// Scores that live only as long as the process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    pub scores: BestScores,
    pub saves: usize,
}

impl ScoreStore for MemoryStore {
    fn load(&self) -> BestScores {
        self.scores.clone()
    }

    fn save(&mut self, scores: &BestScores) -> core::result::Result<(), StoreError> {
        self.scores = scores.clone();
        self.saves += 1;
        Ok(())
    }
}
