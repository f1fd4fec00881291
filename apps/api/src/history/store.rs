//! Local recommendation history, a bounded, newest-first list persisted as one JSON file.
//!
//! The list holds at most `MAX_ENTRIES`; inserting beyond that evicts the oldest.
//! The file is rewritten after every mutation and once more on shutdown.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::analysis::products::ProductRecommendations;
use crate::analysis::skin::SkinAnalysisResult;

/// Storage key; the history file is `<key>.json` inside the history directory.
pub const HISTORY_KEY: &str = "aura_recommendation_history";
pub const MAX_ENTRIES: usize = 20;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub analysis_result: SkinAnalysisResult,
    pub recommendations: ProductRecommendations,
}

impl HistoryEntry {
    pub fn new(
        analysis_result: SkinAnalysisResult,
        recommendations: ProductRecommendations,
    ) -> Self {
        let timestamp = Utc::now();
        Self {
            id: new_entry_id(timestamp),
            timestamp,
            analysis_result,
            recommendations,
        }
    }
}

/// `rec_<epoch millis>_<9 lowercase alphanumerics>`
fn new_entry_id(at: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("rec_{}_{}", at.timestamp_millis(), &suffix[..9])
}

/// In-memory list semantics, independent of where the list is persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecommendationHistory {
    entries: Vec<HistoryEntry>,
}

impl RecommendationHistory {
    /// Keeps the first `MAX_ENTRIES` of whatever was loaded.
    pub fn from_entries(mut entries: Vec<HistoryEntry>) -> Self {
        entries.truncate(MAX_ENTRIES);
        Self { entries }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts at the front; returns the evicted entry when the cap was exceeded.
    pub fn insert(&mut self, entry: HistoryEntry) -> Option<HistoryEntry> {
        self.entries.insert(0, entry);
        if self.entries.len() > MAX_ENTRIES {
            self.entries.pop()
        } else {
            None
        }
    }

    /// Removes the entry with `id`. A missing id leaves the list untouched.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// File-backed history handle. Opened once at startup and shared through `AppState`.
pub struct HistoryStore {
    path: PathBuf,
    list: RwLock<RecommendationHistory>,
}

impl HistoryStore {
    /// Opens (creating if needed) the history directory and loads the list.
    /// A corrupt or unreadable file is logged and treated as empty.
    pub async fn open(dir: &Path) -> Result<Self, HistoryError> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| HistoryError::Io {
                path: dir.to_path_buf(),
                source,
            })?;

        let path = dir.join(format!("{HISTORY_KEY}.json"));
        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Ignoring unreadable recommendation history at {path:?}: {e}");
                    Vec::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                warn!("Could not read recommendation history at {path:?}: {e}");
                Vec::new()
            }
        };

        let list = RecommendationHistory::from_entries(entries);
        info!(
            "Recommendation history opened at {path:?} ({} entries)",
            list.len()
        );

        Ok(Self {
            path,
            list: RwLock::new(list),
        })
    }

    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Newest first.
    pub async fn list(&self) -> Vec<HistoryEntry> {
        self.list.read().await.entries().to_vec()
    }

    /// Mutations are staged on a copy and only become visible once the file
    /// write succeeds.
    pub async fn save(
        &self,
        analysis_result: SkinAnalysisResult,
        recommendations: ProductRecommendations,
    ) -> Result<HistoryEntry, HistoryError> {
        let entry = HistoryEntry::new(analysis_result, recommendations);
        let mut list = self.list.write().await;
        let mut next = list.clone();
        let evicted = next.insert(entry.clone());
        self.write_file(&next).await?;
        *list = next;
        if let Some(evicted) = evicted {
            debug!("History full, evicted {}", evicted.id);
        }
        Ok(entry)
    }

    /// Returns whether an entry was removed. The file is only rewritten when one was.
    pub async fn delete(&self, id: &str) -> Result<bool, HistoryError> {
        let mut list = self.list.write().await;
        let mut next = list.clone();
        if !next.delete(id) {
            return Ok(false);
        }
        self.write_file(&next).await?;
        *list = next;
        Ok(true)
    }

    /// Removes the backing file, then empties the list.
    pub async fn clear(&self) -> Result<(), HistoryError> {
        let mut list = self.list.write().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(source) => {
                return Err(HistoryError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        }
        list.clear();
        Ok(())
    }

    /// Writes the current list to disk. Called on shutdown.
    pub async fn flush(&self) -> Result<(), HistoryError> {
        let list = self.list.read().await;
        if list.is_empty() {
            return Ok(());
        }
        self.write_file(&list).await
    }

    /// Write-then-rename so a crash never leaves a truncated file behind.
    async fn write_file(&self, list: &RecommendationHistory) -> Result<(), HistoryError> {
        let json = serde_json::to_vec(list.entries())?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|source| HistoryError::Io {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|source| HistoryError::Io {
                path: self.path.clone(),
                source,
            })
    }
}
