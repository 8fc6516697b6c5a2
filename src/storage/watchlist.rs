//! Watch-list persistence

use crate::error::{PopcornError, Result};
use crate::storage::summary::WatchSummary;
use crate::types::WatchedEntry;
use crate::utils::paths::ensure_dir;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Watch-list manager.
///
/// The whole list lives in one JSON file, rewritten after every mutation.
/// Every mutating call awaits its write, so a following read always sees it.
pub struct WatchlistStore {
    path: PathBuf,
    entries: Vec<WatchedEntry>,
}

impl WatchlistStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            entries: Vec::new(),
        }
    }

    /// Load the list from file. A missing or unreadable file leaves it empty.
    /// Repeated ids keep their first entry.
    pub async fn hydrate(&mut self) {
        self.entries = match self.read().await {
            Ok(entries) => dedup_by_id(entries),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "starting with an empty watch-list");
                Vec::new()
            }
        };
        debug!(count = self.entries.len(), "watch-list hydrated");
    }

    async fn read(&self) -> Result<Vec<WatchedEntry>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PopcornError::PersistenceCorrupt(e.to_string())),
        };

        serde_json::from_str(&content).map_err(|e| PopcornError::PersistenceCorrupt(e.to_string()))
    }

    /// Save the list to file
    pub async fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(&parent.to_string_lossy()).await?;
        }
        let content = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, content).await?;
        Ok(())
    }

    /// Append an entry. Returns false, without touching the list, if the
    /// id is already present. A failed write leaves the list as it was.
    pub async fn add(&mut self, entry: WatchedEntry) -> Result<bool> {
        if self.contains(&entry.id) {
            debug!(id = %entry.id, "already on the watch-list");
            return Ok(false);
        }

        self.entries.push(entry);
        if let Err(e) = self.persist().await {
            self.entries.pop();
            return Err(e);
        }
        Ok(true)
    }

    /// Remove an entry by id. Unknown ids are a no-op. A failed write
    /// leaves the list as it was.
    pub async fn remove(&mut self, id: &str) -> Result<()> {
        let previous = self.entries.clone();
        self.entries.retain(|e| e.id != id);
        if let Err(e) = self.persist().await {
            self.entries = previous;
            return Err(e);
        }
        Ok(())
    }

    /// All entries in insertion order
    pub fn all(&self) -> &[WatchedEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&WatchedEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Aggregates over the current list
    pub fn summary(&self) -> WatchSummary {
        WatchSummary::from_entries(&self.entries)
    }
}

fn dedup_by_id(entries: Vec<WatchedEntry>) -> Vec<WatchedEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|e| {
            let first = seen.insert(e.id.clone());
            if !first {
                warn!(id = %e.id, "dropping repeated watch-list entry");
            }
            first
        })
        .collect()
}
