//! Generation history persistence.
//!
//! A capped, most-recent-first list of generation results backed by a
//! single JSON file. Loaded once when the app starts, overwritten on every
//! change (last write wins; there is only one writer). Results are never
//! mutated after being recorded except for the favorite flag.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};
use uuid::Uuid;

/// Retained entries; the oldest is evicted past this.
pub const HISTORY_CAP: usize = 10;

/// One successful generation, as shown in the gallery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub id: String,
    pub media_url: String,
    pub prompt_used: String,
    pub created_at: String,
    #[serde(default)]
    pub favorite: bool,
}

pub struct HistoryStore {
    path: PathBuf,
    entries: Vec<GenerationResult>,
}

impl HistoryStore {
    /// Open the store at `path`, loading existing entries. A missing or
    /// unreadable file starts an empty history rather than failing the app.
    pub fn open(path: PathBuf) -> Self {
        let entries = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Vec<GenerationResult>>(&content) {
                Ok(mut entries) => {
                    entries.truncate(HISTORY_CAP);
                    entries
                }
                Err(e) => {
                    warn!("Failed to parse history file, starting empty: {}", e);
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };

        info!(entries = entries.len(), path = %path.display(), "History loaded");
        Self { path, entries }
    }

    /// Record a successful generation at the front of the list, evicting
    /// the oldest entry past the cap.
    pub fn record(&mut self, media_url: &str, prompt_used: &str) -> Result<GenerationResult, String> {
        let result = GenerationResult {
            id: Uuid::new_v4().to_string(),
            media_url: media_url.to_string(),
            prompt_used: prompt_used.to_string(),
            created_at: Utc::now().to_rfc3339(),
            favorite: false,
        };

        self.entries.insert(0, result.clone());
        self.entries.truncate(HISTORY_CAP);
        self.save()?;

        Ok(result)
    }

    /// Flip the favorite flag; returns the new value.
    pub fn toggle_favorite(&mut self, id: &str) -> Result<bool, String> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| format!("History entry not found: {}", id))?;

        entry.favorite = !entry.favorite;
        let favorite = entry.favorite;
        self.save()?;

        Ok(favorite)
    }

    /// Newest-first view of the retained results.
    pub fn entries(&self) -> &[GenerationResult] {
        &self.entries
    }

    pub fn clear(&mut self) -> Result<(), String> {
        self.entries.clear();
        self.save()
    }

    fn save(&self) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create history directory: {}", e))?;
        }

        let content = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| format!("Failed to serialize history: {}", e))?;
        fs::write(&self.path, content).map_err(|e| format!("Failed to write history: {}", e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in(dir: &tempfile::TempDir) -> HistoryStore {
        HistoryStore::open(dir.path().join("history.json"))
    }

    #[test]
    fn test_record_prepends_newest() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir);

        store.record("data:image/png;base64,a", "first").unwrap();
        store.record("data:image/png;base64,b", "second").unwrap();

        let entries = store.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].prompt_used, "second");
        assert_eq!(entries[1].prompt_used, "first");
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir);

        for i in 0..11 {
            store
                .record("data:image/png;base64,x", &format!("prompt-{}", i))
                .unwrap();
        }

        let entries = store.entries();
        assert_eq!(entries.len(), HISTORY_CAP);
        // Newest first; the very first generation fell off.
        assert_eq!(entries[0].prompt_used, "prompt-10");
        assert_eq!(entries[9].prompt_used, "prompt-1");
        assert!(!entries.iter().any(|e| e.prompt_used == "prompt-0"));
    }

    #[test]
    fn test_persistence_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");

        let recorded = {
            let mut store = HistoryStore::open(path.clone());
            store.record("data:image/png;base64,a", "kept").unwrap()
        };

        let reloaded = HistoryStore::open(path);
        assert_eq!(reloaded.entries().len(), 1);
        assert_eq!(reloaded.entries()[0].id, recorded.id);
        assert_eq!(reloaded.entries()[0].prompt_used, "kept");
    }

    #[test]
    fn test_toggle_favorite() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir);

        let result = store.record("data:image/png;base64,a", "p").unwrap();
        assert!(!result.favorite);

        assert!(store.toggle_favorite(&result.id).unwrap());
        assert!(store.entries()[0].favorite);
        assert!(!store.toggle_favorite(&result.id).unwrap());
    }

    #[test]
    fn test_toggle_favorite_unknown_id() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir);
        assert!(store.toggle_favorite("missing").is_err());
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "not json").unwrap();

        let store = HistoryStore::open(path);
        assert!(store.entries().is_empty());
    }

    #[test]
    fn test_clear() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir);
        store.record("data:image/png;base64,a", "p").unwrap();
        store.clear().unwrap();
        assert!(store.entries().is_empty());

        let reloaded = store_in(&dir);
        assert!(reloaded.entries().is_empty());
    }
}
