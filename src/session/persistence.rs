//! Persistence for the tracked session record
//!
//! The store only needs `load/save/clear` over a single record, so the
//! capability is a small trait. `FileSessionStore` keeps the record as JSON on
//! disk; `MemorySessionStore` backs tests.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
#[cfg(test)]
use std::sync::{Arc, Mutex};

/// Locally remembered session identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl StoredSession {
    /// Fresh record for a newly minted id
    pub fn new(session_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            created_at: now,
            last_activity: now,
        }
    }
}

/// Key/value style capability holding at most one session record
pub trait SessionPersistence: Send + Sync {
    /// Read the record. Unreadable or corrupt records are reported as `None`.
    fn load(&self) -> Option<StoredSession>;

    fn save(&self, record: &StoredSession) -> Result<()>;

    fn clear(&self) -> Result<()>;
}

// ─────────────────────────────────────────────────────────────────────────────
// File-backed
// ─────────────────────────────────────────────────────────────────────────────

/// JSON file holding the session record
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionPersistence for FileSessionStore {
    fn load(&self) -> Option<StoredSession> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("Cannot read session file {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::error!("Failed to parse stored session: {}", e);
                if let Err(e) = self.clear() {
                    tracing::warn!("Could not remove corrupt session file: {:#}", e);
                }
                None
            }
        }
    }

    fn save(&self, record: &StoredSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(record)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", self.path.display())),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory
// ─────────────────────────────────────────────────────────────────────────────

/// Process-local record, shared between clones
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    record: Arc<Mutex<Option<StoredSession>>>,
}

#[cfg(test)]
impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: StoredSession) -> Self {
        Self {
            record: Arc::new(Mutex::new(Some(record))),
        }
    }
}

#[cfg(test)]
impl SessionPersistence for MemorySessionStore {
    fn load(&self) -> Option<StoredSession> {
        self.record.lock().ok()?.clone()
    }

    fn save(&self, record: &StoredSession) -> Result<()> {
        let mut guard = self
            .record
            .lock()
            .map_err(|_| anyhow::anyhow!("session record lock poisoned"))?;
        *guard = Some(record.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut guard = self
            .record
            .lock()
            .map_err(|_| anyhow::anyhow!("session record lock poisoned"))?;
        *guard = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_uses_camel_case_keys() {
        let record = StoredSession::new("abc");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["sessionId"], "abc");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("lastActivity").is_some());
    }

    #[test]
    fn test_file_store_save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested").join("session.json"));

        assert!(store.load().is_none());

        let record = StoredSession::new("abc");
        store.save(&record).unwrap();
        assert_eq!(store.load(), Some(record));

        store.clear().unwrap();
        assert!(store.load().is_none());
        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_discards_corrupt_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = FileSessionStore::new(&path);
        assert!(store.load().is_none());
        assert!(!path.exists(), "corrupt record should be removed");
    }

    #[test]
    fn test_memory_store_shared_between_clones() {
        let store = MemorySessionStore::new();
        let other = store.clone();
        store.save(&StoredSession::new("abc")).unwrap();
        assert_eq!(other.load().unwrap().session_id, "abc");
    }
}
