//! Hidden-message set and its persistence port.
//!
//! The hidden set is a pure display filter over `"{item_type}-{item_id}"`
//! keys; it never affects the underlying data. Persistence goes through
//! an injected port instead of a module-level singleton so the reconciler
//! stays pure and tests need no global storage stub.
//!
//! Writes are append/remove-only: every mutation reloads the persisted
//! set, applies the single delta, and saves, so concurrent panel
//! instances never clobber each other's keys wholesale.

use crate::error::PanelError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Host storage key under which the hidden set is persisted.
pub const HIDDEN_STORAGE_KEY: &str = "github-messages-hidden";

/// Current on-disk schema version.
const SCHEMA_VERSION: u32 = 1;

/// Persistence port for the hidden-message set.
pub trait HiddenStorePort: Send + Sync {
    fn load(&self) -> Result<BTreeSet<String>, PanelError>;
    fn save(&self, hidden: &BTreeSet<String>) -> Result<(), PanelError>;
}

/// In-memory port for tests and ephemeral hosts.
#[derive(Default)]
pub struct MemoryHiddenStore {
    inner: Mutex<BTreeSet<String>>,
}

impl MemoryHiddenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HiddenStorePort for MemoryHiddenStore {
    fn load(&self) -> Result<BTreeSet<String>, PanelError> {
        Ok(self.inner.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, hidden: &BTreeSet<String>) -> Result<(), PanelError> {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner()) = hidden.clone();
        Ok(())
    }
}

/// Versioned envelope written to storage. The original layout was a bare
/// JSON array with no version field; loading still accepts that shape.
#[derive(Debug, Serialize, Deserialize)]
struct HiddenFile {
    version: u32,
    hidden: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredHidden {
    Versioned(HiddenFile),
    Legacy(Vec<String>),
}

/// File-backed port storing the hidden set as JSON.
pub struct JsonFileHiddenStore {
    path: PathBuf,
}

impl JsonFileHiddenStore {
    /// Create a store persisting under `dir/github-messages-hidden.json`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let mut path = dir.into();
        path.push(format!("{}.json", HIDDEN_STORAGE_KEY));
        Self { path }
    }

    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HiddenStorePort for JsonFileHiddenStore {
    fn load(&self) -> Result<BTreeSet<String>, PanelError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(BTreeSet::new());
            }
            Err(err) => return Err(err.into()),
        };

        let stored: StoredHidden = serde_json::from_str(&raw)
            .map_err(|err| PanelError::storage(format!("malformed hidden set: {}", err)))?;
        let keys = match stored {
            StoredHidden::Versioned(file) => file.hidden,
            StoredHidden::Legacy(keys) => keys,
        };
        Ok(keys.into_iter().collect())
    }

    fn save(&self, hidden: &BTreeSet<String>) -> Result<(), PanelError> {
        let file = HiddenFile {
            version: SCHEMA_VERSION,
            hidden: hidden.iter().cloned().collect(),
        };
        let raw = serde_json::to_string(&file)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

/// The panel-held hidden set, kept in sync with its port.
pub struct HiddenMessages {
    port: Arc<dyn HiddenStorePort>,
    cached: BTreeSet<String>,
}

impl HiddenMessages {
    /// Load the persisted set through the port.
    pub fn load(port: Arc<dyn HiddenStorePort>) -> Result<Self, PanelError> {
        let cached = port.load()?;
        Ok(Self { port, cached })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.cached.contains(key)
    }

    /// The current set, for feeding the reconciler.
    pub fn keys(&self) -> &BTreeSet<String> {
        &self.cached
    }

    /// Hide one key. Reloads, applies the delta, saves.
    pub fn add(&mut self, key: impl Into<String>) -> Result<(), PanelError> {
        let key = key.into();
        let mut persisted = self.port.load()?;
        persisted.insert(key);
        self.port.save(&persisted)?;
        self.cached = persisted;
        Ok(())
    }

    /// Unhide one key. Reloads, applies the delta, saves.
    pub fn remove(&mut self, key: &str) -> Result<(), PanelError> {
        let mut persisted = self.port.load()?;
        persisted.remove(key);
        self.port.save(&persisted)?;
        self.cached = persisted;
        Ok(())
    }
}
