//! Storage module - key-value persistence of the workout document
//!
//! The whole `AppState` lives under one key as a single JSON document and
//! is replaced whole on every save.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::model::AppState;

/// Key the document is stored under
pub const STATE_KEY: &str = "gympro_state";

/// Minimal key-value store
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// One `<key>.json` file per key inside a directory
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open or create the storage directory
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create data directory: {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Some(content))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        fs::write(&tmp, value).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        Ok(())
    }
}

/// In-process storage, used by tests and dry runs
#[derive(Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(key: &str, value: &str) -> Self {
        let storage = Self::new();
        storage.items.borrow_mut().insert(key.to_string(), value.to_string());
        storage
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.items.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Load the document, falling back to a fresh state when nothing is stored.
///
/// Missing fields take their defaults; a document that is not JSON at all
/// is an error so it never gets overwritten by a blank state.
pub fn load_state(storage: &impl Storage, key: &str) -> Result<AppState> {
    match storage.get(key)? {
        Some(raw) => {
            let mut state: AppState = serde_json::from_str(&raw)
                .with_context(|| format!("Stored document `{}` is not a valid workout state", key))?;
            state.normalize();
            info!(
                "Loaded state: {} workouts, {} photos",
                state.workouts.len(),
                state.evolution_gallery.len()
            );
            Ok(state)
        }
        None => {
            info!("No stored state under `{}`, starting fresh", key);
            Ok(AppState::default())
        }
    }
}

/// Serialize the document and replace the stored copy
pub fn save_state(storage: &impl Storage, key: &str, state: &AppState) -> Result<()> {
    let json = serde_json::to_string(state)?;
    storage.set(key, &json)?;
    debug!("Saved state ({} bytes)", json.len());
    Ok(())
}
