/*
 * Durable recovery of an in-progress session.
 *
 * Storage is a capability the core uses, not one it trusts. `SessionStoreOperations`
 * is a plain key-value store (the concrete `FileSessionStore` keeps one JSON file
 * per key in a local directory). `PersistenceManager` layers the session snapshot
 * format on top and applies the fail-open policy: a failed write is logged and
 * the session carries on in memory, an absent or unreadable snapshot loads as
 * `None`. Nothing here returns an error to the caller.
 */
use super::session_state::Phase;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const SESSION_STATE_KEY: &str = "photo-install-state";
const STORE_FILE_EXTENSION: &str = "json";

#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
    Serde(serde_json::Error),
    InvalidKey(String),
}

impl From<io::Error> for StoreError {
    fn from(err: io::Error) -> Self {
        StoreError::Io(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serde(err)
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "Session store I/O error: {e}"),
            StoreError::Serde(e) => write!(f, "Session snapshot serialization error: {e}"),
            StoreError::InvalidKey(key) => write!(f, "Invalid session store key: {key}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            StoreError::Serde(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

/*
 * The persisted subset of `SessionState`. Key names match the format the
 * installation has always written, so snapshots survive an upgrade.
 */
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub phase: Phase,
    #[serde(default, alias = "currentIndex")]
    pub current_work_index: usize,
    #[serde(default)]
    pub decisions: BTreeMap<String, bool>,
    #[serde(default)]
    pub arrangement_order: Vec<String>,
}

pub trait SessionStoreOperations: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

pub struct FileSessionStore {
    directory: PathBuf,
}

impl FileSessionStore {
    pub fn new(directory: &Path) -> Self {
        FileSessionStore {
            directory: directory.to_path_buf(),
        }
    }

    fn path_for_key(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self
            .directory
            .join(format!("{key}.{STORE_FILE_EXTENSION}")))
    }
}

impl SessionStoreOperations for FileSessionStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for_key(key)?;
        if !path.exists() {
            log::trace!("FileSessionStore: No value stored at {path:?}");
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)?;
        log::trace!("FileSessionStore: Read {} bytes from {path:?}", contents.len());
        Ok(Some(contents))
    }

    // Writes go to a sibling temp file first so a crash never leaves half a snapshot.
    fn write(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for_key(key)?;
        if !self.directory.exists() {
            fs::create_dir_all(&self.directory)?;
        }
        let tmp_path = path.with_extension(format!("{STORE_FILE_EXTENSION}.tmp"));
        fs::write(&tmp_path, value)?;
        fs::rename(&tmp_path, &path)?;
        log::trace!("FileSessionStore: Wrote {} bytes to {path:?}", value.len());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for_key(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

pub struct PersistenceManager {
    store: Arc<dyn SessionStoreOperations>,
    key: String,
}

impl PersistenceManager {
    pub fn new(store: Arc<dyn SessionStoreOperations>) -> Self {
        Self::with_key(store, SESSION_STATE_KEY)
    }

    pub fn with_key(store: Arc<dyn SessionStoreOperations>, key: &str) -> Self {
        PersistenceManager {
            store,
            key: key.to_string(),
        }
    }

    /// Best effort. Returns whether the snapshot reached the store, for logging
    /// and tests only; callers never branch on it.
    pub fn save(&self, snapshot: &SessionSnapshot) -> bool {
        let serialized = match serde_json::to_string(snapshot) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("PersistenceManager: Could not serialize snapshot: {e}");
                return false;
            }
        };
        match self.store.write(&self.key, &serialized) {
            Ok(()) => {
                log::trace!(
                    "PersistenceManager: Saved snapshot in phase {:?}",
                    snapshot.phase
                );
                true
            }
            Err(e) => {
                log::warn!("PersistenceManager: Save failed, continuing in memory only: {e}");
                false
            }
        }
    }

    pub fn load(&self) -> Option<SessionSnapshot> {
        let raw = match self.store.read(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("PersistenceManager: Could not read snapshot: {e}");
                return None;
            }
        };
        match serde_json::from_str::<SessionSnapshot>(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                log::warn!("PersistenceManager: Ignoring unparseable snapshot: {e}");
                None
            }
        }
    }

    pub fn clear(&self) {
        if let Err(e) = self.store.remove(&self.key) {
            log::warn!("PersistenceManager: Could not clear snapshot: {e}");
        }
    }
}
