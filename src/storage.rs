use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::crypto::{self, KdfParams};
use crate::models::TrackerData;

const APP_DIR: &str = "cycle-tracker";
const PLAIN_FILE: &str = "tracker.json";
const SEALED_FILE: &str = "tracker.sealed";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("crypto error: {0}")]
    Crypto(#[from] crypto::CryptoError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("data directory not found")]
    NoDataDir,
    #[error("store lock poisoned")]
    Poisoned,
}

/// Where a host keeps the tracker record between sessions.
pub trait ParameterStore {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<TrackerData>, StorageError>;
    fn save(&self, data: &TrackerData) -> Result<(), StorageError>;
}

struct Sealing {
    passphrase: Zeroizing<String>,
    kdf: KdfParams,
}

/// JSON record on disk, optionally sealed with a passphrase.
pub struct FileStore {
    path: PathBuf,
    sealing: Option<Sealing>,
}

impl FileStore {
    pub fn plain(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sealing: None,
        }
    }

    pub fn encrypted(path: impl Into<PathBuf>, passphrase: String, kdf: KdfParams) -> Self {
        Self {
            path: path.into(),
            sealing: Some(Sealing {
                passphrase: Zeroizing::new(passphrase),
                kdf,
            }),
        }
    }

    /// Default location under the platform's local data directory.
    pub fn default_path(encrypted: bool) -> Result<PathBuf, StorageError> {
        let dir = dirs::data_local_dir()
            .ok_or(StorageError::NoDataDir)?
            .join(APP_DIR);
        Ok(dir.join(if encrypted { SEALED_FILE } else { PLAIN_FILE }))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_encrypted(&self) -> bool {
        self.sealing.is_some()
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Delete the record permanently.
    pub fn wipe(&self) -> Result<(), StorageError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            info!(path = %self.path.display(), "tracker data wiped");
        }
        Ok(())
    }
}

impl ParameterStore for FileStore {
    fn load(&self) -> Result<Option<TrackerData>, StorageError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no saved tracker data");
            return Ok(None);
        }
        let bytes = fs::read(&self.path)?;
        let data: TrackerData = match &self.sealing {
            Some(s) => serde_json::from_slice(&crypto::open(&s.passphrase, &bytes)?)?,
            None => serde_json::from_slice(&bytes)?,
        };
        info!(path = %self.path.display(), encrypted = self.is_encrypted(), "tracker data loaded");
        Ok(Some(data))
    }

    fn save(&self, data: &TrackerData) -> Result<(), StorageError> {
        let bytes = match &self.sealing {
            Some(s) => {
                let json = Zeroizing::new(serde_json::to_vec(data)?);
                crypto::seal(&s.passphrase, &json, &s.kdf)?
            }
            None => serde_json::to_vec_pretty(data)?,
        };
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        // write-then-rename so a crash never leaves a half-written record
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)?;
        info!(path = %self.path.display(), encrypted = self.is_encrypted(), "tracker data saved");
        Ok(())
    }
}

/// In-process store for embedding hosts and tests.
#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<Option<TrackerData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(data: TrackerData) -> Self {
        Self {
            data: Mutex::new(Some(data)),
        }
    }
}

impl ParameterStore for MemoryStore {
    fn load(&self) -> Result<Option<TrackerData>, StorageError> {
        Ok(self.data.lock().map_err(|_| StorageError::Poisoned)?.clone())
    }

    fn save(&self, data: &TrackerData) -> Result<(), StorageError> {
        *self.data.lock().map_err(|_| StorageError::Poisoned)? = Some(data.clone());
        Ok(())
    }
}
