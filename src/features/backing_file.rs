use std::collections::HashMap;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use once_cell::sync::Lazy;
use thiserror::Error;
use tokio::fs;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::ledger::Ledger;

/// One gate per backing file path, shared by every store in the process
static GATES: Lazy<Mutex<HashMap<PathBuf, Arc<AsyncMutex<()>>>>> = Lazy::new(Default::default);

#[derive(Error, Debug)]
pub enum FileError {
    #[error("cannot read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("{} is not a valid expense file: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("cannot serialize expenses for {}: {source}", .path.display())]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("cannot write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

type FileResult<T> = Result<T, FileError>;

/// The JSON file a ledger is read from and written back to as a whole
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackingFile {
    path: PathBuf,
}

impl BackingFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Waits until no other operation holds this file.
    ///
    /// The returned guard must be kept for the whole read-modify-write.
    pub async fn lock(&self) -> OwnedMutexGuard<()> {
        let gate = {
            let mut gates = GATES.lock().unwrap_or_else(PoisonError::into_inner);
            // Gates nobody holds or waits on are only referenced by the map
            gates.retain(|_, gate| Arc::strong_count(gate) > 1);
            gates.entry(self.gate_key()).or_default().clone()
        };
        gate.lock_owned().await
    }

    pub async fn load(&self) -> FileResult<Ledger> {
        debug!("reading expenses from {}", self.path.display());
        let json = fs::read_to_string(&self.path)
            .await
            .map_err(|source| FileError::Read {
                path: self.path.clone(),
                source,
            })?;

        serde_json::from_str(&json).map_err(|source| FileError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Replaces the file content with `ledger`.
    ///
    /// The JSON goes to a sibling `<file name>.tmp` file first and is then renamed over
    /// the target, so a failed write leaves the previous content in place.
    pub async fn save(&self, ledger: &Ledger) -> FileResult<()> {
        let json = serde_json::to_string(ledger).map_err(|source| FileError::Serialize {
            path: self.path.clone(),
            source,
        })?;

        let temp_path = self.temp_path();
        debug!(
            "writing {} bytes of expenses to {}",
            json.len(),
            self.path.display()
        );

        let written = match fs::write(&temp_path, json).await {
            Ok(()) => fs::rename(&temp_path, &self.path).await,
            Err(e) => Err(e),
        };

        if let Err(source) = written {
            if let Err(e) = fs::remove_file(&temp_path).await {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!("leftover temporary file {}: {e}", temp_path.display());
                }
            }
            return Err(FileError::Write {
                path: self.path.clone(),
                source,
            });
        }

        Ok(())
    }

    // Keeps the whole file name, so `x.json` and `x.bak` never share one
    fn temp_path(&self) -> PathBuf {
        let mut temp_path = OsString::from(self.path.as_os_str());
        temp_path.push(".tmp");
        PathBuf::from(temp_path)
    }

    // Relative and absolute spellings of one file share a gate
    fn gate_key(&self) -> PathBuf {
        if self.path.is_absolute() {
            return self.path.clone();
        }
        std::env::current_dir()
            .map(|dir| dir.join(&self.path))
            .unwrap_or_else(|_| self.path.clone())
    }
}
