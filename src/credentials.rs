//! Persistent storage of the bearer credential
//!
//! A lost credential only means the user logs in again, so storage failures
//! are logged and reported as "no credential" instead of surfacing as errors.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Opaque bearer token
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token, for the Authorization header only
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl From<String> for Credential {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Store holding at most one credential
pub trait CredentialStore: Send + Sync {
    /// Replace any stored credential
    fn save(&self, token: &Credential);

    fn get(&self) -> Option<Credential>;

    /// Remove the credential; removing nothing is fine
    fn delete(&self);
}

/// Credential kept in a single file
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, token: &Credential) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        // Write beside the target and rename, so readers never see a partial token
        let tmp = self.path.with_extension("tmp");
        let result = Self::write_tmp(&tmp, token).and_then(|()| fs::rename(&tmp, &self.path));
        if result.is_err() {
            // The leftover would hold the token in clear
            if let Err(e) = fs::remove_file(&tmp) {
                if e.kind() != io::ErrorKind::NotFound {
                    tracing::warn!("Failed to remove {}: {}", tmp.display(), e);
                }
            }
        }
        result
    }

    fn write_tmp(tmp: &Path, token: &Credential) -> io::Result<()> {
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(tmp)?;
        file.write_all(token.expose().as_bytes())?;
        file.sync_all()
    }
}

impl CredentialStore for FileCredentialStore {
    fn save(&self, token: &Credential) {
        if let Err(e) = self.write(token) {
            tracing::warn!("Failed to persist credential to {}: {}", self.path.display(), e);
        }
    }

    fn get(&self) -> Option<Credential> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                (!token.is_empty()).then(|| Credential::new(token))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!("Failed to read credential from {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn delete(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to delete credential at {}: {}", self.path.display(), e),
        }
    }
}

/// In-process store, used by tests and embedders without a filesystem
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(Credential::new(token))),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn save(&self, token: &Credential) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
    }

    fn get(&self) -> Option<Credential> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn delete(&self) {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).take();
    }
}
