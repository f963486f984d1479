//! Persistence for the auth token.
//!
//! DESIGN
//! ======
//! The session store is the only writer; everything else learns the token from
//! the store. Implementations hold a single string slot.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::sync::Mutex;

/// Key of the token slot in browser storage.
pub const TOKEN_STORAGE_KEY: &str = "token";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("token storage unavailable")]
    Unavailable,
    #[error("token storage write failed: {0}")]
    Write(String),
}

/// A single persisted slot for the auth token.
pub trait TokenStorage {
    /// Persisted token, if any. Unreadable storage counts as empty.
    fn load(&self) -> Option<String>;

    /// # Errors
    ///
    /// Returns a [`StorageError`] if the token could not be persisted.
    fn save(&self, token: &str) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns a [`StorageError`] if the slot could not be cleared.
    fn clear(&self) -> Result<(), StorageError>;
}

/// Process-local storage; the default for tests and embedded use.
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStorage {
    #[must_use]
    pub fn with_token(token: &str) -> Self {
        Self { slot: Mutex::new(Some(token.to_owned())) }
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        let mut slot = self.slot.lock().map_err(|_| StorageError::Unavailable)?;
        *slot = Some(token.to_owned());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut slot = self.slot.lock().map_err(|_| StorageError::Unavailable)?;
        *slot = None;
        Ok(())
    }
}

/// Browser `localStorage` under [`TOKEN_STORAGE_KEY`].
#[cfg(feature = "csr")]
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalTokenStorage;

#[cfg(feature = "csr")]
impl LocalTokenStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }
}

#[cfg(feature = "csr")]
impl TokenStorage for LocalTokenStorage {
    fn load(&self) -> Option<String> {
        Self::storage()?.get_item(TOKEN_STORAGE_KEY).ok().flatten().filter(|t| !t.is_empty())
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        let storage = Self::storage().ok_or(StorageError::Unavailable)?;
        storage
            .set_item(TOKEN_STORAGE_KEY, token)
            .map_err(|e| StorageError::Write(format!("{e:?}")))
    }

    fn clear(&self) -> Result<(), StorageError> {
        let storage = Self::storage().ok_or(StorageError::Unavailable)?;
        storage
            .remove_item(TOKEN_STORAGE_KEY)
            .map_err(|e| StorageError::Write(format!("{e:?}")))
    }
}

/// Token kept in a plain file, for the CLI.
#[cfg(feature = "native")]
#[derive(Clone, Debug)]
pub struct FileTokenStorage {
    path: std::path::PathBuf,
}

#[cfg(feature = "native")]
impl FileTokenStorage {
    #[must_use]
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[cfg(feature = "native")]
impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Option<String> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        let token = raw.trim();
        (!token.is_empty()).then(|| token.to_owned())
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Write(e.to_string()))?;
        }
        std::fs::write(&self.path, token).map_err(|e| StorageError::Write(e.to_string()))
    }

    fn clear(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Write(e.to_string())),
        }
    }
}
