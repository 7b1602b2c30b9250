//! Persistence backends for client state.

use std::{
    collections::HashMap,
    fs,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
    sync::Mutex,
};

/// A string-keyed persistence backend, the moral equivalent of a browser's
/// `localStorage`.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Forget a key. Removing a key that was never stored is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Something went wrong while talking to the persistence backend.
#[derive(Debug, thiserror::Error)]
#[error("Unable to access \"{}\"", path.display())]
pub struct StorageError {
    path: PathBuf,
    #[source]
    inner: io::Error,
}

impl StorageError {
    pub(crate) fn new(path: impl Into<PathBuf>, inner: io::Error) -> Self {
        StorageError {
            path: path.into(),
            inner,
        }
    }

    pub fn path(&self) -> &Path { &self.path }
}

/// Keeps everything in memory. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self { MemoryStorage::default() }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(lock(&self.items).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        lock(&self.items).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        lock(&self.items).remove(key);
        Ok(())
    }
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStorage { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path { &self.dir }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);

        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(inner) => Err(StorageError::new(path, inner)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)
            .map_err(|inner| StorageError::new(&self.dir, inner))?;

        let path = self.path_for(key);
        log::trace!("Writing {} bytes to {}", value.len(), path.display());
        fs::write(&path, value)
            .map_err(|inner| StorageError::new(path, inner))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);

        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(inner) => Err(StorageError::new(path, inner)),
        }
    }
}

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
