//! Key/value store with change notifications

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use super::backend::StorageBackend;
use super::file::FileBackend;
use super::memory::MemoryBackend;
use super::subscription::{self, SharedRegistry, Subscription};
use crate::Result;

/// Thread-safe key/value store that notifies listeners after every write
pub struct KvStore {
    backend: Box<dyn StorageBackend>,
    /// Serializes writers, including the whole span of an `update`
    write_lock: Mutex<()>,
    listeners: SharedRegistry,
}

impl KvStore {
    /// Create a new KvStore over the given backend
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            write_lock: Mutex::new(()),
            listeners: SharedRegistry::default(),
        }
    }

    /// Store backed by one JSON file per key under `dir`
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self::new(FileBackend::new(dir))
    }

    /// Store that lives only as long as the process
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// Read the last committed value for `key`.
    ///
    /// A backend failure is logged and reported as `None`.
    pub fn read(&self, key: &str) -> Option<String> {
        match self.backend.load(key) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to read '{}', treating it as empty: {}", key, e);
                None
            }
        }
    }

    /// Atomically replace the value for `key`, then notify its listeners.
    ///
    /// Listeners run on the calling thread, in registration order, before
    /// this returns. A failed write notifies nobody.
    pub fn write(&self, key: &str, value: &str) -> Result<()> {
        {
            let _guard = self.lock_writes();
            self.backend.save(key, value)?;
        }
        debug!("Committed write to '{}'", key);
        subscription::dispatch(&self.listeners, key);
        Ok(())
    }

    /// Read-modify-write of a single key under the write lock.
    ///
    /// `f` receives the current value and returns the replacement together
    /// with a result for the caller. If `f` fails nothing is written and no
    /// listener is notified. `f` must not call back into this store.
    pub fn update<T, F>(&self, key: &str, f: F) -> Result<T>
    where
        F: FnOnce(Option<String>) -> Result<(String, T)>,
    {
        let output = {
            let _guard = self.lock_writes();
            let (next, output) = f(self.read(key))?;
            self.backend.save(key, &next)?;
            output
        };
        debug!("Committed update to '{}'", key);
        subscription::dispatch(&self.listeners, key);
        Ok(output)
    }

    /// Register `callback` for every write to `key` committed from now on
    pub fn subscribe<F>(&self, key: &str, callback: F) -> Subscription
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        subscription::subscribe(&self.listeners, key, Arc::new(callback))
    }

    /// Number of active listeners on `key`
    pub fn listener_count(&self, key: &str) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .count(key)
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
