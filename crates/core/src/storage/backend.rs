//! Storage backend trait
//!
//! Defines the interface for the persistence medium underneath [`super::KvStore`].

use crate::Result;

/// A medium able to hold one string value per key.
///
/// Implementations must make `save` all-or-nothing: a reader racing with a
/// save, or a process restarted after a crash mid-save, observes either the
/// previous value or the new one.
pub trait StorageBackend: Send + Sync {
    /// Load the value stored under `key`, or `None` if nothing was ever saved
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`
    fn save(&self, key: &str, value: &str) -> Result<()>;
}
