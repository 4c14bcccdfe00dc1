//! Key/value persistence with change notifications
//!
//! A [`KvStore`] keeps one serialized blob per key on top of a
//! [`StorageBackend`] and fans out a notification to every registered
//! listener after each committed write.

mod backend;
mod file;
mod kv_store;
mod memory;
mod subscription;

pub use backend::StorageBackend;
pub use file::FileBackend;
pub use kv_store::KvStore;
pub use memory::MemoryBackend;
pub use subscription::Subscription;
