//! Async change notifications
//!
//! Bridges the synchronous listener callbacks of a [`KvStore`] to a
//! `tokio::sync::watch` channel so an async task can await changes.

use tokio::sync::watch;

use crate::storage::{KvStore, Subscription};

/// Stream of "something changed" signals for one key.
///
/// Each signal carries a revision number counting the commits seen since the
/// stream was created. Several commits between two polls collapse into one
/// signal. The underlying subscription is cancelled when the stream is dropped.
pub struct ChangeStream {
    revisions: watch::Receiver<u64>,
    subscription: Subscription,
}

impl ChangeStream {
    pub(crate) fn new(store: &KvStore, key: &str) -> Self {
        let (sender, revisions) = watch::channel(0u64);
        let subscription = store.subscribe(key, move |_| {
            sender.send_modify(|revision| *revision += 1);
        });
        Self {
            revisions,
            subscription,
        }
    }

    /// Wait for the next commit.
    ///
    /// Returns the latest revision, or `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<u64> {
        self.revisions.changed().await.ok()?;
        Some(*self.revisions.borrow_and_update())
    }

    /// Number of commits observed so far
    pub fn revision(&self) -> u64 {
        *self.revisions.borrow()
    }

    /// Stop listening; pending and future calls to `changed` return `None`
    /// once the store drops the listener.
    pub fn close(&self) {
        self.subscription.cancel();
    }
}
