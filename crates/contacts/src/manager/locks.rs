//! Named locks serializing read-modify-write cycles per vault

use dashmap::DashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, LazyLock};
use std::task::{Context, Poll};
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockMap = DashMap<String, Arc<Mutex<()>>>;

static GLOBAL: LazyLock<Arc<NamedLocks>> = LazyLock::new(|| Arc::new(NamedLocks::new()));

/// Map of named async mutexes
///
/// One mutex per name, created on first use and removed once nobody holds or
/// waits on it. Different names never contend.
#[derive(Debug, Default)]
pub struct NamedLocks {
    locks: Arc<LockMap>,
}

impl NamedLocks {
    /// Creates an empty lock map
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide lock map shared by every controller built without
    /// an explicit one
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL)
    }

    /// Waits for the lock named `name`
    ///
    /// The lock is released when the returned guard is dropped. Cancelling
    /// the wait leaves no entry behind.
    pub async fn lock(&self, name: &str) -> NamedLockGuard {
        let mutex = Arc::clone(self.locks.entry(name.to_owned()).or_default().value());
        let guard = Acquire {
            name: name.to_owned(),
            locks: Arc::clone(&self.locks),
            wait: Some(Box::pin(mutex.lock_owned())),
        }
        .await;
        NamedLockGuard {
            name: name.to_owned(),
            guard: Some(guard),
            locks: Arc::clone(&self.locks),
        }
    }

    /// Number of names currently held or waited on
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no lock is held or waited on
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Holds a named lock until dropped
#[derive(Debug)]
pub struct NamedLockGuard {
    name: String,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<LockMap>,
}

impl NamedLockGuard {
    /// Name of the held lock
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for NamedLockGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        prune(&self.locks, &self.name);
    }
}

/// Wait for a named mutex that prunes its entry if dropped before completion
struct Acquire<F> {
    name: String,
    locks: Arc<LockMap>,
    wait: Option<Pin<Box<F>>>,
}

impl<F: Future<Output = OwnedMutexGuard<()>>> Future for Acquire<F> {
    type Output = OwnedMutexGuard<()>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.wait.as_mut() {
            Some(wait) => wait.as_mut().poll(cx),
            None => Poll::Pending,
        }
    }
}

impl<F> Drop for Acquire<F> {
    fn drop(&mut self) {
        // The pending wait owns a reference to the mutex; release it first.
        drop(self.wait.take());
        prune(&self.locks, &self.name);
    }
}

/// Removes `name` when only the map's own reference is left
fn prune(locks: &LockMap, name: &str) {
    locks.remove_if(name, |_, mutex| Arc::strong_count(mutex) == 1);
}
