//! Coordination between pin operations and garbage collection.
//!
//! Pin batches take the lock as readers and may overlap each other. A
//! collection pass takes it as the single writer, so it only runs while no
//! pin batch is in flight.

use std::sync::Arc;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock, TryLockError};

/// Held by a pin batch; dropping it releases the reader role.
pub type GcReadGuard = OwnedRwLockReadGuard<()>;

/// Held by a collection pass; dropping it releases the writer role.
pub type GcWriteGuard = OwnedRwLockWriteGuard<()>;

/// Shared reader/writer lock separating pinning from collection.
///
/// Cloning yields another handle to the same lock.
#[derive(Debug, Clone, Default)]
pub struct GcLock {
    inner: Arc<RwLock<()>>,
}

impl GcLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for the reader role.
    ///
    /// The lock is fair, so once a collector is queued new readers wait
    /// behind it.
    pub async fn read_lock(&self) -> GcReadGuard {
        tracing::trace!("gc lock: waiting for reader role");
        let guard = self.inner.clone().read_owned().await;
        tracing::trace!("gc lock: reader role acquired");
        guard
    }

    /// Waits for the writer role.
    pub async fn write_lock(&self) -> GcWriteGuard {
        tracing::trace!("gc lock: waiting for writer role");
        let guard = self.inner.clone().write_owned().await;
        tracing::trace!("gc lock: writer role acquired");
        guard
    }

    /// Takes the writer role only if no pin batch currently holds the lock.
    pub fn try_write_lock(&self) -> Result<GcWriteGuard, TryLockError> {
        self.inner.clone().try_write_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_readers_do_not_exclude_each_other() {
        let lock = GcLock::new();
        let _a = lock.read_lock().await;
        let b = tokio::time::timeout(Duration::from_millis(100), lock.read_lock()).await;
        assert!(b.is_ok(), "second reader should not wait");
    }

    #[tokio::test]
    async fn test_writer_waits_for_readers() {
        let lock = GcLock::new();
        let reader = lock.read_lock().await;
        assert!(lock.try_write_lock().is_err());

        let writer = tokio::spawn({
            let lock = lock.clone();
            async move {
                let _guard = lock.write_lock().await;
            }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!writer.is_finished());

        drop(reader);
        tokio::time::timeout(Duration::from_secs(1), writer)
            .await
            .expect("writer should run once the reader is gone")
            .unwrap();
        assert!(lock.try_write_lock().is_ok());
    }
}
