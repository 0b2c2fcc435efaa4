//! A pinset node: one pin record store, one resolver and one GC lock,
//! assembled from a [`PinNodeConfig`].

pub mod config;

pub use config::{PinNodeConfig, PinStoreConfig, RedbStoreConfig, ResolverConfig};

use std::future::Future;
use std::sync::Arc;

use anyhow::Context;
use pinset_core::{GcLock, PinManager, PinRecord, PinStore};
use pinset_store_memory::MemoryPinStore;
use pinset_store_redb::RedbPinStore;

#[derive(Debug, Clone)]
pub struct PinNode {
    pins: PinManager,
}

impl PinNode {
    pub fn open(config: &PinNodeConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn PinStore> = match &config.store {
            PinStoreConfig::Memory => Arc::new(MemoryPinStore::new()),
            PinStoreConfig::Redb(redb) => {
                std::fs::create_dir_all(&redb.path).with_context(|| {
                    format!("failed to create pin store dir {}", redb.path.display())
                })?;
                Arc::new(RedbPinStore::open(&redb.path)?)
            }
        };
        let resolver = config.resolver.build()?;

        tracing::info!(
            "pin node: store {:?}, {} path aliases",
            store,
            resolver.len()
        );

        Ok(Self {
            pins: PinManager::from_shared(store, Arc::new(resolver), GcLock::new()),
        })
    }

    pub fn pins(&self) -> &PinManager {
        &self.pins
    }

    pub fn gc_lock(&self) -> &GcLock {
        self.pins.gc_lock()
    }

    /// Runs one collection pass.
    ///
    /// Waits for the GC writer role, so every in-flight pin batch finishes
    /// first and none starts until `collect` returns. `collect` receives the
    /// pin records that are the collection roots.
    pub async fn gc_pass<F, Fut, T>(&self, collect: F) -> anyhow::Result<T>
    where
        F: FnOnce(Vec<PinRecord>) -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let _guard = self.gc_lock().write_lock().await;
        let roots = self.pins.store().list(None).await?;
        tracing::debug!("gc pass: {} pinned roots", roots.len());
        collect(roots).await
    }
}
