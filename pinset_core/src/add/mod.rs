//! The pin-add pipeline.
//!
//! [`PinManager::add_all`] turns a [`PinSource`] into a lazy stream of
//! pinned identifiers. Each pulled item runs one request through
//! resolve, classify, [`policy::plan`] and the store mutation, in source
//! order. Nothing runs ahead of the consumer.
//!
//! Unless the caller already holds it, the batch takes the [`GcLock`] as a
//! reader on the first pull and keeps the guard in the stream's state. The
//! guard goes away when the source is exhausted, when a request fails, or
//! when the consumer drops the stream.

pub mod policy;

use crate::error::{PinError, PinResult};
use crate::gc::{GcLock, GcReadGuard};
use crate::pins::{PinRecord, PinStore, PinType};
use crate::resolve::PathResolver;
use crate::source::{PinRequest, PinRequests, PinSource, normalize};
use crate::Cid;
use futures::future::ready;
use futures::stream::{self, BoxStream, StreamExt};
use std::sync::Arc;
use tokio::sync::Mutex;

pub use policy::PinAction;

const WRITE_LOCK_SHARDS: usize = 64;

/// Options for [`PinManager::add_all`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AddOptions {
    /// The caller already holds the GC lock for this operation, e.g.
    /// because pins are added as part of a larger locked import.
    pub lock: bool,
}

impl AddOptions {
    /// Options for a caller that holds the GC lock itself.
    pub fn already_locked() -> Self {
        Self { lock: true }
    }
}

/// Stream of identifiers pinned by a batch.
pub type PinnedCids = BoxStream<'static, PinResult<Cid>>;

/// Applies pin requests against a [`PinStore`].
#[derive(Debug, Clone)]
pub struct PinManager {
    store: Arc<dyn PinStore>,
    resolver: Arc<dyn PathResolver>,
    gc_lock: GcLock,
    /// Serializes classify -> mutate per identifier across batches.
    /// Sharded by the first digest byte.
    write_locks: Arc<[Mutex<()>]>,
}

impl PinManager {
    pub fn new<S, R>(store: S, resolver: R, gc_lock: GcLock) -> Self
    where
        S: PinStore,
        R: PathResolver,
    {
        Self::from_shared(Arc::new(store), Arc::new(resolver), gc_lock)
    }

    pub fn from_shared(
        store: Arc<dyn PinStore>,
        resolver: Arc<dyn PathResolver>,
        gc_lock: GcLock,
    ) -> Self {
        let write_locks = (0..WRITE_LOCK_SHARDS)
            .map(|_| Mutex::new(()))
            .collect::<Vec<_>>()
            .into();
        Self {
            store,
            resolver,
            gc_lock,
            write_locks,
        }
    }

    pub fn store(&self) -> &Arc<dyn PinStore> {
        &self.store
    }

    pub fn gc_lock(&self) -> &GcLock {
        &self.gc_lock
    }

    /// Pins everything in `source`, yielding each identifier once its pin
    /// is stored.
    ///
    /// The first error ends the stream. Pins stored before it are kept.
    pub fn add_all(&self, source: impl Into<PinSource>, options: AddOptions) -> PinnedCids {
        self.add_all_from(Some(source.into()), options)
    }

    /// Like [`add_all`](Self::add_all) for a source that may be absent.
    /// An absent source yields a single [`PinError::InvalidInput`].
    pub fn add_all_from(&self, source: Option<PinSource>, options: AddOptions) -> PinnedCids {
        let requests = match normalize(source) {
            Ok(requests) => requests,
            Err(err) => return stream::once(ready(Err(err))).boxed(),
        };

        let batch = Batch {
            manager: self.clone(),
            requests: Some(requests),
            take_lock: !options.lock,
            guard: None,
        };
        stream::unfold(batch, Batch::step).boxed()
    }

    /// Pins `source` and returns the last identifier pinned.
    ///
    /// Meant for a single identifier, path or descriptor. A source that
    /// turns out to be empty is [`PinError::InvalidInput`].
    pub async fn add(&self, source: impl Into<PinSource>, options: AddOptions) -> PinResult<Cid> {
        let mut pinned = self.add_all(source, options);
        let mut last = None;
        while let Some(cid) = pinned.next().await {
            last = Some(cid?);
        }
        last.ok_or_else(|| PinError::InvalidInput("nothing to pin".into()))
    }

    /// Current classification of `cid`, if it is pinned.
    pub async fn status(&self, cid: &Cid) -> PinResult<Option<PinType>> {
        self.store
            .classify(cid, &PinType::ALL)
            .await
            .map_err(PinError::Store)
    }

    /// Lists pin records, optionally only those of one type.
    pub async fn ls(&self, filter: Option<PinType>) -> PinResult<Vec<PinRecord>> {
        self.store.list(filter).await.map_err(PinError::Store)
    }

    async fn pin_one(&self, request: PinRequest) -> PinResult<Cid> {
        let PinRequest {
            target,
            recursive,
            metadata,
        } = request;

        let resolved = self.resolver.resolve(&target).await;
        let cid = resolved.map_err(|source| PinError::Resolution { target, source })?;

        let _guard = self.write_lock_for(&cid).lock().await;

        let existing = self
            .store
            .classify(&cid, &PinType::ALL)
            .await
            .map_err(PinError::Store)?;
        let action = policy::plan(&cid, existing, recursive)?;

        let written = match action.pin_type() {
            PinType::Recursive => self.store.pin_recursive(&cid, metadata).await,
            PinType::Direct => self.store.pin_direct(&cid, metadata).await,
        };
        written.map_err(PinError::Store)?;

        tracing::debug!(cid = %cid, ?action, "pinned");
        Ok(cid)
    }

    fn write_lock_for(&self, cid: &Cid) -> &Mutex<()> {
        let index = cid.digest()[0] as usize % self.write_locks.len();
        &self.write_locks[index]
    }
}

/// State of one `add_all` stream.
struct Batch {
    manager: PinManager,
    /// `None` once the batch has finished or failed.
    requests: Option<PinRequests>,
    take_lock: bool,
    guard: Option<GcReadGuard>,
}

impl Batch {
    async fn step(mut self) -> Option<(PinResult<Cid>, Self)> {
        let mut requests = self.requests.take()?;

        if self.take_lock && self.guard.is_none() {
            self.guard = Some(self.manager.gc_lock.read_lock().await);
        }

        let outcome = match requests.next().await {
            None => return None,
            Some(Ok(request)) => self.manager.pin_one(request).await,
            Some(Err(err)) => Err(err),
        };

        match outcome {
            Ok(cid) => {
                self.requests = Some(requests);
                Some((Ok(cid), self))
            }
            Err(err) => {
                tracing::warn!(%err, "pin batch aborted");
                self.guard = None;
                Some((Err(err), self))
            }
        }
    }
}
