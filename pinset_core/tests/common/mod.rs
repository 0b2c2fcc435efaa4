#![allow(dead_code)]

use pinset_core::{
    AliasResolver, Cid, PathResolver, PinMetadata, PinRecord, PinStore, PinTarget, PinType,
};
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// In-memory store that counts every call and can be told to fail writes.
#[derive(Debug, Default)]
pub struct RecordingStore {
    records: Mutex<BTreeMap<Cid, PinRecord>>,
    calls: AtomicUsize,
    mutations: AtomicUsize,
    fail_mutations: AtomicBool,
    classify_delay: Option<Duration>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(self, cid: Cid, pin_type: PinType) -> Self {
        self.records.lock().unwrap().insert(
            cid,
            PinRecord {
                cid,
                pin_type,
                metadata: None,
            },
        );
        self
    }

    /// Makes every `classify` sleep first, widening the window between a
    /// batch's read and its write.
    pub fn with_classify_delay(mut self, delay: Duration) -> Self {
        self.classify_delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn mutations(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    pub fn fail_mutations(&self) {
        self.fail_mutations.store(true, Ordering::SeqCst);
    }

    pub fn record(&self, cid: &Cid) -> Option<PinRecord> {
        self.records.lock().unwrap().get(cid).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    fn put(&self, cid: &Cid, pin_type: PinType, metadata: Option<PinMetadata>) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_mutations.load(Ordering::SeqCst) {
            anyhow::bail!("disk full");
        }
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.records.lock().unwrap().insert(
            *cid,
            PinRecord {
                cid: *cid,
                pin_type,
                metadata,
            },
        );
        Ok(())
    }
}

#[async_trait::async_trait]
impl PinStore for RecordingStore {
    async fn classify(&self, cid: &Cid, candidates: &[PinType]) -> anyhow::Result<Option<PinType>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.classify_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self
            .record(cid)
            .map(|r| r.pin_type)
            .filter(|t| candidates.contains(t)))
    }

    async fn get(&self, cid: &Cid) -> anyhow::Result<Option<PinRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.record(cid))
    }

    async fn pin_recursive(&self, cid: &Cid, metadata: Option<PinMetadata>) -> anyhow::Result<()> {
        self.put(cid, PinType::Recursive, metadata)
    }

    async fn pin_direct(&self, cid: &Cid, metadata: Option<PinMetadata>) -> anyhow::Result<()> {
        self.put(cid, PinType::Direct, metadata)
    }

    async fn list(&self, filter: Option<PinType>) -> anyhow::Result<Vec<PinRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|r| filter.is_none_or(|t| r.pin_type == t))
            .cloned()
            .collect())
    }
}

/// Alias resolver that counts lookups.
#[derive(Debug, Default)]
pub struct RecordingResolver {
    inner: AliasResolver,
    calls: AtomicUsize,
}

impl RecordingResolver {
    pub fn new(aliases: &[(&str, Cid)]) -> Self {
        Self {
            inner: aliases
                .iter()
                .map(|(path, cid)| (path.to_string(), *cid))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl PathResolver for RecordingResolver {
    async fn resolve(&self, target: &PinTarget) -> anyhow::Result<Cid> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.resolve(target).await
    }
}
