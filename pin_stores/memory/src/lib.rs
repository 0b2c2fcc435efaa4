use dashmap::DashMap;
use pinset_core::{Cid, PinMetadata, PinRecord, PinStore, PinType};

/// Pin records held in a concurrent map.
///
/// Nothing survives a restart; useful for tests and ephemeral nodes.
#[derive(Debug, Default)]
pub struct MemoryPinStore {
    records: DashMap<Cid, PinRecord>,
}

impl MemoryPinStore {
    /// Creates a new, empty `MemoryPinStore`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn put(&self, cid: &Cid, pin_type: PinType, metadata: Option<PinMetadata>) {
        self.records.insert(
            *cid,
            PinRecord {
                cid: *cid,
                pin_type,
                metadata,
            },
        );
    }
}

#[async_trait::async_trait]
impl PinStore for MemoryPinStore {
    async fn classify(&self, cid: &Cid, candidates: &[PinType]) -> anyhow::Result<Option<PinType>> {
        Ok(self
            .records
            .get(cid)
            .map(|record| record.pin_type)
            .filter(|pin_type| candidates.contains(pin_type)))
    }

    async fn get(&self, cid: &Cid) -> anyhow::Result<Option<PinRecord>> {
        Ok(self.records.get(cid).map(|record| record.clone()))
    }

    /// Inserts or replaces the record for `cid`.
    async fn pin_recursive(&self, cid: &Cid, metadata: Option<PinMetadata>) -> anyhow::Result<()> {
        self.put(cid, PinType::Recursive, metadata);
        Ok(())
    }

    /// Inserts or replaces the record for `cid`.
    async fn pin_direct(&self, cid: &Cid, metadata: Option<PinMetadata>) -> anyhow::Result<()> {
        self.put(cid, PinType::Direct, metadata);
        Ok(())
    }

    async fn list(&self, filter: Option<PinType>) -> anyhow::Result<Vec<PinRecord>> {
        let mut records: Vec<PinRecord> = self
            .records
            .iter()
            .filter(|entry| filter.is_none_or(|t| entry.pin_type == t))
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by(|a, b| a.cid.cmp(&b.cid));
        Ok(records)
    }
}
