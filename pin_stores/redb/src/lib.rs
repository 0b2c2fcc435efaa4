//! RedbPinStore - a persisted pin record store backed by redb.
//!
//! One table maps identifier bytes to a CBOR-encoded `{pin_type, metadata}`
//! value. Every redb call runs on the blocking thread pool.

use anyhow::anyhow;
use minicbor::{Decode, Encode};
use pinset_core::{Cid, PinMetadata, PinRecord, PinStore, PinType};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::{path::Path, sync::Arc};

const TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("pins");
const DB_FILE: &str = "pins.redb";

#[derive(Debug, Encode, Decode)]
struct StoredPin {
    #[n(0)]
    pin_type: PinType,
    #[n(1)]
    metadata: Option<PinMetadata>,
}

impl StoredPin {
    fn decode(bytes: &[u8]) -> anyhow::Result<Self> {
        minicbor::decode(bytes).map_err(|e| anyhow!("CBOR decode failed: {}", e))
    }

    fn into_record(self, cid: Cid) -> PinRecord {
        PinRecord {
            cid,
            pin_type: self.pin_type,
            metadata: self.metadata,
        }
    }
}

/// Local `PinStore` implementation backed by a redb database.
#[derive(Clone)]
pub struct RedbPinStore {
    db: Arc<Database>,
}

impl RedbPinStore {
    /// Opens (or creates) `pins.redb` inside `dir`.
    pub fn open<P: AsRef<Path>>(dir: P) -> anyhow::Result<Self> {
        let path = dir.as_ref().join(DB_FILE);
        let db = Database::create(&path)?;

        // Create the table up front so a read on a fresh database does not
        // fail with a missing table.
        {
            let write_txn = db.begin_write()?;
            {
                let _ = write_txn.open_table(TABLE)?;
            }
            write_txn.commit()?;
        }

        tracing::debug!("opened pin store at {}", path.display());
        Ok(Self { db: Arc::new(db) })
    }

    async fn put(
        &self,
        cid: &Cid,
        pin_type: PinType,
        metadata: Option<PinMetadata>,
    ) -> anyhow::Result<()> {
        let db = self.db.clone();
        let key = cid.to_bytes();
        let value = minicbor::to_vec(&StoredPin { pin_type, metadata })?;

        tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
            let write_txn = db.begin_write()?;
            {
                let mut table = write_txn.open_table(TABLE)?;
                table.insert(key.as_slice(), value.as_slice())?;
            }
            write_txn.commit()?;
            Ok(())
        })
        .await
        .map_err(|e| anyhow!("redb write task failed: {}", e))?
    }
}

impl std::fmt::Debug for RedbPinStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbPinStore").finish()
    }
}

#[async_trait::async_trait]
impl PinStore for RedbPinStore {
    async fn classify(&self, cid: &Cid, candidates: &[PinType]) -> anyhow::Result<Option<PinType>> {
        let pin_type = self.get(cid).await?.map(|record| record.pin_type);
        Ok(pin_type.filter(|t| candidates.contains(t)))
    }

    async fn get(&self, cid: &Cid) -> anyhow::Result<Option<PinRecord>> {
        let db = self.db.clone();
        let cid = *cid;

        tokio::task::spawn_blocking(move || -> anyhow::Result<Option<PinRecord>> {
            let read_txn = db.begin_read()?;
            let table = read_txn.open_table(TABLE)?;

            let key = cid.to_bytes();
            let stored = table
                .get(key.as_slice())?
                .map(|guard| StoredPin::decode(guard.value()))
                .transpose()?;

            Ok(stored.map(|s| s.into_record(cid)))
        })
        .await
        .map_err(|e| anyhow!("redb read task failed: {}", e))?
    }

    async fn pin_recursive(&self, cid: &Cid, metadata: Option<PinMetadata>) -> anyhow::Result<()> {
        self.put(cid, PinType::Recursive, metadata).await
    }

    async fn pin_direct(&self, cid: &Cid, metadata: Option<PinMetadata>) -> anyhow::Result<()> {
        self.put(cid, PinType::Direct, metadata).await
    }

    async fn list(&self, filter: Option<PinType>) -> anyhow::Result<Vec<PinRecord>> {
        let db = self.db.clone();

        // Key byte order matches `Cid` ordering, so iteration is already sorted.
        tokio::task::spawn_blocking(move || -> anyhow::Result<Vec<PinRecord>> {
            let read_txn = db.begin_read()?;
            let table = read_txn.open_table(TABLE)?;

            let mut records = Vec::new();
            for entry in table.iter()? {
                let (key, value) = entry?;
                let cid = Cid::from_bytes(key.value())?;
                let stored = StoredPin::decode(value.value())?;
                if filter.is_none_or(|t| stored.pin_type == t) {
                    records.push(stored.into_record(cid));
                }
            }
            Ok(records)
        })
        .await
        .map_err(|e| anyhow!("redb list task failed: {}", e))?
    }
}
