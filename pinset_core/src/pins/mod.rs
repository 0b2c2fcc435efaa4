pub mod metadata;

pub use metadata::{MetaValue, PinMetadata};

use crate::Cid;
use minicbor::{Decode, Encode};
use std::fmt;

/// Classification of an authoritative pin record.
///
/// An identifier without a record is unpinned, which callers see as
/// `Option::<PinType>::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Encode, Decode)]
#[cbor(index_only)]
pub enum PinType {
    /// Protects the object and everything reachable from it.
    #[n(0)]
    Recursive,
    /// Protects only the object itself.
    #[n(1)]
    Direct,
}

impl PinType {
    /// Both record classifications, in precedence order.
    pub const ALL: [PinType; 2] = [PinType::Recursive, PinType::Direct];

    pub fn as_str(&self) -> &'static str {
        match self {
            PinType::Recursive => "recursive",
            PinType::Direct => "direct",
        }
    }
}

impl fmt::Display for PinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pin record as held by a [`PinStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinRecord {
    pub cid: Cid,
    pub pin_type: PinType,
    pub metadata: Option<PinMetadata>,
}

/// Persisted pin records.
///
/// A store holds at most one record per identifier. `pin_recursive` and
/// `pin_direct` replace whatever record exists for the identifier, metadata
/// included, and must be atomic per identifier. Policy about which
/// transitions are allowed lives in the pipeline, not here.
#[async_trait::async_trait]
pub trait PinStore: std::fmt::Debug + Send + Sync + 'static {
    /// Returns the classification of `cid` if it is one of `candidates`.
    async fn classify(&self, cid: &Cid, candidates: &[PinType]) -> anyhow::Result<Option<PinType>>;

    /// Returns the full record for `cid`, if any.
    async fn get(&self, cid: &Cid) -> anyhow::Result<Option<PinRecord>>;

    /// Records `cid` as recursively pinned.
    async fn pin_recursive(&self, cid: &Cid, metadata: Option<PinMetadata>) -> anyhow::Result<()>;

    /// Records `cid` as directly pinned.
    async fn pin_direct(&self, cid: &Cid, metadata: Option<PinMetadata>) -> anyhow::Result<()>;

    /// Lists records, optionally only those of one type, ordered by identifier.
    async fn list(&self, filter: Option<PinType>) -> anyhow::Result<Vec<PinRecord>>;
}

#[async_trait::async_trait]
impl<T: PinStore + ?Sized> PinStore for std::sync::Arc<T> {
    async fn classify(&self, cid: &Cid, candidates: &[PinType]) -> anyhow::Result<Option<PinType>> {
        (**self).classify(cid, candidates).await
    }

    async fn get(&self, cid: &Cid) -> anyhow::Result<Option<PinRecord>> {
        (**self).get(cid).await
    }

    async fn pin_recursive(&self, cid: &Cid, metadata: Option<PinMetadata>) -> anyhow::Result<()> {
        (**self).pin_recursive(cid, metadata).await
    }

    async fn pin_direct(&self, cid: &Cid, metadata: Option<PinMetadata>) -> anyhow::Result<()> {
        (**self).pin_direct(cid, metadata).await
    }

    async fn list(&self, filter: Option<PinType>) -> anyhow::Result<Vec<PinRecord>> {
        (**self).list(filter).await
    }
}

#[async_trait::async_trait]
impl<T: PinStore + ?Sized> PinStore for Box<T> {
    async fn classify(&self, cid: &Cid, candidates: &[PinType]) -> anyhow::Result<Option<PinType>> {
        (**self).classify(cid, candidates).await
    }

    async fn get(&self, cid: &Cid) -> anyhow::Result<Option<PinRecord>> {
        (**self).get(cid).await
    }

    async fn pin_recursive(&self, cid: &Cid, metadata: Option<PinMetadata>) -> anyhow::Result<()> {
        (**self).pin_recursive(cid, metadata).await
    }

    async fn pin_direct(&self, cid: &Cid, metadata: Option<PinMetadata>) -> anyhow::Result<()> {
        (**self).pin_direct(cid, metadata).await
    }

    async fn list(&self, filter: Option<PinType>) -> anyhow::Result<Vec<PinRecord>> {
        (**self).list(filter).await
    }
}
