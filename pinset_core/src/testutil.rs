//! Test utilities for `PinStore` implementations.
//!
//! # Usage
//!
//! In your store crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! pinset_core = { workspace = true, features = ["testutil"] }
//! ```
//!
//! In your test file:
//!
//! ```ignore
//! use pinset_core::testutil::PinStoreTests;
//!
//! #[tokio::test]
//! async fn test_my_store() {
//!     let store = MyStore::new(...);
//!     PinStoreTests::new(&store).run_all().await.unwrap();
//! }
//! ```

use crate::Cid;
use crate::pins::{MetaValue, PinMetadata, PinStore, PinType};

/// Conformance suite for `PinStore` implementations.
///
/// Identifiers are derived from a seed so the suite can share a store
/// with other data.
pub struct PinStoreTests<'a, S> {
    store: &'a S,
    seed: String,
}

impl<'a, S: PinStore> PinStoreTests<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self::with_seed(store, "pinset-testutil")
    }

    pub fn with_seed(store: &'a S, seed: impl Into<String>) -> Self {
        Self {
            store,
            seed: seed.into(),
        }
    }

    fn cid(&self, name: &str) -> Cid {
        Cid::raw(format!("{}/{}", self.seed, name))
    }

    /// Run all tests.
    pub async fn run_all(&self) -> anyhow::Result<()> {
        self.test_unknown_is_unpinned().await?;
        self.test_pin_recursive().await?;
        self.test_pin_direct().await?;
        self.test_candidates_restrict_classification().await?;
        self.test_mutation_replaces_record().await?;
        self.test_metadata_is_carried().await?;
        self.test_list().await?;
        Ok(())
    }

    pub async fn test_unknown_is_unpinned(&self) -> anyhow::Result<()> {
        let cid = self.cid("unknown");
        assert_eq!(self.store.classify(&cid, &PinType::ALL).await?, None);
        assert!(self.store.get(&cid).await?.is_none());
        Ok(())
    }

    pub async fn test_pin_recursive(&self) -> anyhow::Result<()> {
        let cid = self.cid("recursive");
        self.store.pin_recursive(&cid, None).await?;
        assert_eq!(
            self.store.classify(&cid, &PinType::ALL).await?,
            Some(PinType::Recursive)
        );

        let record = self.store.get(&cid).await?.expect("record should exist");
        assert_eq!(record.cid, cid);
        assert_eq!(record.pin_type, PinType::Recursive);
        assert_eq!(record.metadata, None);
        Ok(())
    }

    pub async fn test_pin_direct(&self) -> anyhow::Result<()> {
        let cid = self.cid("direct");
        self.store.pin_direct(&cid, None).await?;
        assert_eq!(
            self.store.classify(&cid, &PinType::ALL).await?,
            Some(PinType::Direct)
        );
        Ok(())
    }

    pub async fn test_candidates_restrict_classification(&self) -> anyhow::Result<()> {
        let cid = self.cid("candidates");
        self.store.pin_recursive(&cid, None).await?;
        assert_eq!(self.store.classify(&cid, &[PinType::Direct]).await?, None);
        assert_eq!(
            self.store.classify(&cid, &[PinType::Recursive]).await?,
            Some(PinType::Recursive)
        );
        assert_eq!(self.store.classify(&cid, &[]).await?, None);
        Ok(())
    }

    pub async fn test_mutation_replaces_record(&self) -> anyhow::Result<()> {
        let cid = self.cid("replace");
        self.store.pin_direct(&cid, None).await?;
        self.store.pin_recursive(&cid, None).await?;
        assert_eq!(
            self.store.classify(&cid, &PinType::ALL).await?,
            Some(PinType::Recursive)
        );

        let matching = self
            .store
            .list(None)
            .await?
            .into_iter()
            .filter(|r| r.cid == cid)
            .count();
        assert_eq!(matching, 1, "one record per identifier");
        Ok(())
    }

    pub async fn test_metadata_is_carried(&self) -> anyhow::Result<()> {
        let cid = self.cid("metadata");
        let meta = PinMetadata::new()
            .with("label", "nightly")
            .with("generation", 7i64)
            .with("tags", vec![MetaValue::from("a"), MetaValue::Null]);

        self.store.pin_recursive(&cid, Some(meta.clone())).await?;
        let record = self.store.get(&cid).await?.expect("record should exist");
        assert_eq!(record.metadata, Some(meta));

        self.store.pin_recursive(&cid, None).await?;
        let record = self.store.get(&cid).await?.expect("record should exist");
        assert_eq!(record.metadata, None, "metadata is replaced, not merged");
        Ok(())
    }

    pub async fn test_list(&self) -> anyhow::Result<()> {
        let recursive = self.cid("list-recursive");
        let direct = self.cid("list-direct");
        self.store.pin_recursive(&recursive, None).await?;
        self.store.pin_direct(&direct, None).await?;

        let all = self.store.list(None).await?;
        assert!(all.iter().any(|r| r.cid == recursive));
        assert!(all.iter().any(|r| r.cid == direct));
        assert!(
            all.windows(2).all(|w| w[0].cid < w[1].cid),
            "records are ordered by identifier"
        );

        let only_direct = self.store.list(Some(PinType::Direct)).await?;
        assert!(only_direct.iter().all(|r| r.pin_type == PinType::Direct));
        assert!(only_direct.iter().any(|r| r.cid == direct));
        assert!(!only_direct.iter().any(|r| r.cid == recursive));
        Ok(())
    }
}
