use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use pinset_core::{AliasResolver, Cid};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PinNodeConfig {
    pub store: PinStoreConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum PinStoreConfig {
    Memory,
    Redb(RedbStoreConfig),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RedbStoreConfig {
    /// Directory holding `pins.redb`; created if missing.
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Fixed path -> identifier table consulted before parsing the path.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

impl PinNodeConfig {
    pub fn memory() -> Self {
        Self {
            store: PinStoreConfig::Memory,
            resolver: ResolverConfig::default(),
        }
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("failed to parse node config")
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read node config {}", path.display()))?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        toml::to_string(self).context("failed to serialize node config")
    }
}

impl ResolverConfig {
    /// Builds the resolver, rejecting aliases whose target is not a valid
    /// identifier.
    pub fn build(&self) -> anyhow::Result<AliasResolver> {
        let mut resolver = AliasResolver::new();
        for (path, cid) in &self.aliases {
            let cid = Cid::parse(cid).with_context(|| format!("invalid identifier for alias {path}"))?;
            resolver.insert(path.clone(), cid);
        }
        Ok(resolver)
    }
}
